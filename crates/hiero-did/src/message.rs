//! Signed DID message envelopes.
//!
//! ```json
//! {"message": {"timestamp": .., "operation": .., "did": .., "event": "<base64>"}, "signature": "<base64>"}
//! ```
//!
//! The signature covers the serialized `message` object. The encoded event
//! is kept verbatim so a decoded message re-serializes to the signed bytes.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use hiero_core::TopicId;
use hiero_crypto::{sign, verify, KeyPair, PublicKey, Signature};
use hiero_hcs::{HcsError, HcsMessage};

use crate::error::DidError;
use crate::event::{DidDocumentOperation, DidEvent};
use crate::identifier::HederaDidIdentifier;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageWire {
    timestamp: String,
    operation: DidDocumentOperation,
    did: String,
    event: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeWire {
    message: MessageWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

/// One DID operation addressed to a DID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HcsDidMessage {
    pub timestamp: String,
    pub operation: DidDocumentOperation,
    pub did: String,
    pub event: DidEvent,
    encoded_event: String,
}

impl HcsDidMessage {
    pub fn new(
        operation: DidDocumentOperation,
        did: impl Into<String>,
        event: DidEvent,
    ) -> Result<Self, DidError> {
        if !event.supports(operation) {
            return Err(DidError::InvalidEvent(format!(
                "{} event cannot be sent with operation '{}'",
                event.target().as_str(),
                operation
            )));
        }
        Ok(Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            operation,
            did: did.into(),
            encoded_event: event.encode()?,
            event,
        })
    }

    fn wire(&self) -> MessageWire {
        MessageWire {
            timestamp: self.timestamp.clone(),
            operation: self.operation,
            did: self.did.clone(),
            event: self.encoded_event.clone(),
        }
    }

    fn from_wire(wire: MessageWire) -> Result<Self, DidError> {
        let event = DidEvent::decode(&wire.event, wire.operation)?;
        Ok(Self {
            timestamp: wire.timestamp,
            operation: wire.operation,
            did: wire.did,
            event,
            encoded_event: wire.event,
        })
    }

    /// The bytes a signature is computed over: the `message` object as
    /// compact JSON (no whitespace), keys in the order `timestamp`,
    /// `operation`, `did`, `event`, with the event base64 text as received.
    ///
    /// Signers that pretty-print or reorder keys produce signatures this
    /// check rejects.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, DidError> {
        Ok(serde_json::to_vec(&self.wire())?)
    }

    pub fn identifier(&self) -> Result<HederaDidIdentifier, DidError> {
        HederaDidIdentifier::parse(&self.did)
    }

    /// The DID parses and, when given, lives on `topic_id`.
    pub fn is_valid(&self, topic_id: Option<&TopicId>) -> bool {
        match self.identifier() {
            Ok(identifier) => topic_id.map_or(true, |topic| identifier.topic_id() == topic),
            Err(_) => false,
        }
    }
}

/// A DID message with its detached signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HcsDidMessageEnvelope {
    pub message: HcsDidMessage,
    pub signature: Option<Signature>,
}

impl HcsDidMessageEnvelope {
    pub fn unsigned(message: HcsDidMessage) -> Self {
        Self {
            message,
            signature: None,
        }
    }

    pub fn sign(message: HcsDidMessage, key: &KeyPair) -> Result<Self, DidError> {
        let signature = sign(&message.signing_bytes()?, key);
        Ok(Self {
            message,
            signature: Some(signature),
        })
    }

    pub fn verify_signature(&self, key: &PublicKey) -> Result<(), DidError> {
        let signature = self
            .signature
            .as_ref()
            .ok_or_else(|| DidError::InvalidEvent("DID message is not signed".into()))?;
        verify(&self.message.signing_bytes()?, signature, key)?;
        Ok(())
    }
}

impl HcsMessage for HcsDidMessageEnvelope {
    fn from_payload(payload: &[u8]) -> Result<Self, HcsError> {
        let wire: EnvelopeWire = serde_json::from_slice(payload)?;
        let message = HcsDidMessage::from_wire(wire.message)
            .map_err(|e| HcsError::InvalidMessage(e.to_string()))?;
        let signature = wire
            .signature
            .as_deref()
            .map(Signature::from_base64)
            .transpose()?;
        Ok(Self { message, signature })
    }

    fn to_payload(&self) -> Result<Vec<u8>, HcsError> {
        let wire = EnvelopeWire {
            message: self.message.wire(),
            signature: self.signature.as_ref().map(Signature::to_base64),
        };
        Ok(serde_json::to_vec(&wire)?)
    }

    fn is_valid(&self, topic_id: Option<&TopicId>) -> bool {
        self.signature.is_some() && self.message.is_valid(topic_id)
    }
}
