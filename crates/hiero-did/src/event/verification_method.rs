use serde::{Deserialize, Serialize};
use serde_json::Value;

use hiero_crypto::PublicKey;

use super::parse_target;
use crate::document::{VerificationMethod, ED25519_KEY_TYPE};
use crate::error::DidError;
use crate::identifier::{parse_fragment_id, FragmentKind};

pub(super) const EVENT_NAME: &str = "VerificationMethod event";

/// Key definition shared by owner, verification method and relationship payloads.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct KeyWire {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub controller: String,
    pub public_key_base58: String,
}

impl KeyWire {
    /// Decode the key, rejecting unsupported key types.
    pub fn public_key(&self, name: &str) -> Result<PublicKey, DidError> {
        let invalid = || {
            DidError::InvalidEvent(format!("{} JSON parsing failed: Invalid JSON structure", name))
        };
        if self.key_type != ED25519_KEY_TYPE {
            return Err(invalid());
        }
        PublicKey::from_bs58(&self.public_key_base58).map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMethodEvent {
    pub id: String,
    pub controller: String,
    pub public_key: PublicKey,
}

impl VerificationMethodEvent {
    pub fn new(
        id: impl Into<String>,
        controller: impl Into<String>,
        public_key: PublicKey,
    ) -> Result<Self, DidError> {
        let id = id.into();
        parse_fragment_id(&id, FragmentKind::Key)?;
        Ok(Self {
            id,
            controller: controller.into(),
            public_key,
        })
    }

    pub fn verification_method(&self) -> VerificationMethod {
        VerificationMethod {
            id: self.id.clone(),
            key_type: ED25519_KEY_TYPE.to_string(),
            controller: self.controller.clone(),
            public_key_base58: self.public_key.to_bs58(),
        }
    }

    pub(super) fn wire(&self) -> KeyWire {
        KeyWire {
            id: self.id.clone(),
            key_type: ED25519_KEY_TYPE.to_string(),
            controller: self.controller.clone(),
            public_key_base58: self.public_key.to_bs58(),
        }
    }

    pub(super) fn to_json(&self) -> Value {
        serde_json::to_value(self.wire()).unwrap_or(Value::Null)
    }

    pub(super) fn from_json(value: &Value) -> Result<Self, DidError> {
        let wire: KeyWire = parse_target(value, EVENT_NAME)?;
        let public_key = wire.public_key(EVENT_NAME)?;
        Self::new(wire.id, wire.controller, public_key)
    }
}
