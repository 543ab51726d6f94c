//! DID events and their wire codec.
//!
//! On the wire an event is base64 of a JSON object keyed by its target name,
//! e.g. `{"Service": {"id": .., "type": .., "serviceEndpoint": ..}}`. The
//! target together with the message operation selects the event variant.

mod document;
mod owner;
mod service;
mod verification_method;
mod verification_relationship;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use hiero_crypto::encoding;

use crate::error::DidError;
use crate::identifier::{parse_fragment_id, FragmentKind};

pub use document::DocumentEvent;
pub use owner::OwnerEvent;
pub use service::ServiceEvent;
pub use verification_method::VerificationMethodEvent;
pub use verification_relationship::{RevokeRelationshipEvent, VerificationRelationshipEvent};

/// Operation field of a DID message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DidDocumentOperation {
    Create,
    Update,
    Revoke,
    Delete,
}

impl DidDocumentOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Revoke => "revoke",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for DidDocumentOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level key of an event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DidEventTarget {
    DidOwner,
    Service,
    VerificationMethod,
    VerificationRelationship,
    Document,
}

impl DidEventTarget {
    const ALL: [DidEventTarget; 5] = [
        Self::DidOwner,
        Self::Service,
        Self::VerificationMethod,
        Self::VerificationRelationship,
        Self::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DidOwner => "DIDOwner",
            Self::Service => "Service",
            Self::VerificationMethod => "VerificationMethod",
            Self::VerificationRelationship => "VerificationRelationship",
            Self::Document => "Document",
        }
    }
}

/// Removal of a service or verification method by fragment id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeEvent {
    pub id: String,
}

impl RevokeEvent {
    fn new(id: impl Into<String>, kind: FragmentKind) -> Result<Self, DidError> {
        let id = id.into();
        parse_fragment_id(&id, kind)?;
        Ok(Self { id })
    }

    fn from_json(value: &Value, name: &str, kind: FragmentKind) -> Result<Self, DidError> {
        #[derive(Deserialize)]
        struct Wire {
            id: String,
        }
        let wire: Wire = parse_target(value, name)?;
        Self::new(wire.id, kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DidEvent {
    CreateOwner(OwnerEvent),
    UpdateOwner(OwnerEvent),
    CreateDocumentFromExternal(DocumentEvent),
    DeleteDocument,
    UpsertService(ServiceEvent),
    RevokeService(RevokeEvent),
    UpsertVerificationMethod(VerificationMethodEvent),
    RevokeVerificationMethod(RevokeEvent),
    UpsertVerificationRelationship(VerificationRelationshipEvent),
    RevokeVerificationRelationship(RevokeRelationshipEvent),
}

impl DidEvent {
    pub fn revoke_service(id: impl Into<String>) -> Result<Self, DidError> {
        Ok(Self::RevokeService(RevokeEvent::new(id, FragmentKind::Service)?))
    }

    pub fn revoke_verification_method(id: impl Into<String>) -> Result<Self, DidError> {
        Ok(Self::RevokeVerificationMethod(RevokeEvent::new(
            id,
            FragmentKind::Key,
        )?))
    }

    pub fn target(&self) -> DidEventTarget {
        match self {
            Self::CreateOwner(_) | Self::UpdateOwner(_) => DidEventTarget::DidOwner,
            Self::CreateDocumentFromExternal(_) | Self::DeleteDocument => DidEventTarget::Document,
            Self::UpsertService(_) | Self::RevokeService(_) => DidEventTarget::Service,
            Self::UpsertVerificationMethod(_) | Self::RevokeVerificationMethod(_) => {
                DidEventTarget::VerificationMethod
            }
            Self::UpsertVerificationRelationship(_) | Self::RevokeVerificationRelationship(_) => {
                DidEventTarget::VerificationRelationship
            }
        }
    }

    /// Whether `operation` may carry this event.
    pub fn supports(&self, operation: DidDocumentOperation) -> bool {
        use DidDocumentOperation::*;
        match self {
            Self::CreateOwner(_) | Self::CreateDocumentFromExternal(_) => operation == Create,
            Self::UpdateOwner(_) => operation == Update,
            Self::DeleteDocument => operation == Delete,
            Self::UpsertService(_)
            | Self::UpsertVerificationMethod(_)
            | Self::UpsertVerificationRelationship(_) => matches!(operation, Create | Update),
            Self::RevokeService(_)
            | Self::RevokeVerificationMethod(_)
            | Self::RevokeVerificationRelationship(_) => operation == Revoke,
        }
    }

    /// Fragment id carried by the event; `None` for deletes.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::CreateOwner(e) | Self::UpdateOwner(e) => Some(&e.id),
            Self::CreateDocumentFromExternal(e) => Some(&e.id),
            Self::DeleteDocument => None,
            Self::UpsertService(e) => Some(&e.id),
            Self::RevokeService(e) | Self::RevokeVerificationMethod(e) => Some(&e.id),
            Self::UpsertVerificationMethod(e) => Some(&e.id),
            Self::UpsertVerificationRelationship(e) => Some(&e.method.id),
            Self::RevokeVerificationRelationship(e) => Some(&e.id),
        }
    }

    pub fn to_json(&self) -> Value {
        let body = match self {
            Self::CreateOwner(e) | Self::UpdateOwner(e) => e.to_json(),
            Self::CreateDocumentFromExternal(e) => e.to_json(),
            Self::DeleteDocument => Value::Object(Map::new()),
            Self::UpsertService(e) => e.to_json(),
            Self::RevokeService(e) | Self::RevokeVerificationMethod(e) => json!({ "id": e.id }),
            Self::UpsertVerificationMethod(e) => e.to_json(),
            Self::UpsertVerificationRelationship(e) => e.to_json(),
            Self::RevokeVerificationRelationship(e) => e.to_json(),
        };
        let mut root = Map::new();
        root.insert(self.target().as_str().to_string(), body);
        Value::Object(root)
    }

    /// Base64 of the JSON payload, as carried in the message `event` field.
    pub fn encode(&self) -> Result<String, DidError> {
        Ok(encoding::bytes_to_b64(&serde_json::to_vec(&self.to_json())?))
    }

    pub fn decode(encoded: &str, operation: DidDocumentOperation) -> Result<Self, DidError> {
        let bytes = encoding::b64_to_bytes(encoded)?;
        let value: Value = serde_json::from_slice(&bytes)?;
        Self::from_json(&value, operation)
    }

    pub fn from_json(value: &Value, operation: DidDocumentOperation) -> Result<Self, DidError> {
        use DidDocumentOperation::*;

        let unsupported = || {
            DidError::InvalidEvent(format!(
                "Error on parsing HcsDidEvent: {} - data is not supported",
                operation
            ))
        };
        let object = value.as_object().ok_or_else(unsupported)?;

        if operation == Delete {
            let is_delete_payload = object.len() == 1
                && object
                    .get(DidEventTarget::Document.as_str())
                    .and_then(Value::as_object)
                    .is_some_and(Map::is_empty);
            return if is_delete_payload {
                Ok(Self::DeleteDocument)
            } else {
                Err(unsupported())
            };
        }

        let (target, body) = DidEventTarget::ALL
            .into_iter()
            .find_map(|t| object.get(t.as_str()).map(|body| (t, body)))
            .ok_or_else(unsupported)?;

        let event = match (target, operation) {
            (DidEventTarget::DidOwner, Create) => Self::CreateOwner(OwnerEvent::from_json(body)?),
            (DidEventTarget::DidOwner, Update) => Self::UpdateOwner(OwnerEvent::from_json(body)?),
            (DidEventTarget::Service, Create | Update) => {
                Self::UpsertService(ServiceEvent::from_json(body)?)
            }
            (DidEventTarget::Service, Revoke) => Self::RevokeService(RevokeEvent::from_json(
                body,
                service::EVENT_NAME,
                FragmentKind::Service,
            )?),
            (DidEventTarget::VerificationMethod, Create | Update) => {
                Self::UpsertVerificationMethod(VerificationMethodEvent::from_json(body)?)
            }
            (DidEventTarget::VerificationMethod, Revoke) => {
                Self::RevokeVerificationMethod(RevokeEvent::from_json(
                    body,
                    verification_method::EVENT_NAME,
                    FragmentKind::Key,
                )?)
            }
            (DidEventTarget::VerificationRelationship, Create | Update) => {
                Self::UpsertVerificationRelationship(VerificationRelationshipEvent::from_json(body)?)
            }
            (DidEventTarget::VerificationRelationship, Revoke) => {
                Self::RevokeVerificationRelationship(RevokeRelationshipEvent::from_json(body)?)
            }
            (DidEventTarget::Document, Create) => {
                Self::CreateDocumentFromExternal(DocumentEvent::from_json(body)?)
            }
            _ => return Err(unsupported()),
        };
        Ok(event)
    }
}

/// Deserialize a target body, mapping any shape mismatch to the event's
/// parse error.
fn parse_target<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Result<T, DidError> {
    serde_json::from_value(value.clone()).map_err(|_| {
        DidError::InvalidEvent(format!("{} JSON parsing failed: Invalid JSON structure", name))
    })
}
