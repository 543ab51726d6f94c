use serde_json::Value;

use hiero_crypto::PublicKey;

use super::parse_target;
use super::verification_method::KeyWire;
use crate::document::{VerificationMethod, ED25519_KEY_TYPE};
use crate::error::DidError;
use crate::identifier::{base_did, parse_fragment_id, FragmentKind, ROOT_KEY_FRAGMENT};

pub(super) const EVENT_NAME: &str = "DIDOwner event";

/// Root key of a document and the controller it belongs to.
///
/// The id always references the controller, not the document subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerEvent {
    pub id: String,
    pub controller: String,
    pub public_key: PublicKey,
}

impl OwnerEvent {
    pub fn new(controller: impl Into<String>, public_key: PublicKey) -> Result<Self, DidError> {
        let controller = controller.into();
        Self::validated(
            format!("{}#{}", controller, ROOT_KEY_FRAGMENT),
            controller,
            public_key,
        )
    }

    fn validated(id: String, controller: String, public_key: PublicKey) -> Result<Self, DidError> {
        let invalid =
            || DidError::InvalidEvent("Event ID is invalid. Expected Hedera DID format".into());
        parse_fragment_id(&id, FragmentKind::RootKey).map_err(|_| invalid())?;
        if base_did(&id) != controller {
            return Err(invalid());
        }
        Ok(Self {
            id,
            controller,
            public_key,
        })
    }

    /// The root verification method this event installs.
    pub fn verification_method(&self) -> VerificationMethod {
        VerificationMethod {
            id: self.id.clone(),
            key_type: ED25519_KEY_TYPE.to_string(),
            controller: self.controller.clone(),
            public_key_base58: self.public_key.to_bs58(),
        }
    }

    pub(super) fn to_json(&self) -> Value {
        let wire = KeyWire {
            id: self.id.clone(),
            key_type: ED25519_KEY_TYPE.to_string(),
            controller: self.controller.clone(),
            public_key_base58: self.public_key.to_bs58(),
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub(super) fn from_json(value: &Value) -> Result<Self, DidError> {
        let wire: KeyWire = parse_target(value, EVENT_NAME)?;
        let public_key = wire.public_key(EVENT_NAME)?;
        Self::validated(wire.id, wire.controller, public_key)
    }
}
