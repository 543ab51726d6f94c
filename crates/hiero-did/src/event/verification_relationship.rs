use serde::{Deserialize, Serialize};
use serde_json::Value;

use hiero_crypto::PublicKey;

use super::parse_target;
use super::verification_method::{KeyWire, VerificationMethodEvent};
use crate::document::VerificationRelationshipType;
use crate::error::DidError;
use crate::identifier::{parse_fragment_id, FragmentKind};

const EVENT_NAME: &str = "VerificationRelationship event";

/// A key together with the relationship list it is referenced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRelationshipEvent {
    pub method: VerificationMethodEvent,
    pub relationship_type: VerificationRelationshipType,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipWire {
    #[serde(flatten)]
    key: KeyWire,
    relationship_type: VerificationRelationshipType,
}

impl VerificationRelationshipEvent {
    pub fn new(
        id: impl Into<String>,
        controller: impl Into<String>,
        public_key: PublicKey,
        relationship_type: VerificationRelationshipType,
    ) -> Result<Self, DidError> {
        Ok(Self {
            method: VerificationMethodEvent::new(id, controller, public_key)?,
            relationship_type,
        })
    }

    pub(super) fn to_json(&self) -> Value {
        let wire = RelationshipWire {
            key: self.method.wire(),
            relationship_type: self.relationship_type,
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub(super) fn from_json(value: &Value) -> Result<Self, DidError> {
        let wire: RelationshipWire = parse_target(value, EVENT_NAME)?;
        let public_key = wire.key.public_key(EVENT_NAME)?;
        Self::new(wire.key.id, wire.key.controller, public_key, wire.relationship_type)
    }
}

/// Removal of a key reference from one relationship list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRelationshipEvent {
    pub id: String,
    pub relationship_type: VerificationRelationshipType,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevokeWire {
    id: String,
    relationship_type: VerificationRelationshipType,
}

impl RevokeRelationshipEvent {
    pub fn new(
        id: impl Into<String>,
        relationship_type: VerificationRelationshipType,
    ) -> Result<Self, DidError> {
        let id = id.into();
        parse_fragment_id(&id, FragmentKind::Key)?;
        Ok(Self {
            id,
            relationship_type,
        })
    }

    pub(super) fn to_json(&self) -> Value {
        let wire = RevokeWire {
            id: self.id.clone(),
            relationship_type: self.relationship_type,
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub(super) fn from_json(value: &Value) -> Result<Self, DidError> {
        let wire: RevokeWire = parse_target(value, EVENT_NAME)?;
        Self::new(wire.id, wire.relationship_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ED25519_KEY_TYPE;
    use hiero_crypto::KeyPair;
    use serde_json::json;

    const DID: &str = "did:hedera:testnet:z87meAWt7t2zrDxo7qw3PVTjexKWReYWS75LH29THy8kb_0.0.29613327";

    #[test]
    fn test_json_payload_carries_relationship_type() {
        let key = KeyPair::from_seed(&[9u8; 32]).public_key();
        let event = VerificationRelationshipEvent::new(
            format!("{DID}#key-1"),
            DID,
            key,
            VerificationRelationshipType::CapabilityDelegation,
        )
        .unwrap();
        assert_eq!(
            event.to_json(),
            json!({
                "id": format!("{DID}#key-1"),
                "type": ED25519_KEY_TYPE,
                "controller": DID,
                "publicKeyBase58": key.to_bs58(),
                "relationshipType": "capabilityDelegation",
            })
        );
    }

    #[test]
    fn test_revoke_payload() {
        let event = RevokeRelationshipEvent::new(
            format!("{DID}#key-1"),
            VerificationRelationshipType::Authentication,
        )
        .unwrap();
        assert_eq!(
            event.to_json(),
            json!({ "id": format!("{DID}#key-1"), "relationshipType": "authentication" })
        );
    }

    #[test]
    fn test_unknown_relationship_type_rejected() {
        let payload = json!({ "id": format!("{DID}#key-1"), "relationshipType": "signing" });
        let err = RevokeRelationshipEvent::from_json(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "VerificationRelationship event JSON parsing failed: Invalid JSON structure"
        );
    }
}
