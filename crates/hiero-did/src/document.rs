use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use hiero_core::Timestamp;

use crate::error::DidError;

pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
pub const ED25519_KEY_TYPE: &str = "Ed25519VerificationKey2018";

/// Verification relationship lists carried by a DID document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationRelationshipType {
    Authentication,
    AssertionMethod,
    KeyAgreement,
    CapabilityInvocation,
    CapabilityDelegation,
}

impl VerificationRelationshipType {
    pub const ALL: [VerificationRelationshipType; 5] = [
        Self::Authentication,
        Self::AssertionMethod,
        Self::KeyAgreement,
        Self::CapabilityInvocation,
        Self::CapabilityDelegation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::AssertionMethod => "assertionMethod",
            Self::KeyAgreement => "keyAgreement",
            Self::CapabilityInvocation => "capabilityInvocation",
            Self::CapabilityDelegation => "capabilityDelegation",
        }
    }

    /// Lists always rendered, even when empty.
    fn always_rendered(&self) -> bool {
        matches!(self, Self::Authentication | Self::AssertionMethod)
    }
}

impl FromStr for VerificationRelationshipType {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                DidError::InvalidEvent(format!("unknown verification relationship type: {}", s))
            })
    }
}

impl fmt::Display for VerificationRelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub controller: String,
    pub public_key_base58: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: String,
}

/// Projected DID document plus its resolution metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidDocument {
    pub id: String,
    pub controller: Option<String>,
    pub created: Option<Timestamp>,
    pub updated: Option<Timestamp>,
    pub version_id: Option<String>,
    pub deactivated: bool,
    pub verification_methods: Vec<VerificationMethod>,
    pub relationships: BTreeMap<VerificationRelationshipType, Vec<String>>,
    pub services: Vec<Service>,
}

impl DidDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            controller: None,
            created: None,
            updated: None,
            version_id: None,
            deactivated: false,
            verification_methods: Vec::new(),
            relationships: BTreeMap::new(),
            services: Vec::new(),
        }
    }

    /// The controller, defaulting to the subject itself.
    pub fn controller(&self) -> &str {
        self.controller.as_deref().unwrap_or(&self.id)
    }

    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_methods.iter().find(|vm| vm.id == id)
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn relationship(&self, kind: VerificationRelationshipType) -> &[String] {
        self.relationships.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace in place when the id exists, append otherwise.
    pub fn upsert_verification_method(&mut self, method: VerificationMethod) {
        upsert_by(&mut self.verification_methods, method, |vm| vm.id.clone());
    }

    pub fn remove_verification_method(&mut self, id: &str) -> bool {
        remove_by(&mut self.verification_methods, |vm| vm.id == id)
    }

    pub fn upsert_service(&mut self, service: Service) {
        upsert_by(&mut self.services, service, |s| s.id.clone());
    }

    pub fn remove_service(&mut self, id: &str) -> bool {
        remove_by(&mut self.services, |s| s.id == id)
    }

    /// Ensure `id` appears exactly once in the `kind` list.
    pub fn add_relationship(&mut self, kind: VerificationRelationshipType, id: &str) {
        let list = self.relationships.entry(kind).or_default();
        if !list.iter().any(|r| r == id) {
            list.push(id.to_string());
        }
    }

    pub fn remove_relationship(&mut self, kind: VerificationRelationshipType, id: &str) -> bool {
        self.relationships
            .get_mut(&kind)
            .is_some_and(|list| remove_by(list, |r| r == id))
    }

    /// Re-point `old` to `new` in the `kind` list, keeping its position.
    pub fn replace_relationship(&mut self, kind: VerificationRelationshipType, old: &str, new: &str) {
        let list = self.relationships.entry(kind).or_default();
        if old != new {
            list.retain(|r| r != new);
        }
        match list.iter().position(|r| r == old) {
            Some(pos) => list[pos] = new.to_string(),
            None => list.push(new.to_string()),
        }
    }

    /// Drop every key, relationship and service.
    pub fn clear_contents(&mut self) {
        self.verification_methods.clear();
        self.relationships.clear();
        self.services.clear();
    }

    /// W3C JSON rendering.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("@context".into(), Value::from(DID_CONTEXT));
        root.insert("id".into(), Value::from(self.id.clone()));
        if self.controller() != self.id {
            root.insert("controller".into(), Value::from(self.controller()));
        }
        root.insert(
            "verificationMethod".into(),
            serde_json::to_value(&self.verification_methods).unwrap_or(Value::Array(Vec::new())),
        );
        for kind in VerificationRelationshipType::ALL {
            let list = self.relationship(kind);
            if kind.always_rendered() || !list.is_empty() {
                root.insert(kind.as_str().into(), Value::from(list.to_vec()));
            }
        }
        if !self.services.is_empty() {
            root.insert(
                "service".into(),
                serde_json::to_value(&self.services).unwrap_or(Value::Array(Vec::new())),
            );
        }
        Value::Object(root)
    }

    /// Parse a document published out-of-band (the target of an external
    /// document event). Embedded verification methods inside relationship
    /// lists are lifted into `verificationMethod` and referenced by id.
    pub fn from_json(value: &Value) -> Result<Self, DidError> {
        let malformed =
            |what: &str| DidError::InvalidEvent(format!("external DID document: {}", what));
        let object = value.as_object().ok_or_else(|| malformed("not a JSON object"))?;

        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing id"))?;
        let mut document = Self::new(id);
        document.controller = object
            .get("controller")
            .and_then(Value::as_str)
            .filter(|c| *c != id)
            .map(str::to_string);

        if let Some(methods) = object.get("verificationMethod") {
            let methods: Vec<VerificationMethod> = serde_json::from_value(methods.clone())
                .map_err(|e| malformed(&format!("verificationMethod: {}", e)))?;
            for method in methods {
                document.upsert_verification_method(method);
            }
        }

        for kind in VerificationRelationshipType::ALL {
            let Some(entries) = object.get(kind.as_str()) else {
                continue;
            };
            let entries = entries
                .as_array()
                .ok_or_else(|| malformed(&format!("{} is not a list", kind)))?;
            for entry in entries {
                match entry {
                    Value::String(reference) => document.add_relationship(kind, reference),
                    Value::Object(_) => {
                        let method: VerificationMethod = serde_json::from_value(entry.clone())
                            .map_err(|e| malformed(&format!("{}: {}", kind, e)))?;
                        document.add_relationship(kind, &method.id);
                        document.upsert_verification_method(method);
                    }
                    _ => return Err(malformed(&format!("invalid {} entry", kind))),
                }
            }
        }

        if let Some(services) = object.get("service") {
            let services: Vec<Service> = serde_json::from_value(services.clone())
                .map_err(|e| malformed(&format!("service: {}", e)))?;
            for service in services {
                document.upsert_service(service);
            }
        }

        Ok(document)
    }
}

fn upsert_by<T>(list: &mut Vec<T>, item: T, key: impl Fn(&T) -> String) {
    let id = key(&item);
    match list.iter().position(|existing| key(existing) == id) {
        Some(pos) => list[pos] = item,
        None => list.push(item),
    }
}

fn remove_by<T>(list: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = list.len();
    list.retain(|item| !pred(item));
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DID: &str = "did:hedera:testnet:z87meAWt7t2zrDxo7qw3PVTjexKWReYWS75LH29THy8kb_0.0.29613327";

    fn method(fragment: &str, key: &str) -> VerificationMethod {
        VerificationMethod {
            id: format!("{DID}#{fragment}"),
            key_type: ED25519_KEY_TYPE.into(),
            controller: DID.into(),
            public_key_base58: key.into(),
        }
    }

    #[test]
    fn test_empty_document_json() {
        let doc = DidDocument::new(DID);
        assert_eq!(
            doc.to_json(),
            json!({
                "@context": DID_CONTEXT,
                "id": DID,
                "verificationMethod": [],
                "authentication": [],
                "assertionMethod": [],
            })
        );
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut doc = DidDocument::new(DID);
        doc.upsert_verification_method(method("key-1", "a"));
        doc.upsert_verification_method(method("key-2", "b"));
        doc.upsert_verification_method(method("key-1", "c"));

        assert_eq!(doc.verification_methods.len(), 2);
        assert_eq!(doc.verification_methods[0].public_key_base58, "c");
        assert_eq!(doc.verification_methods[1].id, format!("{DID}#key-2"));
        assert!(doc.remove_verification_method(&format!("{DID}#key-1")));
        assert!(!doc.remove_verification_method(&format!("{DID}#key-1")));
    }

    #[test]
    fn test_relationship_references_are_unique() {
        let mut doc = DidDocument::new(DID);
        let id = format!("{DID}#key-1");
        doc.add_relationship(VerificationRelationshipType::KeyAgreement, &id);
        doc.add_relationship(VerificationRelationshipType::KeyAgreement, &id);
        assert_eq!(doc.relationship(VerificationRelationshipType::KeyAgreement), [id.clone()]);

        let json = doc.to_json();
        assert_eq!(json["keyAgreement"], json!([id]));
        assert!(json.get("capabilityDelegation").is_none());
    }

    #[test]
    fn test_replace_relationship_without_duplicates() {
        let mut doc = DidDocument::new(DID);
        let kind = VerificationRelationshipType::Authentication;
        doc.add_relationship(kind, "old");
        doc.add_relationship(kind, "other");
        doc.add_relationship(kind, "new");

        doc.replace_relationship(kind, "old", "new");
        assert_eq!(doc.relationship(kind), ["new", "other"]);
    }

    #[test]
    fn test_controller_rendered_only_when_distinct() {
        let mut doc = DidDocument::new(DID);
        doc.controller = Some(DID.into());
        assert!(doc.to_json().get("controller").is_none());
        doc.controller = Some("did:hedera:testnet:zOther_0.0.1".into());
        assert_eq!(doc.to_json()["controller"], "did:hedera:testnet:zOther_0.0.1");
    }

    #[test]
    fn test_parses_external_document() {
        let key_1 = format!("{DID}#key-1");
        let value = json!({
            "@context": DID_CONTEXT,
            "id": DID,
            "controller": {},
            "verificationMethod": [{
                "id": key_1,
                "type": ED25519_KEY_TYPE,
                "controller": DID,
                "publicKeyBase58": "abc"
            }],
            "authentication": [key_1],
            "assertionMethod": [{
                "id": format!("{DID}#key-2"),
                "type": ED25519_KEY_TYPE,
                "controller": DID,
                "publicKeyBase58": "def"
            }],
            "service": [{
                "id": format!("{DID}#service-1"),
                "type": "LinkedDomains",
                "serviceEndpoint": "https://example.com/vcs"
            }]
        });

        let doc = DidDocument::from_json(&value).unwrap();
        assert_eq!(doc.id, DID);
        assert_eq!(doc.controller, None);
        assert_eq!(doc.verification_methods.len(), 2);
        assert_eq!(
            doc.relationship(VerificationRelationshipType::AssertionMethod),
            [format!("{DID}#key-2")]
        );
        assert_eq!(doc.services[0].service_endpoint, "https://example.com/vcs");
    }

    #[test]
    fn test_rejects_malformed_external_document() {
        assert!(DidDocument::from_json(&json!("text")).is_err());
        assert!(DidDocument::from_json(&json!({ "controller": DID })).is_err());
        assert!(DidDocument::from_json(&json!({ "id": DID, "authentication": 3 })).is_err());
    }
}
