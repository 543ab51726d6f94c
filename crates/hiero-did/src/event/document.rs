use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_target;
use crate::error::DidError;
use crate::identifier::{
    parse_fragment_id, FragmentKind, HederaDidIdentifier, DOCUMENT_FRAGMENT,
};

const EVENT_NAME: &str = "Document event";
const DOCUMENT_TYPE: &str = "DIDDocument";

/// Points the projection at a document published under a content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEvent {
    pub id: String,
    pub cid: String,
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct DocumentWire {
    id: String,
    #[serde(rename = "type")]
    document_type: String,
    cid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl DocumentEvent {
    /// `did` may be given bare or already carrying the `#did-document` fragment.
    pub fn new(did: &str, cid: impl Into<String>, url: Option<String>) -> Result<Self, DidError> {
        let id = if did.contains('#') {
            parse_fragment_id(did, FragmentKind::Document)?;
            did.to_string()
        } else {
            HederaDidIdentifier::parse(did)
                .map_err(|_| DidError::InvalidEvent("DID is invalid".into()))?;
            format!("{}#{}", did, DOCUMENT_FRAGMENT)
        };
        Ok(Self {
            id,
            cid: cid.into(),
            url,
        })
    }

    pub(super) fn to_json(&self) -> Value {
        let wire = DocumentWire {
            id: self.id.clone(),
            document_type: DOCUMENT_TYPE.to_string(),
            cid: self.cid.clone(),
            url: self.url.clone(),
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub(super) fn from_json(value: &Value) -> Result<Self, DidError> {
        let wire: DocumentWire = parse_target(value, EVENT_NAME)?;
        if wire.document_type != DOCUMENT_TYPE || wire.cid.is_empty() {
            return Err(DidError::InvalidEvent(format!(
                "{} JSON parsing failed: Invalid JSON structure",
                EVENT_NAME
            )));
        }
        Self::new(&wire.id, wire.cid, wire.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DID: &str = "did:hedera:testnet:z87meAWt7t2zrDxo7qw3PVTjexKWReYWS75LH29THy8kb_0.0.29613327";
    const CID: &str = "QmaBcDeFgHiJkLmNoP";

    #[test]
    fn test_bare_did_gets_document_fragment() {
        let event = DocumentEvent::new(DID, CID, Some(format!("https://ipfs.io/ipfs/{CID}"))).unwrap();
        assert_eq!(event.id, format!("{DID}#did-document"));
        assert_eq!(
            event.to_json(),
            json!({
                "id": format!("{DID}#did-document"),
                "type": "DIDDocument",
                "cid": CID,
                "url": format!("https://ipfs.io/ipfs/{CID}"),
            })
        );
    }

    #[test]
    fn test_rejects_invalid_did() {
        let err = DocumentEvent::new("example", CID, None).unwrap_err();
        assert_eq!(err.to_string(), "DID is invalid");
    }

    #[test]
    fn test_url_is_optional_on_the_wire() {
        let payload = json!({ "id": DID, "type": "DIDDocument", "cid": CID });
        let event = DocumentEvent::from_json(&payload).unwrap();
        assert_eq!(event.url, None);
        assert!(event.to_json().get("url").is_none());
    }
}
