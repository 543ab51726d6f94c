use serde::{Deserialize, Serialize};
use serde_json::Value;

use hiero_core::TopicId;
use hiero_crypto::{compression, encoding};
use hiero_hcs::{HcsError, HcsMessage};

use crate::error::AnonCredsError;
use crate::payload::JsonPayload;

pub const REV_REG_ENTRY_VERSION: &str = "1.0";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevRegEntryValue {
    pub accum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_accum: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revoked: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issued: Vec<u32>,
}

impl JsonPayload for RevRegEntryValue {
    const NAME: &'static str = "RevRegEntryValue";
}

/// One revocation registry delta, published to the registry's entries topic.
///
/// The JSON form is `{"ver", "value"}`. At rest on HCS it is wrapped as
/// `{"payload": base64(zstd(json))}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonCredsRevRegEntry {
    #[serde(default = "default_version")]
    pub ver: String,
    pub value: RevRegEntryValue,
}

fn default_version() -> String {
    REV_REG_ENTRY_VERSION.to_string()
}

#[derive(Serialize, Deserialize)]
struct CompressedWire {
    payload: String,
}

impl AnonCredsRevRegEntry {
    pub fn new(value: RevRegEntryValue) -> Self {
        Self {
            ver: default_version(),
            value,
        }
    }

    pub fn to_compressed_value(&self) -> Result<Value, AnonCredsError> {
        let compressed = compression::compress(&self.to_json()?)?;
        Ok(serde_json::to_value(CompressedWire {
            payload: encoding::bytes_to_b64(&compressed),
        })?)
    }

    pub fn from_compressed_value(value: Value) -> Result<Self, AnonCredsError> {
        let wire: CompressedWire = serde_json::from_value(value)
            .map_err(|_| AnonCredsError::InvalidJson(Self::NAME))?;
        let raw = compression::decompress(&encoding::b64_to_bytes(&wire.payload)?)?;
        Self::from_json(&raw)
    }
}

impl JsonPayload for AnonCredsRevRegEntry {
    const NAME: &'static str = "AnonCredsRevRegEntry";
}

impl HcsMessage for AnonCredsRevRegEntry {
    fn from_payload(payload: &[u8]) -> Result<Self, HcsError> {
        let value: Value = serde_json::from_slice(payload)?;
        Self::from_compressed_value(value).map_err(|e| HcsError::InvalidMessage(e.to_string()))
    }

    fn to_payload(&self) -> Result<Vec<u8>, HcsError> {
        let value = self
            .to_compressed_value()
            .map_err(|e| HcsError::InvalidMessage(e.to_string()))?;
        Ok(serde_json::to_vec(&value)?)
    }

    fn is_valid(&self, _topic_id: Option<&TopicId>) -> bool {
        !self.value.accum.is_empty()
    }
}
