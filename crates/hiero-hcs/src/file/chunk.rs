use serde::{Deserialize, Serialize};

use hiero_core::TopicId;

use crate::error::HcsError;
use crate::message::HcsMessage;

/// One fragment of an HCS-1 file: `{"o": <index>, "c": "<content>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HcsFileChunkMessage {
    #[serde(rename = "o")]
    pub ordering_index: i64,
    #[serde(rename = "c")]
    pub content: String,
}

impl HcsFileChunkMessage {
    pub fn new(ordering_index: i64, content: impl Into<String>) -> Self {
        Self {
            ordering_index,
            content: content.into(),
        }
    }
}

impl HcsMessage for HcsFileChunkMessage {
    fn from_payload(payload: &[u8]) -> Result<Self, HcsError> {
        serde_json::from_slice(payload).map_err(|_| {
            HcsError::InvalidMessage(
                "HcsFileChunkMessage JSON parsing failed: Invalid JSON structure".into(),
            )
        })
    }

    fn to_payload(&self) -> Result<Vec<u8>, HcsError> {
        Ok(serde_json::to_vec(self)?)
    }

    fn is_valid(&self, _topic_id: Option<&TopicId>) -> bool {
        self.ordering_index >= 0 && !self.content.is_empty()
    }
}
