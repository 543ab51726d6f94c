use hiero_core::{Timestamp, TopicId};

use crate::error::HcsError;

/// A typed message carried in a topic payload.
pub trait HcsMessage: Sized + Send + 'static {
    fn from_payload(payload: &[u8]) -> Result<Self, HcsError>;

    fn to_payload(&self) -> Result<Vec<u8>, HcsError>;

    /// Structural validity, optionally checked against the topic it arrived on.
    fn is_valid(&self, topic_id: Option<&TopicId>) -> bool;
}

/// A decoded message together with its feed position.
#[derive(Debug, Clone, PartialEq)]
pub struct HcsMessageWithResponseMetadata<M> {
    pub message: M,
    pub sequence_number: u64,
    pub consensus_timestamp: Timestamp,
}

impl<M> HcsMessageWithResponseMetadata<M> {
    pub fn map<N>(self, f: impl FnOnce(M) -> N) -> HcsMessageWithResponseMetadata<N> {
        HcsMessageWithResponseMetadata {
            message: f(self.message),
            sequence_number: self.sequence_number,
            consensus_timestamp: self.consensus_timestamp,
        }
    }
}
