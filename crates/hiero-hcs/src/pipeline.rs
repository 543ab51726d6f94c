//! Per-message processing shared by the resolver and the listener.
//!
//! Each raw message passes, in order: user filters, payload decoding, and
//! message validation against the topic. A message failing any stage is
//! dropped and reported; it never aborts the batch.

use std::sync::Arc;

use hiero_core::{TopicId, TopicMessage};

use crate::message::{HcsMessage, HcsMessageWithResponseMetadata};

/// Predicate over raw messages; `false` drops the message.
pub type MessageFilter = Arc<dyn Fn(&TopicMessage) -> bool + Send + Sync>;

/// Receives dropped messages with the reason they were dropped.
pub type InvalidMessageHandler = Arc<dyn Fn(&TopicMessage, &str) + Send + Sync>;

pub const REJECTED_BY_FILTER: &str = "Message response was rejected by user-defined filter";
pub const EXTRACTION_FAILED: &str = "Extracting message from the mirror response failed";
pub const INVALID_MESSAGE: &str = "Extracted message is invalid";

/// Filters and the invalid-message handler, configured before use.
#[derive(Clone, Default)]
pub struct MessagePipeline {
    filters: Vec<MessageFilter>,
    invalid_message_handler: Option<InvalidMessageHandler>,
}

impl MessagePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, filter: MessageFilter) {
        self.filters.push(filter);
    }

    pub fn set_invalid_message_handler(&mut self, handler: InvalidMessageHandler) {
        self.invalid_message_handler = Some(handler);
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Run one raw message through the pipeline.
    pub fn process<M: HcsMessage>(
        &self,
        topic_id: &TopicId,
        raw: &TopicMessage,
    ) -> Option<HcsMessageWithResponseMetadata<M>> {
        if !self.filters.iter().all(|filter| filter(raw)) {
            self.report_invalid(raw, REJECTED_BY_FILTER);
            return None;
        }

        let message = match M::from_payload(&raw.payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(
                    topic_id = %topic_id,
                    sequence = raw.sequence_number,
                    error = %e,
                    "failed to extract HCS message from response"
                );
                self.report_invalid(raw, EXTRACTION_FAILED);
                return None;
            }
        };

        if !message.is_valid(Some(topic_id)) {
            self.report_invalid(raw, INVALID_MESSAGE);
            return None;
        }

        Some(HcsMessageWithResponseMetadata {
            message,
            sequence_number: raw.sequence_number,
            consensus_timestamp: raw.consensus_timestamp,
        })
    }

    fn report_invalid(&self, raw: &TopicMessage, reason: &str) {
        tracing::warn!(
            topic_id = %raw.topic_id,
            sequence = raw.sequence_number,
            payload = %raw.payload_lossy(),
            reason,
            "got invalid message"
        );
        if let Some(handler) = &self.invalid_message_handler {
            handler(raw, reason);
        }
    }
}

impl std::fmt::Debug for MessagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePipeline")
            .field("filters", &self.filters.len())
            .field(
                "invalid_message_handler",
                &self.invalid_message_handler.is_some(),
            )
            .finish()
    }
}
