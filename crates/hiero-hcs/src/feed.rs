//! The topic feed contract.
//!
//! The feed is the only collaborator that talks to the consensus network.
//! Timeouts and retries live behind it; every call here is a single fallible
//! awaitable operation.

use async_trait::async_trait;
use futures::stream::BoxStream;

use hiero_core::{Timestamp, TopicId, TopicMessage};
use hiero_crypto::{KeyPair, PublicKey};

use crate::error::HcsError;

/// Live message stream returned by [`TopicFeed::subscribe`].
pub type MessageStream = BoxStream<'static, Result<TopicMessage, HcsError>>;

/// Query window over a topic. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicQuery {
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub limit: Option<usize>,
}

impl TopicQuery {
    pub fn since(start_time: Timestamp) -> Self {
        Self {
            start_time,
            ..Self::default()
        }
    }

    /// Whether a consensus timestamp falls inside the window.
    pub fn contains(&self, timestamp: &Timestamp) -> bool {
        *timestamp >= self.start_time && self.end_time.map_or(true, |end| *timestamp <= end)
    }
}

/// Topic metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInfo {
    pub memo: String,
    pub submit_key: Option<PublicKey>,
}

/// Options for creating or updating a topic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicOptions {
    pub memo: String,
    pub submit_key: Option<PublicKey>,
}

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitAck {
    pub topic_id: TopicId,
    pub sequence_number: u64,
    pub consensus_timestamp: Timestamp,
}

/// Ordered delivery of raw topic messages plus topic administration.
#[async_trait]
pub trait TopicFeed: Send + Sync {
    /// Messages in the query window, in `(consensus_timestamp, sequence_number)` order.
    async fn query(&self, topic_id: &TopicId, query: &TopicQuery)
        -> Result<Vec<TopicMessage>, HcsError>;

    /// Messages from `start_time` onwards, historical first, then live.
    async fn subscribe(
        &self,
        topic_id: &TopicId,
        start_time: Timestamp,
    ) -> Result<MessageStream, HcsError>;

    async fn get_topic_info(&self, topic_id: &TopicId) -> Result<TopicInfo, HcsError>;

    async fn get_topic_memo(&self, topic_id: &TopicId) -> Result<String, HcsError> {
        Ok(self.get_topic_info(topic_id).await?.memo)
    }

    async fn create_topic(
        &self,
        options: &TopicOptions,
        signing_keys: &[KeyPair],
    ) -> Result<TopicId, HcsError>;

    async fn update_topic(
        &self,
        topic_id: &TopicId,
        options: &TopicOptions,
        signing_keys: &[KeyPair],
    ) -> Result<(), HcsError>;

    /// Submit a payload. Rejected with `PermissionDenied` when the topic has a
    /// submit key and none of `signing_keys` matches it.
    async fn submit(
        &self,
        topic_id: &TopicId,
        payload: Vec<u8>,
        signing_keys: &[KeyPair],
    ) -> Result<SubmitAck, HcsError>;
}
