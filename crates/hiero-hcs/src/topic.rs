use std::sync::Arc;

use hiero_core::TopicId;
use hiero_crypto::KeyPair;

use crate::error::HcsError;
use crate::feed::{TopicFeed, TopicInfo, TopicOptions};

/// Topic administration over a feed.
///
/// Topic identifiers given as strings are validated before any feed call.
#[derive(Clone)]
pub struct HcsTopicService {
    feed: Arc<dyn TopicFeed>,
}

impl HcsTopicService {
    pub fn new(feed: Arc<dyn TopicFeed>) -> Self {
        Self { feed }
    }

    pub async fn create_topic(
        &self,
        options: &TopicOptions,
        signing_keys: &[KeyPair],
    ) -> Result<TopicId, HcsError> {
        let topic_id = self.feed.create_topic(options, signing_keys).await?;
        tracing::info!(topic_id = %topic_id, "topic created");
        Ok(topic_id)
    }

    pub async fn update_topic(
        &self,
        topic_id: &str,
        options: &TopicOptions,
        signing_keys: &[KeyPair],
    ) -> Result<(), HcsError> {
        let topic_id: TopicId = topic_id.parse()?;
        self.feed
            .update_topic(&topic_id, options, signing_keys)
            .await?;
        tracing::info!(topic_id = %topic_id, "topic updated");
        Ok(())
    }

    pub async fn get_topic_info(&self, topic_id: &str) -> Result<TopicInfo, HcsError> {
        let topic_id: TopicId = topic_id.parse()?;
        self.feed.get_topic_info(&topic_id).await
    }
}
