use std::marker::PhantomData;
use std::sync::Arc;

use hiero_core::{Timestamp, TopicId};

use crate::error::HcsError;
use crate::feed::{TopicFeed, TopicQuery};
use crate::message::{HcsMessage, HcsMessageWithResponseMetadata};
use crate::pipeline::{InvalidMessageHandler, MessageFilter, MessagePipeline};

/// Pulls a window of topic messages and runs each through the pipeline.
///
/// Output order is exactly feed order. A feed error aborts the whole call;
/// per-message failures are reported and skipped.
pub struct HcsMessageResolver<M> {
    topic_id: TopicId,
    feed: Arc<dyn TopicFeed>,
    query: TopicQuery,
    pipeline: MessagePipeline,
    _message: PhantomData<fn() -> M>,
}

impl<M: HcsMessage> HcsMessageResolver<M> {
    pub fn new(topic_id: TopicId, feed: Arc<dyn TopicFeed>) -> Self {
        Self {
            topic_id,
            feed,
            query: TopicQuery::default(),
            pipeline: MessagePipeline::new(),
            _message: PhantomData,
        }
    }

    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.query.start_time = start_time;
        self
    }

    pub fn with_end_time(mut self, end_time: Timestamp) -> Self {
        self.query.end_time = Some(end_time);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn with_filter(mut self, filter: MessageFilter) -> Self {
        self.pipeline.add_filter(filter);
        self
    }

    pub fn with_invalid_message_handler(mut self, handler: InvalidMessageHandler) -> Self {
        self.pipeline.set_invalid_message_handler(handler);
        self
    }

    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    pub async fn execute(&self) -> Result<Vec<M>, HcsError> {
        Ok(self
            .execute_with_metadata()
            .await?
            .into_iter()
            .map(|m| m.message)
            .collect())
    }

    pub async fn execute_with_metadata(
        &self,
    ) -> Result<Vec<HcsMessageWithResponseMetadata<M>>, HcsError> {
        let raw = self.feed.query(&self.topic_id, &self.query).await?;
        let total = raw.len();

        let messages: Vec<_> = raw
            .iter()
            .filter_map(|msg| self.pipeline.process::<M>(&self.topic_id, msg))
            .collect();

        tracing::debug!(
            topic_id = %self.topic_id,
            received = total,
            accepted = messages.len(),
            "resolved topic messages"
        );
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TopicOptions;
    use crate::memory::InMemoryTopicFeed;
    use crate::pipeline::test_support::TextMessage;
    use crate::pipeline::INVALID_MESSAGE;
    use std::sync::Mutex;

    async fn feed_with(payloads: &[&str]) -> (Arc<InMemoryTopicFeed>, TopicId) {
        let feed = Arc::new(InMemoryTopicFeed::with_manual_clock(
            Timestamp::from_seconds(100),
            1,
        ));
        let topic = feed
            .create_topic(&TopicOptions::default(), &[])
            .await
            .unwrap();
        for p in payloads {
            feed.submit(&topic, p.as_bytes().to_vec(), &[]).await.unwrap();
        }
        (feed, topic)
    }

    #[tokio::test]
    async fn test_resolves_in_feed_order() {
        let (feed, topic) = feed_with(&["one", "two", "three"]).await;
        let resolver = HcsMessageResolver::<TextMessage>::new(topic, feed);
        let out = resolver.execute().await.unwrap();
        assert_eq!(
            out,
            vec![
                TextMessage("one".into()),
                TextMessage("two".into()),
                TextMessage("three".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_messages_skipped_not_fatal() {
        let (feed, topic) = feed_with(&["good", "", "reject: bad", "also good"]).await;
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reasons);

        let out = HcsMessageResolver::<TextMessage>::new(topic, feed)
            .with_invalid_message_handler(Arc::new(move |msg, reason| {
                sink.lock()
                    .unwrap()
                    .push((msg.sequence_number, reason.to_string()));
            }))
            .execute_with_metadata()
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].sequence_number, 1);
        assert_eq!(out[1].sequence_number, 4);
        assert_eq!(out[1].consensus_timestamp, Timestamp::from_seconds(103));
        assert_eq!(
            *reasons.lock().unwrap(),
            vec![
                (2, INVALID_MESSAGE.to_string()),
                (3, INVALID_MESSAGE.to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_time_window_and_filters() {
        let (feed, topic) = feed_with(&["a", "b", "c", "d"]).await;
        let out = HcsMessageResolver::<TextMessage>::new(topic, feed.clone())
            .with_start_time(Timestamp::from_seconds(101))
            .with_end_time(Timestamp::from_seconds(103))
            .with_filter(Arc::new(|msg| msg.payload != b"c"))
            .execute()
            .await
            .unwrap();
        assert_eq!(out, vec![TextMessage("b".into()), TextMessage("d".into())]);

        let recorded = feed.queries(&topic);
        assert_eq!(recorded[0].start_time, Timestamp::from_seconds(101));
    }

    #[tokio::test]
    async fn test_feed_error_aborts() {
        let (feed, topic) = feed_with(&["a"]).await;
        feed.set_offline(true);
        let err = HcsMessageResolver::<TextMessage>::new(topic, feed)
            .execute()
            .await
            .unwrap_err();
        assert!(err.kind().is_retryable());
    }
}
