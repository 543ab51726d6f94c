use std::marker::PhantomData;
use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;

use hiero_core::{Timestamp, TopicId};

use crate::error::HcsError;
use crate::feed::TopicFeed;
use crate::message::{HcsMessage, HcsMessageWithResponseMetadata};
use crate::pipeline::{InvalidMessageHandler, MessageFilter, MessagePipeline};

/// Streams topic messages through the pipeline into a callback.
///
/// Delivery is serial per subscription and unbuffered: the next message is
/// not pulled from the feed until the callback returns.
pub struct HcsTopicListener<M> {
    topic_id: TopicId,
    start_time: Timestamp,
    end_time: Option<Timestamp>,
    limit: Option<usize>,
    pipeline: MessagePipeline,
    _message: PhantomData<fn() -> M>,
}

/// Handle to a running subscription.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stop delivery. Already-issued feed calls may still complete remotely.
    pub fn unsubscribe(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the subscription ends, by exhaustion, error or cancellation.
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}

impl<M: HcsMessage> HcsTopicListener<M> {
    pub fn new(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            start_time: Timestamp::EPOCH,
            end_time: None,
            limit: None,
            pipeline: MessagePipeline::new(),
            _message: PhantomData,
        }
    }

    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.start_time = start_time;
        self
    }

    /// Stop once a message past `end_time` arrives.
    pub fn with_end_time(mut self, end_time: Timestamp) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Stop after this many raw messages.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
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

    /// Subscribe, delivering bare messages.
    pub fn subscribe<F, E>(
        self,
        feed: Arc<dyn TopicFeed>,
        mut receiver: F,
        error_handler: E,
    ) -> SubscriptionHandle
    where
        F: FnMut(M) + Send + 'static,
        E: FnOnce(HcsError) + Send + 'static,
    {
        self.subscribe_with_metadata(feed, move |m| receiver(m.message), error_handler)
    }

    /// Subscribe, delivering messages with their sequence number and timestamp.
    ///
    /// Must be called within a Tokio runtime. A feed-level error is passed to
    /// `error_handler` and ends the subscription.
    pub fn subscribe_with_metadata<F, E>(
        self,
        feed: Arc<dyn TopicFeed>,
        mut receiver: F,
        error_handler: E,
    ) -> SubscriptionHandle
    where
        F: FnMut(HcsMessageWithResponseMetadata<M>) + Send + 'static,
        E: FnOnce(HcsError) + Send + 'static,
    {
        let Self {
            topic_id,
            start_time,
            end_time,
            limit,
            pipeline,
            ..
        } = self;

        let task = tokio::spawn(async move {
            let mut stream = match feed.subscribe(&topic_id, start_time).await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(topic_id = %topic_id, error = %e, "subscription failed");
                    error_handler(e);
                    return;
                }
            };

            let mut seen = 0usize;
            while let Some(item) = stream.next().await {
                let raw = match item {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!(topic_id = %topic_id, error = %e, "subscription error");
                        error_handler(e);
                        return;
                    }
                };

                if end_time.is_some_and(|end| raw.consensus_timestamp > end) {
                    break;
                }

                if let Some(message) = pipeline.process::<M>(&topic_id, &raw) {
                    receiver(message);
                }

                seen += 1;
                if limit.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            tracing::debug!(topic_id = %topic_id, delivered = seen, "subscription ended");
        });

        SubscriptionHandle { task }
    }
}
