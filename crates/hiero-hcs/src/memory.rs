//! In-process topic feed.
//!
//! Implements the full [`TopicFeed`] contract without a network: monotonic
//! consensus timestamps, per-topic sequence numbers, submit-key enforcement,
//! and live subscriptions over a broadcast channel. Also exposes hooks that
//! resolution tests rely on: raw message injection, per-topic query logs,
//! injected stream errors and an offline switch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use tokio::sync::broadcast;

use hiero_core::{Timestamp, TopicId, TopicMessage};
use hiero_crypto::{KeyPair, PublicKey};

use crate::error::HcsError;
use crate::feed::{MessageStream, SubmitAck, TopicFeed, TopicInfo, TopicOptions, TopicQuery};

const LIVE_CHANNEL_CAPACITY: usize = 1024;
const FIRST_TOPIC_NUM: u64 = 1000;

type LiveItem = Result<TopicMessage, String>;

struct TopicState {
    memo: String,
    submit_key: Option<PublicKey>,
    messages: Vec<TopicMessage>,
    next_sequence: u64,
    live: broadcast::Sender<LiveItem>,
}

impl TopicState {
    fn new(options: &TopicOptions) -> Self {
        let (live, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self {
            memo: options.memo.clone(),
            submit_key: options.submit_key,
            messages: Vec::new(),
            next_sequence: 1,
            live,
        }
    }

    fn authorize(&self, signing_keys: &[KeyPair]) -> Result<(), HcsError> {
        match &self.submit_key {
            Some(required) if !signing_keys.iter().any(|k| k.public_key() == *required) => {
                Err(HcsError::PermissionDenied(
                    "transaction is not signed by the topic submit key".into(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Insert in feed order and notify live subscribers.
    fn append(&mut self, topic_id: TopicId, timestamp: Timestamp, payload: Vec<u8>) -> SubmitAck {
        let message = TopicMessage {
            topic_id,
            sequence_number: self.next_sequence,
            consensus_timestamp: timestamp,
            payload,
        };
        self.next_sequence += 1;

        let key = message.order_key();
        let pos = self.messages.partition_point(|m| m.order_key() <= key);
        self.messages.insert(pos, message.clone());

        let ack = SubmitAck {
            topic_id,
            sequence_number: message.sequence_number,
            consensus_timestamp: timestamp,
        };
        // No receivers is fine.
        let _ = self.live.send(Ok(message));
        ack
    }
}

struct Clock {
    last: Option<Timestamp>,
    /// Next manual timestamp and the step in seconds between submissions.
    manual: Option<(Timestamp, i64)>,
}

/// In-memory [`TopicFeed`].
pub struct InMemoryTopicFeed {
    topics: DashMap<TopicId, TopicState>,
    next_topic_num: AtomicU64,
    clock: Mutex<Clock>,
    queries: DashMap<TopicId, Vec<TopicQuery>>,
    offline: AtomicBool,
}

impl InMemoryTopicFeed {
    /// Feed stamping submissions with the system clock.
    pub fn new() -> Self {
        Self::with_clock(None)
    }

    /// Feed stamping submissions at `start`, `start + step_secs`, and so on.
    pub fn with_manual_clock(start: Timestamp, step_secs: i64) -> Self {
        Self::with_clock(Some((start, step_secs)))
    }

    fn with_clock(manual: Option<(Timestamp, i64)>) -> Self {
        Self {
            topics: DashMap::new(),
            next_topic_num: AtomicU64::new(FIRST_TOPIC_NUM),
            clock: Mutex::new(Clock { last: None, manual }),
            queries: DashMap::new(),
            offline: AtomicBool::new(false),
        }
    }

    fn tick(&self) -> Timestamp {
        let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        let candidate = match clock.manual.as_mut() {
            Some((next, step)) => {
                let current = *next;
                *next = Timestamp {
                    seconds: next.seconds + *step,
                    nanos: next.nanos,
                };
                current
            }
            None => Timestamp::now(),
        };
        let stamped = match clock.last {
            Some(last) if candidate <= last => last.next_nano(),
            _ => candidate,
        };
        clock.last = Some(stamped);
        stamped
    }

    fn ensure_online(&self) -> Result<(), HcsError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(HcsError::Feed("topic feed unavailable".into()));
        }
        Ok(())
    }

    /// Make every feed call fail with a transient error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Append a raw payload at an exact consensus timestamp, bypassing the
    /// submit key. Used to replay recorded feeds and craft malformed input.
    pub fn insert_message(
        &self,
        topic_id: &TopicId,
        consensus_timestamp: Timestamp,
        payload: impl Into<Vec<u8>>,
    ) -> Result<SubmitAck, HcsError> {
        let mut state = self
            .topics
            .get_mut(topic_id)
            .ok_or(HcsError::TopicNotFound(*topic_id))?;
        Ok(state.append(*topic_id, consensus_timestamp, payload.into()))
    }

    /// Push a feed-level error to every live subscriber of the topic.
    pub fn inject_stream_error(&self, topic_id: &TopicId, reason: &str) -> Result<(), HcsError> {
        let state = self
            .topics
            .get(topic_id)
            .ok_or(HcsError::TopicNotFound(*topic_id))?;
        let _ = state.live.send(Err(reason.to_string()));
        Ok(())
    }

    /// Number of `query` calls made against a topic.
    pub fn query_count(&self, topic_id: &TopicId) -> usize {
        self.queries.get(topic_id).map_or(0, |q| q.len())
    }

    /// Every query window requested for a topic, oldest first.
    pub fn queries(&self, topic_id: &TopicId) -> Vec<TopicQuery> {
        self.queries
            .get(topic_id)
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// All stored messages for a topic, in feed order.
    pub fn messages(&self, topic_id: &TopicId) -> Vec<TopicMessage> {
        self.topics
            .get(topic_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

impl Default for InMemoryTopicFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicFeed for InMemoryTopicFeed {
    async fn query(
        &self,
        topic_id: &TopicId,
        query: &TopicQuery,
    ) -> Result<Vec<TopicMessage>, HcsError> {
        self.ensure_online()?;
        self.queries
            .entry(*topic_id)
            .or_default()
            .push(query.clone());

        let Some(state) = self.topics.get(topic_id) else {
            return Ok(Vec::new());
        };
        let matching = state
            .messages
            .iter()
            .filter(|m| query.contains(&m.consensus_timestamp));
        let messages = match query.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(messages)
    }

    async fn subscribe(
        &self,
        topic_id: &TopicId,
        start_time: Timestamp,
    ) -> Result<MessageStream, HcsError> {
        self.ensure_online()?;

        // Receiver and snapshot are taken under the same shard lock that
        // `append` holds, so no message is missed or delivered twice.
        let (history, receiver) = {
            let state = self
                .topics
                .get(topic_id)
                .ok_or(HcsError::TopicNotFound(*topic_id))?;
            let receiver = state.live.subscribe();
            let history: Vec<TopicMessage> = state
                .messages
                .iter()
                .filter(|m| m.consensus_timestamp >= start_time)
                .cloned()
                .collect();
            (history, receiver)
        };

        let live = stream::unfold(receiver, |mut receiver| async move {
            let item = match receiver.recv().await {
                Ok(Ok(message)) => Ok(message),
                Ok(Err(reason)) => Err(HcsError::Feed(reason)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => Err(HcsError::Feed(format!(
                    "subscriber lagged behind by {} messages",
                    skipped
                ))),
                Err(broadcast::error::RecvError::Closed) => return None,
            };
            Some((item, receiver))
        })
        .filter(move |item| {
            let keep = match item {
                Ok(message) => message.consensus_timestamp >= start_time,
                Err(_) => true,
            };
            futures::future::ready(keep)
        });

        Ok(stream::iter(history.into_iter().map(Ok))
            .chain(live)
            .boxed())
    }

    async fn get_topic_info(&self, topic_id: &TopicId) -> Result<TopicInfo, HcsError> {
        self.ensure_online()?;
        let state = self
            .topics
            .get(topic_id)
            .ok_or(HcsError::TopicNotFound(*topic_id))?;
        Ok(TopicInfo {
            memo: state.memo.clone(),
            submit_key: state.submit_key,
        })
    }

    async fn create_topic(
        &self,
        options: &TopicOptions,
        _signing_keys: &[KeyPair],
    ) -> Result<TopicId, HcsError> {
        self.ensure_online()?;
        let num = self.next_topic_num.fetch_add(1, Ordering::SeqCst);
        let topic_id = TopicId::new(0, 0, num);
        self.topics.insert(topic_id, TopicState::new(options));
        tracing::debug!(topic_id = %topic_id, memo = %options.memo, "created topic");
        Ok(topic_id)
    }

    async fn update_topic(
        &self,
        topic_id: &TopicId,
        options: &TopicOptions,
        signing_keys: &[KeyPair],
    ) -> Result<(), HcsError> {
        self.ensure_online()?;
        let mut state = self
            .topics
            .get_mut(topic_id)
            .ok_or(HcsError::TopicNotFound(*topic_id))?;
        state.authorize(signing_keys)?;
        state.memo = options.memo.clone();
        state.submit_key = options.submit_key;
        Ok(())
    }

    async fn submit(
        &self,
        topic_id: &TopicId,
        payload: Vec<u8>,
        signing_keys: &[KeyPair],
    ) -> Result<SubmitAck, HcsError> {
        self.ensure_online()?;
        let mut state = self
            .topics
            .get_mut(topic_id)
            .ok_or(HcsError::TopicNotFound(*topic_id))?;
        state.authorize(signing_keys)?;
        let timestamp = self.tick();
        Ok(state.append(*topic_id, timestamp, payload))
    }
}
