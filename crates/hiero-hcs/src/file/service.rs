use std::sync::Arc;

use hiero_core::config::MAX_CHUNK_SIZE;
use hiero_core::TopicId;
use hiero_crypto::KeyPair;

use crate::error::HcsError;
use crate::feed::{TopicFeed, TopicOptions};
use crate::file::chunk::HcsFileChunkMessage;
use crate::file::codec::{build_file_from_chunk_messages, get_file_chunk_messages, FileMetadata};
use crate::resolver::HcsMessageResolver;
use crate::topic::HcsTopicService;
use crate::transaction::HcsMessageTransaction;

/// Stores and retrieves HCS-1 files, one topic per file.
#[derive(Clone)]
pub struct HcsFileService {
    feed: Arc<dyn TopicFeed>,
    topics: HcsTopicService,
    max_chunk_size: usize,
}

impl HcsFileService {
    pub fn new(feed: Arc<dyn TopicFeed>) -> Self {
        Self {
            topics: HcsTopicService::new(Arc::clone(&feed)),
            feed,
            max_chunk_size: MAX_CHUNK_SIZE,
        }
    }

    /// Override the chunk size; clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Create a file topic and submit every chunk. Returns the topic id.
    pub async fn submit_file(
        &self,
        payload: &[u8],
        submit_key: &KeyPair,
    ) -> Result<TopicId, HcsError> {
        let chunks = get_file_chunk_messages(payload, self.max_chunk_size)?;
        let metadata = FileMetadata::for_payload(payload);

        let topic_id = self
            .topics
            .create_topic(
                &TopicOptions {
                    memo: metadata.to_string(),
                    submit_key: Some(submit_key.public_key()),
                },
                std::slice::from_ref(submit_key),
            )
            .await?;

        for chunk in &chunks {
            HcsMessageTransaction::new(topic_id, chunk)
                .sign_with(submit_key)
                .execute(self.feed.as_ref())
                .await?;
        }

        tracing::info!(
            topic_id = %topic_id,
            chunks = chunks.len(),
            bytes = payload.len(),
            "HCS-1 file submitted"
        );
        Ok(topic_id)
    }

    /// Resolve a file. `Ok(None)` when the topic holds no chunk messages.
    pub async fn resolve_file(&self, topic_id: &TopicId) -> Result<Option<Vec<u8>>, HcsError> {
        let memo = self.feed.get_topic_memo(topic_id).await?;
        let metadata: FileMetadata = memo.parse().map_err(|e| {
            tracing::warn!(topic_id = %topic_id, memo = %memo, error = %e, "invalid HCS-1 memo");
            HcsError::InvalidMetadata(format!(
                "HCS file Topic '{}' is invalid - must contain memo compliant with HCS-1 standard",
                topic_id
            ))
        })?;

        let chunks = HcsMessageResolver::<HcsFileChunkMessage>::new(*topic_id, Arc::clone(&self.feed))
            .execute()
            .await?;
        if chunks.is_empty() {
            return Ok(None);
        }

        let payload = build_file_from_chunk_messages(&chunks)?;
        if !metadata.matches(&payload) {
            return Err(HcsError::IntegrityError {
                expected: metadata.sha256_hex,
                actual: hiero_crypto::hashing::sha256_hex(&payload),
            });
        }
        Ok(Some(payload))
    }
}
