use hiero_core::TopicId;
use hiero_crypto::KeyPair;

use crate::error::HcsError;
use crate::feed::{SubmitAck, TopicFeed};
use crate::message::HcsMessage;

/// A message bound for a topic, submitted with the given signing keys.
pub struct HcsMessageTransaction<'a, M> {
    topic_id: TopicId,
    message: &'a M,
    signing_keys: Vec<KeyPair>,
}

impl<'a, M: HcsMessage> HcsMessageTransaction<'a, M> {
    pub fn new(topic_id: TopicId, message: &'a M) -> Self {
        Self {
            topic_id,
            message,
            signing_keys: Vec::new(),
        }
    }

    pub fn sign_with(mut self, key: &KeyPair) -> Self {
        self.signing_keys.push(key.clone());
        self
    }

    /// Serialize and submit. Invalid messages are refused before any feed call.
    pub async fn execute(&self, feed: &dyn TopicFeed) -> Result<SubmitAck, HcsError> {
        if !self.message.is_valid(Some(&self.topic_id)) {
            return Err(HcsError::InvalidMessage(format!(
                "refusing to submit invalid message to topic {}",
                self.topic_id
            )));
        }
        let payload = self.message.to_payload()?;
        let ack = feed
            .submit(&self.topic_id, payload, &self.signing_keys)
            .await?;
        tracing::debug!(
            topic_id = %ack.topic_id,
            sequence = ack.sequence_number,
            "message submitted"
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TopicOptions;
    use crate::memory::InMemoryTopicFeed;
    use crate::pipeline::test_support::TextMessage;

    #[tokio::test]
    async fn test_execute_submits_payload() {
        let feed = InMemoryTopicFeed::new();
        let key = KeyPair::generate();
        let topic = feed
            .create_topic(
                &TopicOptions {
                    memo: String::new(),
                    submit_key: Some(key.public_key()),
                },
                &[],
            )
            .await
            .unwrap();

        let message = TextMessage("hello".into());
        let ack = HcsMessageTransaction::new(topic, &message)
            .sign_with(&key)
            .execute(&feed)
            .await
            .unwrap();
        assert_eq!(ack.sequence_number, 1);
        assert_eq!(feed.messages(&topic)[0].payload, b"hello");
    }

    #[tokio::test]
    async fn test_unsigned_submission_denied() {
        let feed = InMemoryTopicFeed::new();
        let key = KeyPair::generate();
        let topic = feed
            .create_topic(
                &TopicOptions {
                    memo: String::new(),
                    submit_key: Some(key.public_key()),
                },
                &[],
            )
            .await
            .unwrap();
        let message = TextMessage("hello".into());
        let err = HcsMessageTransaction::new(topic, &message)
            .execute(&feed)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), hiero_core::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_invalid_message_not_submitted() {
        let feed = InMemoryTopicFeed::new();
        let topic = feed
            .create_topic(&TopicOptions::default(), &[])
            .await
            .unwrap();
        let message = TextMessage(String::new());
        assert!(HcsMessageTransaction::new(topic, &message)
            .execute(&feed)
            .await
            .is_err());
        assert!(feed.messages(&topic).is_empty());
    }
}
