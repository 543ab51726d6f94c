//! Integration test: HCS-1 files across the feed, the file service and the
//! streaming listener.

use std::sync::Arc;

use tokio::sync::mpsc;

use hiero_core::ErrorKind;
use hiero_crypto::KeyPair;
use hiero_hcs::file::{build_file_from_chunk_messages, FileMetadata};
use hiero_hcs::{HcsFileChunkMessage, HcsFileService, HcsTopicListener, TopicFeed};
use hiero_integration_tests::feed;

fn document(attributes: usize) -> Vec<u8> {
    let attrs: Vec<String> = (0..attributes)
        .map(|i| format!("attribute-{i}-{:x}", (i as u64).wrapping_mul(2_654_435_761)))
        .collect();
    serde_json::to_vec(&serde_json::json!({ "name": "large-schema", "attrNames": attrs }))
        .expect("serializable")
}

#[tokio::test]
async fn test_large_file_is_chunked_and_restored() -> anyhow::Result<()> {
    let feed = feed();
    let key = KeyPair::generate();
    let payload = document(2_000);
    let service = HcsFileService::new(feed.clone());

    let topic_id = service.submit_file(&payload, &key).await?;
    let stored = feed.messages(&topic_id);
    assert!(stored.len() > 1, "expected several chunks, got {}", stored.len());
    assert!(stored.iter().all(|m| m.payload.len() < 1_200));

    let memo = feed.get_topic_memo(&topic_id).await?;
    assert_eq!(memo.parse::<FileMetadata>()?, FileMetadata::for_payload(&payload));

    let reader = HcsFileService::new(feed.clone());
    assert_eq!(reader.resolve_file(&topic_id).await?, Some(payload));
    Ok(())
}

#[tokio::test]
async fn test_listener_sees_every_chunk() -> anyhow::Result<()> {
    let feed = feed();
    let key = KeyPair::generate();
    let payload = document(300);
    let service = HcsFileService::new(feed.clone()).with_max_chunk_size(128);
    let topic_id = service.submit_file(&payload, &key).await?;
    let total = feed.messages(&topic_id).len();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = HcsTopicListener::<HcsFileChunkMessage>::new(topic_id)
        .with_limit(total)
        .subscribe(
            feed.clone(),
            move |chunk| {
                let _ = tx.send(chunk);
            },
            |_| {},
        );
    handle.finished().await;

    let mut chunks = Vec::new();
    while let Ok(chunk) = rx.try_recv() {
        chunks.push(chunk);
    }
    assert_eq!(chunks.len(), total);
    assert_eq!(build_file_from_chunk_messages(&chunks)?, payload);
    Ok(())
}

#[tokio::test]
async fn test_only_the_owner_can_append_chunks() -> anyhow::Result<()> {
    let feed = feed();
    let owner = KeyPair::generate();
    let topic_id = HcsFileService::new(feed.clone())
        .submit_file(&document(10), &owner)
        .await?;

    let stray = HcsFileChunkMessage::new(1, "appended by someone else");
    let err = hiero_hcs::HcsMessageTransaction::new(topic_id, &stray)
        .sign_with(&KeyPair::generate())
        .execute(feed.as_ref())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(feed.messages(&topic_id).len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_topic_is_not_found() {
    let feed = feed();
    let service = HcsFileService::new(Arc::clone(&feed) as Arc<dyn TopicFeed>);
    let err = service
        .resolve_file(&hiero_core::TopicId::new(0, 0, 42))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
