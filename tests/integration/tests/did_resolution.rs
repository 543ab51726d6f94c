//! Integration test: DID writes observed through independent readers.

use std::sync::Arc;

use tokio::sync::mpsc;

use hiero_crypto::KeyPair;
use hiero_did::{
    DidDocumentOperation, DidEvent, DidResolver, HcsDidMessage, HcsDidMessageEnvelope,
    HederaDidResolver, StaticDocumentFetcher, VerificationRelationshipType,
};
use hiero_hcs::{HcsMessage, HcsTopicListener};
use hiero_integration_tests::{feed, registered_did};

#[tokio::test]
async fn test_document_lifecycle_seen_by_fresh_resolver() -> anyhow::Result<()> {
    let feed = feed();
    let fetcher = Arc::new(StaticDocumentFetcher::new());
    let (mut did, _) = registered_did(&feed, fetcher.clone()).await?;
    let did_str = did.identifier().expect("registered").to_string();

    let delegate = KeyPair::generate();
    did.add_service(
        &format!("{did_str}#service-1"),
        "LinkedDomains",
        "https://issuer.example/.well-known/did-configuration.json",
    )
    .await?;
    did.add_verification_method(&format!("{did_str}#key-1"), &did_str, delegate.public_key())
        .await?;
    did.add_verification_relationship(
        &format!("{did_str}#key-2"),
        &did_str,
        delegate.public_key(),
        VerificationRelationshipType::AssertionMethod,
    )
    .await?;

    let resolver = HederaDidResolver::new(feed.clone(), fetcher);
    let result = resolver.resolve(&did_str).await;
    assert_eq!(result.error(), None);

    let document = result.did_document.expect("document");
    assert_eq!(document["id"], did_str.as_str());
    assert_eq!(document["verificationMethod"].as_array().map(Vec::len), Some(3));
    assert_eq!(
        document["assertionMethod"],
        serde_json::json!([format!("{did_str}#key-2")])
    );
    assert_eq!(
        document["service"][0]["serviceEndpoint"],
        "https://issuer.example/.well-known/did-configuration.json"
    );
    assert!(result.did_document_metadata.created.is_some());
    assert!(result.did_document_metadata.version_id.is_some());

    did.delete().await?;
    let deleted = resolver.resolve(&did_str).await;
    assert_eq!(deleted.did_document_metadata.deactivated, Some(true));
    Ok(())
}

#[tokio::test]
async fn test_forged_messages_are_ignored() -> anyhow::Result<()> {
    let feed = feed();
    let fetcher = Arc::new(StaticDocumentFetcher::new());
    let (mut did, _) = registered_did(&feed, fetcher.clone()).await?;
    let identifier = *did.identifier().expect("registered");
    let did_str = identifier.to_string();

    // Bypasses the submit key, as a compromised relay could.
    let intruder = KeyPair::generate();
    let forged = HcsDidMessageEnvelope::sign(
        HcsDidMessage::new(
            DidDocumentOperation::Create,
            did_str.clone(),
            DidEvent::UpsertService(hiero_did::event::ServiceEvent::new(
                format!("{did_str}#service-9"),
                "LinkedDomains",
                "https://intruder.example",
            )?),
        )?,
        &intruder,
    )?;
    feed.insert_message(
        identifier.topic_id(),
        hiero_core::Timestamp::from_seconds(hiero_integration_tests::FEED_START_SECS + 3_600),
        forged.to_payload()?,
    )?;

    let document = did.resolve().await?;
    assert!(document.services.is_empty());

    let result = HederaDidResolver::new(feed.clone(), fetcher)
        .resolve(&did_str)
        .await;
    assert!(result.did_document.expect("document").get("service").is_none());
    Ok(())
}

#[tokio::test]
async fn test_unknown_did_reports_not_found() -> anyhow::Result<()> {
    let feed = feed();
    let fetcher = Arc::new(StaticDocumentFetcher::new());
    let (did, _) = registered_did(&feed, fetcher.clone()).await?;
    let identifier = did.identifier().expect("registered");

    // Same key, a topic that never received an owner event.
    let empty_topic = hiero_hcs::HcsTopicService::new(feed.clone())
        .create_topic(&hiero_hcs::TopicOptions::default(), &[])
        .await?;
    let orphan = hiero_did::HederaDidIdentifier::new(
        identifier.network(),
        &identifier.public_key()?,
        empty_topic,
    );

    let result = HederaDidResolver::new(feed.clone(), fetcher)
        .resolve(&orphan.to_string())
        .await;
    assert_eq!(result.error(), Some("notFound"));

    let malformed = HederaDidResolver::new(feed.clone(), Arc::new(StaticDocumentFetcher::new()))
        .resolve("did:hedera:testnet:not-a-did")
        .await;
    assert_eq!(malformed.error(), Some("invalidDid"));
    Ok(())
}

#[tokio::test]
async fn test_listener_streams_did_messages() -> anyhow::Result<()> {
    let feed = feed();
    let fetcher = Arc::new(StaticDocumentFetcher::new());
    let (mut did, _) = registered_did(&feed, fetcher).await?;
    let identifier = *did.identifier().expect("registered");
    let did_str = identifier.to_string();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = HcsTopicListener::<HcsDidMessageEnvelope>::new(*identifier.topic_id())
        .subscribe_with_metadata(
            feed.clone(),
            move |m| {
                let _ = tx.send(m);
            },
            |e| panic!("unexpected feed error: {e}"),
        );

    let owner = rx.recv().await.expect("owner event");
    assert_eq!(owner.sequence_number, 1);
    assert!(matches!(owner.message.message.event, DidEvent::CreateOwner(_)));

    did.add_service(&format!("{did_str}#service-1"), "LinkedDomains", "https://example.com")
        .await?;
    let service = rx.recv().await.expect("service event");
    assert_eq!(service.sequence_number, 2);
    assert!(service.consensus_timestamp > owner.consensus_timestamp);
    assert!(matches!(service.message.message.event, DidEvent::UpsertService(_)));

    handle.unsubscribe();
    Ok(())
}
