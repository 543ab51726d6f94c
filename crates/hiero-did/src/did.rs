use std::sync::Arc;

use hiero_core::config::HieroConfig;
use hiero_core::Timestamp;
use hiero_crypto::{KeyPair, PublicKey};
use hiero_hcs::{HcsMessageTransaction, HcsTopicService, TopicFeed, TopicOptions};

use crate::document::{DidDocument, VerificationRelationshipType};
use crate::error::DidError;
use crate::event::{
    DidDocumentOperation, DidEvent, OwnerEvent, RevokeRelationshipEvent, ServiceEvent,
    VerificationMethodEvent, VerificationRelationshipEvent,
};
use crate::identifier::{base_did, HederaDidIdentifier, HederaNetwork};
use crate::message::{HcsDidMessage, HcsDidMessageEnvelope};
use crate::projection::{DidProjection, DocumentState, EventRejection};
use crate::resolver::{DocumentFetcher, HederaDidResolver};

/// Writer for a single Hedera DID.
///
/// Every mutation resolves the current document first, so writes against
/// an unregistered or deleted DID fail before anything is submitted.
pub struct HederaDid {
    feed: Arc<dyn TopicFeed>,
    topics: HcsTopicService,
    resolver: HederaDidResolver,
    network: HederaNetwork,
    identifier: Option<HederaDidIdentifier>,
    private_key: Option<KeyPair>,
    document: Option<DidDocument>,
}

impl HederaDid {
    /// A DID yet to be registered on `network`.
    pub fn new(
        feed: Arc<dyn TopicFeed>,
        fetcher: Arc<dyn DocumentFetcher>,
        network: HederaNetwork,
        private_key: Option<KeyPair>,
    ) -> Self {
        Self {
            topics: HcsTopicService::new(Arc::clone(&feed)),
            resolver: HederaDidResolver::new(Arc::clone(&feed), fetcher),
            feed,
            network,
            identifier: None,
            private_key,
            document: None,
        }
    }

    /// An existing DID; without a private key it can only be resolved.
    pub fn from_identifier(
        feed: Arc<dyn TopicFeed>,
        fetcher: Arc<dyn DocumentFetcher>,
        identifier: &str,
        private_key: Option<KeyPair>,
    ) -> Result<Self, DidError> {
        let identifier = HederaDidIdentifier::parse(identifier)?;
        let mut did = Self::new(feed, fetcher, identifier.network(), private_key);
        did.identifier = Some(identifier);
        Ok(did)
    }

    /// A DID yet to be registered on the network named in `config`.
    pub fn from_config(
        feed: Arc<dyn TopicFeed>,
        fetcher: Arc<dyn DocumentFetcher>,
        config: &HieroConfig,
        private_key: Option<KeyPair>,
    ) -> Result<Self, DidError> {
        let network: HederaNetwork = config.network.name.parse()?;
        Ok(Self::new(feed, fetcher, network, private_key))
    }

    pub fn identifier(&self) -> Option<&HederaDidIdentifier> {
        self.identifier.as_ref()
    }

    /// Last document seen by `resolve`.
    pub fn document(&self) -> Option<&DidDocument> {
        self.document.as_ref()
    }

    /// Create the DID topic (unless the identifier already names one) and
    /// publish the owner event.
    pub async fn register(&mut self) -> Result<HederaDidIdentifier, DidError> {
        let key = self
            .private_key
            .clone()
            .ok_or_else(|| DidError::InvalidState("private key is required to register a DID".into()))?;

        let identifier = match self.identifier {
            Some(identifier) => {
                let projection = self.resolver.resolve_projection(&identifier).await?;
                if projection.state() != DocumentState::Bootstrapping {
                    return Err(DidError::InvalidState("DID is already registered".into()));
                }
                identifier
            }
            None => {
                let topic_id = self
                    .topics
                    .create_topic(
                        &TopicOptions {
                            memo: String::new(),
                            submit_key: Some(key.public_key()),
                        },
                        std::slice::from_ref(&key),
                    )
                    .await?;
                let identifier = HederaDidIdentifier::new(self.network, &key.public_key(), topic_id);
                self.identifier = Some(identifier);
                identifier
            }
        };

        let event = DidEvent::CreateOwner(OwnerEvent::new(identifier.to_string(), key.public_key())?);
        self.submit(DidDocumentOperation::Create, event, &key, &key).await?;
        tracing::info!(did = %identifier, "DID registered");
        Ok(identifier)
    }

    /// Hand the document to `controller`, whose root key becomes
    /// `new_private_key`.
    ///
    /// The topic submit key moves to the new key before the owner event is
    /// published, so a failed rotation leaves the DID writable with the old
    /// key and a failed publish can be retried.
    pub async fn change_owner(
        &mut self,
        controller: &str,
        new_private_key: KeyPair,
    ) -> Result<(), DidError> {
        let (identifier, key, projection) = self.assert_can_update().await?;
        let event = DidEvent::UpdateOwner(OwnerEvent::new(controller, new_private_key.public_key())?);
        dry_run(&projection, &event)?;

        let topic_id = identifier.topic_id().to_string();
        let info = self.topics.get_topic_info(&topic_id).await?;
        if info.submit_key != Some(new_private_key.public_key()) {
            self.topics
                .update_topic(
                    &topic_id,
                    &TopicOptions {
                        memo: info.memo,
                        submit_key: Some(new_private_key.public_key()),
                    },
                    &[key.clone(), new_private_key.clone()],
                )
                .await?;
        }

        self.submit(DidDocumentOperation::Update, event, &key, &new_private_key)
            .await?;
        self.private_key = Some(new_private_key);
        tracing::info!(did = %identifier, controller = %controller, "DID owner changed");
        Ok(())
    }

    pub async fn add_service(
        &mut self,
        id: &str,
        service_type: &str,
        service_endpoint: &str,
    ) -> Result<(), DidError> {
        let event = DidEvent::UpsertService(ServiceEvent::new(id, service_type, service_endpoint)?);
        self.publish(DidDocumentOperation::Create, event).await
    }

    pub async fn update_service(
        &mut self,
        id: &str,
        service_type: &str,
        service_endpoint: &str,
    ) -> Result<(), DidError> {
        let event = DidEvent::UpsertService(ServiceEvent::new(id, service_type, service_endpoint)?);
        self.publish(DidDocumentOperation::Update, event).await
    }

    pub async fn revoke_service(&mut self, id: &str) -> Result<(), DidError> {
        self.publish(DidDocumentOperation::Revoke, DidEvent::revoke_service(id)?)
            .await
    }

    pub async fn add_verification_method(
        &mut self,
        id: &str,
        controller: &str,
        public_key: PublicKey,
    ) -> Result<(), DidError> {
        let event = DidEvent::UpsertVerificationMethod(VerificationMethodEvent::new(
            id, controller, public_key,
        )?);
        self.publish(DidDocumentOperation::Create, event).await
    }

    pub async fn revoke_verification_method(&mut self, id: &str) -> Result<(), DidError> {
        self.publish(
            DidDocumentOperation::Revoke,
            DidEvent::revoke_verification_method(id)?,
        )
        .await
    }

    pub async fn add_verification_relationship(
        &mut self,
        id: &str,
        controller: &str,
        public_key: PublicKey,
        relationship_type: VerificationRelationshipType,
    ) -> Result<(), DidError> {
        let event = DidEvent::UpsertVerificationRelationship(VerificationRelationshipEvent::new(
            id,
            controller,
            public_key,
            relationship_type,
        )?);
        self.publish(DidDocumentOperation::Create, event).await
    }

    pub async fn revoke_verification_relationship(
        &mut self,
        id: &str,
        relationship_type: VerificationRelationshipType,
    ) -> Result<(), DidError> {
        let event = DidEvent::RevokeVerificationRelationship(RevokeRelationshipEvent::new(
            id,
            relationship_type,
        )?);
        self.publish(DidDocumentOperation::Revoke, event).await
    }

    /// Deactivate the document. Nothing can be published afterwards.
    pub async fn delete(&mut self) -> Result<(), DidError> {
        self.publish(DidDocumentOperation::Delete, DidEvent::DeleteDocument)
            .await?;
        self.document = None;
        Ok(())
    }

    pub async fn resolve(&mut self) -> Result<DidDocument, DidError> {
        let identifier = self.require_identifier()?;
        let document = self
            .resolver
            .resolve_document(&identifier.to_string())
            .await?;
        self.document = Some(document.clone());
        Ok(document)
    }

    async fn publish(
        &mut self,
        operation: DidDocumentOperation,
        event: DidEvent,
    ) -> Result<(), DidError> {
        let (identifier, key, projection) = self.assert_can_update().await?;
        if let Some(id) = event.id() {
            if base_did(id) != identifier.to_string() {
                return Err(DidError::InvalidEvent(format!(
                    "{} does not belong to {}",
                    id, identifier
                )));
            }
        }
        dry_run(&projection, &event)?;
        self.submit(operation, event, &key, &key).await
    }

    /// Resolve the document and check it accepts writes signed with our key.
    async fn assert_can_update(
        &mut self,
    ) -> Result<(HederaDidIdentifier, KeyPair, DidProjection), DidError> {
        let identifier = self.require_identifier()?;
        let key = self
            .private_key
            .clone()
            .ok_or_else(|| DidError::InvalidState("private key is required to update a DID".into()))?;

        let projection = self.resolver.resolve_projection(&identifier).await?;
        match projection.state() {
            DocumentState::Bootstrapping => return Err(DidError::NotFound(identifier.to_string())),
            DocumentState::Deactivated => {
                return Err(DidError::InvalidState("DID document is deactivated".into()))
            }
            DocumentState::Active => {}
        }
        self.document = Some(projection.document().clone());

        if projection.root_key() != Some(&key.public_key()) {
            return Err(DidError::InvalidState(
                "private key does not match the DID root key".into(),
            ));
        }
        Ok((identifier, key, projection))
    }

    fn require_identifier(&self) -> Result<HederaDidIdentifier, DidError> {
        self.identifier
            .ok_or_else(|| DidError::InvalidState("DID is not registered".into()))
    }

    /// Sign the message with `signing_key` and pay for the submission with
    /// `submit_key`.
    async fn submit(
        &self,
        operation: DidDocumentOperation,
        event: DidEvent,
        signing_key: &KeyPair,
        submit_key: &KeyPair,
    ) -> Result<(), DidError> {
        let identifier = self.require_identifier()?;
        let message = HcsDidMessage::new(operation, identifier.to_string(), event)?;
        let envelope = HcsDidMessageEnvelope::sign(message, signing_key)?;
        let ack = HcsMessageTransaction::new(*identifier.topic_id(), &envelope)
            .sign_with(submit_key)
            .execute(self.feed.as_ref())
            .await?;
        tracing::debug!(
            did = %identifier,
            operation = %operation,
            sequence = ack.sequence_number,
            "DID message submitted"
        );
        Ok(())
    }
}

/// Refuse events the projection would not apply, so they never reach the topic.
fn dry_run(projection: &DidProjection, event: &DidEvent) -> Result<(), DidError> {
    let at = projection.document().updated.unwrap_or(Timestamp::EPOCH);
    match projection.apply(event, at, None) {
        Ok(_) => Ok(()),
        Err(EventRejection::Rejected(reason)) => Err(DidError::InvalidEvent(reason)),
        Err(EventRejection::Ignored(state)) => Err(DidError::InvalidState(format!(
            "DID document cannot accept this event in state {:?}",
            state
        ))),
    }
}
