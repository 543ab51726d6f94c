use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use hiero_core::config::IpfsConfig;
use hiero_core::Timestamp;
use hiero_hcs::{HcsMessageResolver, TopicFeed};

use crate::document::DidDocument;
use crate::error::DidError;
use crate::event::DidEvent;
use crate::identifier::HederaDidIdentifier;
use crate::message::HcsDidMessageEnvelope;
use crate::projection::{DidProjection, DocumentState};

pub const DID_JSON_LD_CONTENT_TYPE: &str = "application/did+ld+json";

/// Source of documents referenced by external document events.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, cid: &str) -> Result<DidDocument, DidError>;
}

/// Fetches `<gateway>/<cid>` over HTTP.
pub struct IpfsDocumentFetcher {
    client: reqwest::Client,
    gateway_url: String,
}

impl IpfsDocumentFetcher {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url: gateway_url.into(),
        }
    }

    pub fn from_config(config: &IpfsConfig) -> Self {
        Self::new(config.gateway_url.clone())
    }

    pub fn url_for(&self, cid: &str) -> String {
        format!("{}/{}", self.gateway_url.trim_end_matches('/'), cid)
    }
}

#[async_trait]
impl DocumentFetcher for IpfsDocumentFetcher {
    async fn fetch(&self, cid: &str) -> Result<DidDocument, DidError> {
        let url = self.url_for(cid);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DidError::DocumentFetch(format!("{}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(DidError::DocumentFetch(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| DidError::DocumentFetch(format!("{}: {}", url, e)))?;
        DidDocument::from_json(&body)
    }
}

/// Serves documents registered up front, keyed by content id.
#[derive(Default)]
pub struct StaticDocumentFetcher {
    documents: DashMap<String, Value>,
}

impl StaticDocumentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, cid: impl Into<String>, document: Value) {
        self.documents.insert(cid.into(), document);
    }
}

#[async_trait]
impl DocumentFetcher for StaticDocumentFetcher {
    async fn fetch(&self, cid: &str) -> Result<DidDocument, DidError> {
        let document = self
            .documents
            .get(cid)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DidError::DocumentFetch(format!("no document for {}", cid)))?;
        DidDocument::from_json(&document)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DidResolutionMetadata {
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of a DID resolution. Failures are carried in the metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DidResolutionResult {
    pub did_document: Option<Value>,
    pub did_document_metadata: DidDocumentMetadata,
    pub did_resolution_metadata: DidResolutionMetadata,
}

impl DidResolutionResult {
    pub fn from_document(document: &DidDocument) -> Self {
        Self {
            did_document: Some(document.to_json()),
            did_document_metadata: DidDocumentMetadata {
                created: document.created.as_ref().and_then(format_timestamp),
                updated: document.updated.as_ref().and_then(format_timestamp),
                deactivated: document.deactivated.then_some(true),
                version_id: document.version_id.clone(),
            },
            did_resolution_metadata: DidResolutionMetadata {
                content_type: DID_JSON_LD_CONTENT_TYPE.to_string(),
                error: None,
                message: None,
            },
        }
    }

    pub fn from_error(error: &DidError) -> Self {
        Self {
            did_document: None,
            did_document_metadata: DidDocumentMetadata::default(),
            did_resolution_metadata: DidResolutionMetadata {
                content_type: DID_JSON_LD_CONTENT_TYPE.to_string(),
                error: Some(error.resolution_code().to_string()),
                message: Some(error.to_string()),
            },
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.did_resolution_metadata.error.as_deref()
    }
}

fn format_timestamp(timestamp: &Timestamp) -> Option<String> {
    timestamp
        .to_datetime()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[async_trait]
pub trait DidResolver: Send + Sync {
    async fn resolve(&self, did: &str) -> DidResolutionResult;
}

/// Resolves `did:hedera` documents by replaying the DID topic.
#[derive(Clone)]
pub struct HederaDidResolver {
    feed: Arc<dyn TopicFeed>,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl HederaDidResolver {
    pub fn new(feed: Arc<dyn TopicFeed>, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { feed, fetcher }
    }

    /// Replay the DID topic into a projection.
    ///
    /// External documents are fetched only for events that authenticate; a
    /// failed fetch fails the whole call.
    pub async fn resolve_projection(
        &self,
        identifier: &HederaDidIdentifier,
    ) -> Result<DidProjection, DidError> {
        let messages = HcsMessageResolver::<HcsDidMessageEnvelope>::new(
            *identifier.topic_id(),
            Arc::clone(&self.feed),
        )
        .execute_with_metadata()
        .await?;

        let mut projection = DidProjection::new(*identifier);
        for message in &messages {
            let external = match &message.message.message.event {
                DidEvent::CreateDocumentFromExternal(event)
                    if projection.authenticate(&message.message).is_ok() =>
                {
                    Some(self.fetcher.fetch(&event.cid).await?)
                }
                _ => None,
            };
            projection = projection.step(message, external.as_ref());
        }

        tracing::debug!(
            did = %identifier,
            messages = messages.len(),
            state = ?projection.state(),
            "DID topic replayed"
        );
        Ok(projection)
    }

    /// Resolve the current document. A DID whose topic never produced an
    /// owner is `NotFound`.
    pub async fn resolve_document(&self, did: &str) -> Result<DidDocument, DidError> {
        let identifier = HederaDidIdentifier::parse(did)?;
        let projection = self.resolve_projection(&identifier).await?;
        if projection.state() == DocumentState::Bootstrapping {
            return Err(DidError::NotFound(did.to_string()));
        }
        Ok(projection.into_document())
    }
}

#[async_trait]
impl DidResolver for HederaDidResolver {
    async fn resolve(&self, did: &str) -> DidResolutionResult {
        match self.resolve_document(did).await {
            Ok(document) => DidResolutionResult::from_document(&document),
            Err(e) => {
                tracing::warn!(did = %did, error = %e, "DID resolution failed");
                DidResolutionResult::from_error(&e)
            }
        }
    }
}
