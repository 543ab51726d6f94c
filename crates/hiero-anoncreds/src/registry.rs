use std::sync::Arc;
use std::time::Duration;

use hiero_core::{Cache, HieroConfig, MemoryCache, Timestamp, TopicId};
use hiero_crypto::KeyPair;
use hiero_did::HederaDidIdentifier;
use hiero_hcs::{
    HcsFileService, HcsMessageResolver, HcsMessageTransaction, HcsMessageWithResponseMetadata,
    HcsTopicService, TopicFeed, TopicOptions,
};

use crate::cred_def::AnonCredsCredDef;
use crate::error::AnonCredsError;
use crate::identifier::{AnonCredsIdentifier, AnonCredsObjectType};
use crate::payload::JsonPayload;
use crate::results::{
    GetCredDefResult, GetResult, GetRevListResult, GetRevRegDefResult, GetSchemaResult,
    RegisterCredDefResult, RegisterRevListResult, RegisterRevRegDefResult, RegisterSchemaResult,
    RegistrationResult,
};
use crate::revocation::{
    AnonCredsRevList, AnonCredsRevRegDef, AnonCredsRevRegEntry, HcsMetadata, RevRegDefWithHcsMetadata,
    RevRegEntryValue,
};
use crate::schema::AnonCredsSchema;

pub type RevRegEntryWithMetadata = HcsMessageWithResponseMetadata<AnonCredsRevRegEntry>;

/// Registry objects held in the cache, keyed by the topic they live on.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedObject {
    Schema(AnonCredsSchema),
    CredDef(AnonCredsCredDef),
    RevRegDef(RevRegDefWithHcsMetadata),
    /// Entries of one registry in consensus order, from the first entry on.
    RevRegEntries(Vec<RevRegEntryWithMetadata>),
}

/// A registry object stored as an HCS-1 file.
trait FileObject: JsonPayload + Clone {
    fn into_cached(self) -> CachedObject;
    fn from_cached(cached: CachedObject) -> Option<Self>;
}

impl FileObject for AnonCredsSchema {
    fn into_cached(self) -> CachedObject {
        CachedObject::Schema(self)
    }

    fn from_cached(cached: CachedObject) -> Option<Self> {
        match cached {
            CachedObject::Schema(schema) => Some(schema),
            _ => None,
        }
    }
}

impl FileObject for AnonCredsCredDef {
    fn into_cached(self) -> CachedObject {
        CachedObject::CredDef(self)
    }

    fn from_cached(cached: CachedObject) -> Option<Self> {
        match cached {
            CachedObject::CredDef(cred_def) => Some(cred_def),
            _ => None,
        }
    }
}

impl FileObject for RevRegDefWithHcsMetadata {
    fn into_cached(self) -> CachedObject {
        CachedObject::RevRegDef(self)
    }

    fn from_cached(cached: CachedObject) -> Option<Self> {
        match cached {
            CachedObject::RevRegDef(rev_reg_def) => Some(rev_reg_def),
            _ => None,
        }
    }
}

/// AnonCreds registry backed by HCS.
///
/// Schemas, credential definitions and revocation registry definitions are
/// HCS-1 files, one topic each. Revocation lists are folded from the entries
/// topic named in the registry definition's metadata.
#[derive(Clone)]
pub struct HederaAnonCredsRegistry {
    feed: Arc<dyn TopicFeed>,
    files: HcsFileService,
    topics: HcsTopicService,
    cache: Arc<dyn Cache<TopicId, CachedObject>>,
    object_ttl: Option<Duration>,
    entries_ttl: Option<Duration>,
}

impl HederaAnonCredsRegistry {
    pub fn new(feed: Arc<dyn TopicFeed>) -> Self {
        Self {
            files: HcsFileService::new(Arc::clone(&feed)),
            topics: HcsTopicService::new(Arc::clone(&feed)),
            feed,
            cache: Arc::new(MemoryCache::new()),
            object_ttl: None,
            entries_ttl: None,
        }
    }

    /// Registry with chunk size and cache TTLs taken from `config`.
    pub fn from_config(feed: Arc<dyn TopicFeed>, config: &HieroConfig) -> Self {
        let mut registry = Self::new(feed);
        registry.files = registry.files.with_max_chunk_size(config.hcs.max_chunk_size);
        registry.object_ttl = config.cache.default_ttl();
        registry.entries_ttl = config.cache.rev_reg_entries_ttl();
        registry
    }

    /// Share a cache with other registries or inspect it from outside.
    pub fn with_cache(mut self, cache: Arc<dyn Cache<TopicId, CachedObject>>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn get_schema(&self, schema_id: &str) -> GetSchemaResult {
        let outcome = async {
            let id = parse_id(schema_id, AnonCredsObjectType::Schema, "AnonCreds Schema id")?;
            self.resolve_file_object::<AnonCredsSchema>(&id.topic_id, || {
                format!("AnonCreds schema with id '{}' not found", schema_id)
            })
            .await
        }
        .await;
        GetResult::from_outcome(schema_id, outcome)
    }

    pub async fn register_schema(
        &self,
        schema: AnonCredsSchema,
        issuer_key: &KeyPair,
    ) -> RegisterSchemaResult {
        let issuer_id = schema.issuer_id.clone();
        self.register_file_object(schema, &issuer_id, AnonCredsObjectType::Schema, issuer_key)
            .await
    }

    pub async fn get_cred_def(&self, cred_def_id: &str) -> GetCredDefResult {
        let outcome = async {
            let id = parse_id(
                cred_def_id,
                AnonCredsObjectType::PublicCredDef,
                "Credential definition id",
            )?;
            self.resolve_file_object::<AnonCredsCredDef>(&id.topic_id, || {
                format!(
                    "AnonCreds credential definition with id '{}' not found",
                    cred_def_id
                )
            })
            .await
        }
        .await;
        GetResult::from_outcome(cred_def_id, outcome)
    }

    pub async fn register_cred_def(
        &self,
        cred_def: AnonCredsCredDef,
        issuer_key: &KeyPair,
    ) -> RegisterCredDefResult {
        let issuer_id = cred_def.issuer_id.clone();
        self.register_file_object(
            cred_def,
            &issuer_id,
            AnonCredsObjectType::PublicCredDef,
            issuer_key,
        )
        .await
    }

    pub async fn get_rev_reg_def(&self, rev_reg_def_id: &str) -> GetRevRegDefResult {
        let outcome = self
            .resolve_rev_reg_def(rev_reg_def_id)
            .await
            .map(|with_metadata| with_metadata.rev_reg_def);
        GetResult::from_outcome(rev_reg_def_id, outcome)
    }

    /// Create the entries topic (submit key: `issuer_key`), then store the
    /// definition with the topic in its metadata.
    pub async fn register_rev_reg_def(
        &self,
        rev_reg_def: AnonCredsRevRegDef,
        issuer_key: &KeyPair,
    ) -> RegisterRevRegDefResult {
        let outcome = async {
            HederaDidIdentifier::parse(&rev_reg_def.issuer_id)?;
            let entries_topic_id = self
                .topics
                .create_topic(
                    &TopicOptions {
                        memo: String::new(),
                        submit_key: Some(issuer_key.public_key()),
                    },
                    std::slice::from_ref(issuer_key),
                )
                .await?;

            let with_metadata = RevRegDefWithHcsMetadata {
                rev_reg_def: rev_reg_def.clone(),
                hcs_metadata: HcsMetadata {
                    entries_topic_id: Some(entries_topic_id),
                },
            };
            self.store_file_object(
                with_metadata,
                &rev_reg_def.issuer_id,
                AnonCredsObjectType::RevReg,
                issuer_key,
            )
            .await
        }
        .await;
        registration_result(rev_reg_def, outcome)
    }

    /// Revocation list as of `timestamp` (Unix seconds, inclusive).
    pub async fn get_rev_list(&self, rev_reg_id: &str, timestamp: i64) -> GetRevListResult {
        let outcome = async {
            let with_metadata = self.resolve_rev_reg_def(rev_reg_id).await?;
            let entries_topic_id = with_metadata.entries_topic_id()?;
            let entries = self
                .resolve_entries(entries_topic_id, Timestamp::end_of_second(timestamp))
                .await?;

            let last = entries.last().ok_or_else(|| {
                AnonCredsError::NotFound(format!(
                    "Registered revocation list for registry id '{}' is not found",
                    rev_reg_id
                ))
            })?;
            let messages: Vec<AnonCredsRevRegEntry> =
                entries.iter().map(|e| e.message.clone()).collect();
            AnonCredsRevList::from_rev_reg_entries(
                &messages,
                rev_reg_id,
                &with_metadata.rev_reg_def,
                Some(last.consensus_timestamp.seconds),
            )
        }
        .await;
        GetResult::from_outcome(rev_reg_id, outcome)
    }

    /// Publish the initial entry of a revocation list.
    pub async fn register_rev_list(
        &self,
        rev_list: AnonCredsRevList,
        issuer_key: &KeyPair,
    ) -> RegisterRevListResult {
        let outcome = async {
            let (with_metadata, entries_topic_id) =
                self.resolve_rev_reg_for_write(&rev_list.rev_reg_def_id).await?;
            check_list_size(&rev_list, &with_metadata.rev_reg_def)?;

            let entry = AnonCredsRevRegEntry::new(RevRegEntryValue {
                accum: rev_list.current_accumulator.clone(),
                prev_accum: None,
                revoked: rev_list.revoked_indices(),
                issued: Vec::new(),
            });
            self.submit_entry(entries_topic_id, &entry, issuer_key).await
        }
        .await;
        registration_result(rev_list, outcome.map(|()| None))
    }

    /// Publish the delta from `prev` to `curr`. `revoked` must be exactly the
    /// indices revoked in `curr` but not in `prev`.
    pub async fn update_rev_list(
        &self,
        prev: &AnonCredsRevList,
        curr: AnonCredsRevList,
        revoked: &[u32],
        issuer_key: &KeyPair,
    ) -> RegisterRevListResult {
        let outcome = async {
            let (with_metadata, entries_topic_id) =
                self.resolve_rev_reg_for_write(&curr.rev_reg_def_id).await?;
            if prev.rev_reg_def_id != curr.rev_reg_def_id {
                return Err(AnonCredsError::Validation(format!(
                    "previous list belongs to '{}', not '{}'",
                    prev.rev_reg_def_id, curr.rev_reg_def_id
                )));
            }
            check_list_size(&curr, &with_metadata.rev_reg_def)?;
            let issued = curr.delta_from(prev, revoked)?;

            let mut revoked = revoked.to_vec();
            revoked.sort_unstable();
            revoked.dedup();
            let entry = AnonCredsRevRegEntry::new(RevRegEntryValue {
                accum: curr.current_accumulator.clone(),
                prev_accum: Some(prev.current_accumulator.clone()),
                revoked,
                issued,
            });
            self.submit_entry(entries_topic_id, &entry, issuer_key).await
        }
        .await;
        registration_result(curr, outcome.map(|()| None))
    }

    async fn resolve_file_object<T: FileObject>(
        &self,
        topic_id: &TopicId,
        not_found: impl FnOnce() -> String,
    ) -> Result<T, AnonCredsError> {
        if let Some(cached) = self.cache.get(topic_id).and_then(T::from_cached) {
            tracing::debug!(topic_id = %topic_id, model = T::NAME, "cache hit");
            return Ok(cached);
        }

        let payload = self
            .files
            .resolve_file(topic_id)
            .await?
            .ok_or_else(|| AnonCredsError::NotFound(not_found()))?;
        let object = T::from_json(&payload)?;
        self.cache
            .set(*topic_id, object.clone().into_cached(), self.object_ttl);
        Ok(object)
    }

    async fn register_file_object<T: FileObject>(
        &self,
        object: T,
        issuer_id: &str,
        object_type: AnonCredsObjectType,
        issuer_key: &KeyPair,
    ) -> RegistrationResult<T> {
        let outcome = async {
            HederaDidIdentifier::parse(issuer_id)?;
            self.store_file_object(object.clone(), issuer_id, object_type, issuer_key)
                .await
        }
        .await;
        registration_result(object, outcome)
    }

    async fn store_file_object<T: FileObject>(
        &self,
        object: T,
        issuer_id: &str,
        object_type: AnonCredsObjectType,
        issuer_key: &KeyPair,
    ) -> Result<Option<String>, AnonCredsError> {
        let topic_id = self.files.submit_file(&object.to_json()?, issuer_key).await?;
        self.cache.set(topic_id, object.into_cached(), self.object_ttl);

        let id = AnonCredsIdentifier::new(issuer_id, topic_id, object_type).to_string();
        tracing::info!(id = %id, object_type = %object_type, "AnonCreds object registered");
        Ok(Some(id))
    }

    async fn resolve_rev_reg_def(
        &self,
        rev_reg_def_id: &str,
    ) -> Result<RevRegDefWithHcsMetadata, AnonCredsError> {
        let id = parse_id(
            rev_reg_def_id,
            AnonCredsObjectType::RevReg,
            "Revocation registry id",
        )?;
        self.resolve_file_object(&id.topic_id, || {
            format!(
                "AnonCreds revocation registry with id '{}' not found",
                rev_reg_def_id
            )
        })
        .await
    }

    async fn resolve_rev_reg_for_write(
        &self,
        rev_reg_def_id: &str,
    ) -> Result<(RevRegDefWithHcsMetadata, TopicId), AnonCredsError> {
        let with_metadata = self.resolve_rev_reg_def(rev_reg_def_id).await?;
        let entries_topic_id = with_metadata.entries_topic_id()?;
        Ok((with_metadata, entries_topic_id))
    }

    /// Entries with consensus time up to `cutoff`.
    ///
    /// A cached sequence reaching `cutoff` answers without a feed call.
    /// Otherwise only entries after the cached tail are fetched and merged.
    async fn resolve_entries(
        &self,
        entries_topic_id: TopicId,
        cutoff: Timestamp,
    ) -> Result<Vec<RevRegEntryWithMetadata>, AnonCredsError> {
        let mut entries = match self.cache.get(&entries_topic_id) {
            Some(CachedObject::RevRegEntries(entries)) => entries,
            _ => Vec::new(),
        };

        let tail = entries.last().map(|e| e.consensus_timestamp);
        if tail.is_some_and(|tail| tail >= cutoff) {
            tracing::debug!(
                topic_id = %entries_topic_id,
                cutoff = %cutoff,
                "revocation entries resolved from cache"
            );
        } else {
            let start = tail.map_or(Timestamp::EPOCH, |tail| tail.next_nano());
            let delta = HcsMessageResolver::<AnonCredsRevRegEntry>::new(
                entries_topic_id,
                Arc::clone(&self.feed),
            )
            .with_start_time(start)
            .with_end_time(cutoff)
            .execute_with_metadata()
            .await?;

            tracing::debug!(
                topic_id = %entries_topic_id,
                start = %start,
                fetched = delta.len(),
                "fetched revocation entries"
            );
            if !delta.is_empty() {
                entries.extend(delta);
                self.cache.set(
                    entries_topic_id,
                    CachedObject::RevRegEntries(entries.clone()),
                    self.entries_ttl,
                );
            }
        }

        entries.retain(|e| e.consensus_timestamp <= cutoff);
        Ok(entries)
    }

    async fn submit_entry(
        &self,
        entries_topic_id: TopicId,
        entry: &AnonCredsRevRegEntry,
        issuer_key: &KeyPair,
    ) -> Result<(), AnonCredsError> {
        let ack = HcsMessageTransaction::new(entries_topic_id, entry)
            .sign_with(issuer_key)
            .execute(self.feed.as_ref())
            .await?;
        tracing::info!(
            topic_id = %entries_topic_id,
            sequence = ack.sequence_number,
            revoked = entry.value.revoked.len(),
            issued = entry.value.issued.len(),
            "revocation entry published"
        );
        Ok(())
    }
}

/// Parse a registry id; a well-formed id of another object type is reported
/// as not found.
fn parse_id(
    id: &str,
    expected: AnonCredsObjectType,
    label: &str,
) -> Result<AnonCredsIdentifier, AnonCredsError> {
    let parsed = AnonCredsIdentifier::parse(id)?;
    if parsed.object_type != expected {
        return Err(AnonCredsError::NotFound(format!("{} '{}' is invalid", label, id)));
    }
    Ok(parsed)
}

fn check_list_size(
    rev_list: &AnonCredsRevList,
    rev_reg_def: &AnonCredsRevRegDef,
) -> Result<(), AnonCredsError> {
    let expected = rev_reg_def.value.max_cred_num as usize;
    if rev_list.revocation_list.len() != expected {
        return Err(AnonCredsError::Validation(format!(
            "revocation list has {} entries, registry allows {}",
            rev_list.revocation_list.len(),
            expected
        )));
    }
    Ok(())
}

fn registration_result<T>(
    value: T,
    outcome: Result<Option<String>, AnonCredsError>,
) -> RegistrationResult<T> {
    match outcome {
        Ok(id) => RegistrationResult::finished(value, id),
        Err(e) => {
            tracing::warn!(error = %e, "AnonCreds registration failed");
            RegistrationResult::failed(value, &e)
        }
    }
}
