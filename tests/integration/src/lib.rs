//! Fixtures shared by the integration tests.

use std::sync::Arc;

use std::io::Write;

use hiero_core::config::{HieroConfig, LoggingConfig};
use hiero_core::telemetry::init_tracing;
use hiero_core::Timestamp;
use hiero_crypto::KeyPair;
use hiero_did::{HederaDid, StaticDocumentFetcher};
use hiero_hcs::InMemoryTopicFeed;

/// Consensus time of the first message on a fresh feed.
pub const FEED_START_SECS: i64 = 1_700_000_000;

/// Seconds between consecutive submissions on a fresh feed.
pub const FEED_STEP_SECS: i64 = 5;

/// Install a test subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let config = LoggingConfig {
        level: "debug".into(),
        ..LoggingConfig::default()
    };
    let _ = init_tracing(&config);
}

/// An in-memory feed on a deterministic clock.
pub fn feed() -> Arc<InMemoryTopicFeed> {
    init_test_tracing();
    Arc::new(InMemoryTopicFeed::with_manual_clock(
        Timestamp::from_seconds(FEED_START_SECS),
        FEED_STEP_SECS,
    ))
}

/// Load a configuration from TOML text through a scratch file.
pub fn load_config(contents: &str) -> anyhow::Result<HieroConfig> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(HieroConfig::load(file.path())?)
}

/// A registered testnet DID owned by a fresh key.
pub async fn registered_did(
    feed: &Arc<InMemoryTopicFeed>,
    fetcher: Arc<StaticDocumentFetcher>,
) -> anyhow::Result<(HederaDid, KeyPair)> {
    registered_did_with_config(feed, fetcher, &HieroConfig::default()).await
}

/// A registered DID on the configured network, owned by a fresh key.
pub async fn registered_did_with_config(
    feed: &Arc<InMemoryTopicFeed>,
    fetcher: Arc<StaticDocumentFetcher>,
    config: &HieroConfig,
) -> anyhow::Result<(HederaDid, KeyPair)> {
    let key = KeyPair::generate();
    let mut did = HederaDid::from_config(feed.clone(), fetcher, config, Some(key.clone()))?;
    let identifier = did.register().await?;
    tracing::debug!(did = %identifier, "fixture DID registered");
    Ok((did, key))
}
