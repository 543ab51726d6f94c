//! Configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CoreError;

/// Upper bound on an HCS-1 chunk fragment, in bytes.
pub const MAX_CHUNK_SIZE: usize = 1024;

/// Full configuration for the resolution workspace.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HieroConfig {
    /// Ledger network selection.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Cache TTL settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// HCS message and file settings.
    #[serde(default)]
    pub hcs: HcsConfig,

    /// External document gateway.
    #[serde(default)]
    pub ipfs: IpfsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network name (mainnet, testnet, previewnet, local-node).
    #[serde(default = "default_network")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// TTL applied to registry objects; none means entries never expire.
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,
    /// TTL applied to cached revocation entry sequences.
    #[serde(default)]
    pub rev_reg_entries_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HcsConfig {
    /// Maximum chunk fragment size in bytes.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpfsConfig {
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_network() -> String {
    "testnet".into()
}
fn default_max_chunk_size() -> usize {
    MAX_CHUNK_SIZE
}
fn default_gateway_url() -> String {
    "https://ipfs.io/ipfs/".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network(),
        }
    }
}

impl Default for HcsConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }

    pub fn rev_reg_entries_ttl(&self) -> Option<Duration> {
        self.rev_reg_entries_ttl_secs.map(Duration::from_secs)
    }
}

impl HieroConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: HieroConfig =
                toml::from_str(&contents).map_err(|e| CoreError::Config(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.hcs.max_chunk_size == 0 || self.hcs.max_chunk_size > MAX_CHUNK_SIZE {
            return Err(CoreError::Config(format!(
                "hcs.max_chunk_size must be within 1..={}, got {}",
                MAX_CHUNK_SIZE, self.hcs.max_chunk_size
            )));
        }
        if !matches!(
            self.network.name.as_str(),
            "mainnet" | "testnet" | "previewnet" | "local-node"
        ) {
            return Err(CoreError::Config(format!(
                "unknown network: {}",
                self.network.name
            )));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(CoreError::Config(format!(
                "unknown log format: {}",
                self.logging.format
            )));
        }
        Ok(())
    }
}
