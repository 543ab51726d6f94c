//! Hiero Core: Shared types, the error taxonomy, the TTL cache, and
//! configuration for the Hiero DID and AnonCreds resolution crates.

pub mod cache;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use cache::{Cache, CacheEntry, MemoryCache};
pub use config::HieroConfig;
pub use error::{CoreError, ErrorKind};
pub use types::{Timestamp, TopicId, TopicMessage};
