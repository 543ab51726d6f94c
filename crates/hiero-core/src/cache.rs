//! Generic TTL key-value cache.
//!
//! The cache is an explicit, injectable component: registries and resolvers
//! take an `Arc<dyn Cache<K, V>>` so callers decide whether instances share
//! state or stay isolated.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A cached value with its insertion time and optional time-to-live.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub ttl: Option<Duration>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.inserted_at.elapsed() >= ttl,
            None => false,
        }
    }
}

/// Key-value cache safe for concurrent use across resolution calls.
///
/// Per-key operations are atomic. No cross-key atomicity is provided: a
/// `flush` racing with `get`/`set` may leave either the old value or nothing.
pub trait Cache<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace a value. `None` means the entry never expires.
    fn set(&self, key: K, value: V, ttl: Option<Duration>);

    fn remove(&self, key: &K);

    fn flush(&self);

    /// Number of live (non-expired) entries.
    fn size(&self) -> usize;
}

/// In-process cache backed by a sharded concurrent map.
#[derive(Debug)]
pub struct MemoryCache<K: Eq + Hash, V> {
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V> MemoryCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    fn purge_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }
}

impl<K: Eq + Hash, V> Default for MemoryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }
        // Read guard is released above; removing under it deadlocks the shard.
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        None
    }

    fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    fn flush(&self) {
        self.entries.clear();
    }

    fn size(&self) -> usize {
        self.purge_expired();
        self.entries.len()
    }
}
