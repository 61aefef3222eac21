//! Shared Cache Module
//!
//! Concurrency wrapper around [`CacheStore`] plus the typed serde surface
//! the rest of the client talks to.
//!
//! Writers (`set`, `remove`, `clear`, sweep, repair, pressure handling) and
//! `get` - which mutates access metadata and lazily deletes expired entries -
//! take the write lock; `contains`, `statistics`, and `validate` are
//! read-lock observers. The host process calls the lifecycle entry points
//! (`on_memory_pressure`, `on_suspend`) from whatever OS mechanism delivers
//! those signals; the originating mechanism is not this crate's concern.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheStatistics, CacheStore, ValidationReport};
use crate::config::CacheConfig;
use crate::error::Result;

// == Shared Cache ==
/// Clonable handle to a process-wide cache instance.
///
/// Constructed once by whichever component initializes the process and
/// injected into consumers; clones share the same underlying store.
#[derive(Debug, Clone)]
pub struct SharedCache {
    store: Arc<RwLock<CacheStore>>,
}

impl SharedCache {
    // == Constructor ==
    /// Creates a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(config))),
        }
    }

    // == Set ==
    /// Serializes `value` and stores it under `key`.
    ///
    /// Uses the configured default TTL when `ttl` is `None`. Surfaces
    /// serialization and validation errors synchronously; the store is
    /// unchanged on failure.
    pub async fn set<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let mut store = self.store.write().await;
        store.set(key.into(), value, ttl)
    }

    // == Get ==
    /// Retrieves and deserializes the value stored under `key`.
    ///
    /// Missing, expired, and undecodable entries all surface as `None`; the
    /// caller falls back to its own source of truth on a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut store = self.store.write().await;
        store.get(key)
    }

    // == Remove ==
    /// Removes the entry for `key` if present. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        store.remove(key)
    }

    // == Remove Matching ==
    /// Removes every entry whose key contains `pattern`; returns the count.
    pub async fn remove_matching(&self, pattern: &str) -> usize {
        let mut store = self.store.write().await;
        store.remove_matching(pattern)
    }

    // == Contains ==
    /// Returns true iff an unexpired entry exists (no metadata update).
    pub async fn contains(&self, key: &str) -> bool {
        let store = self.store.read().await;
        store.contains(key)
    }

    // == Clear ==
    /// Deletes all entries and resets statistics.
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        store.clear();
        debug!("cache cleared");
    }

    // == Statistics ==
    /// Returns a point-in-time statistics snapshot.
    pub async fn statistics(&self) -> CacheStatistics {
        let store = self.store.read().await;
        store.statistics()
    }

    // == Reset Statistics ==
    /// Zeroes the hit/miss/eviction counters for a fresh measurement window.
    pub async fn reset_statistics(&self) {
        let mut store = self.store.write().await;
        store.reset_statistics();
    }

    // == Validate ==
    /// Integrity-checks all entries without mutating them.
    pub async fn validate(&self) -> ValidationReport {
        let store = self.store.read().await;
        store.validate()
    }

    // == Repair ==
    /// Deletes expired/corrupted entries and fixes size mismatches in place.
    /// Returns the number of entries deleted or fixed.
    pub async fn repair(&self) -> usize {
        let mut store = self.store.write().await;
        store.repair()
    }

    // == Sweep Now ==
    /// Immediately removes all expired entries; returns the count.
    ///
    /// Called periodically by the background sweeper and out-of-cycle by
    /// `on_suspend`.
    pub async fn sweep_now(&self) -> usize {
        let mut store = self.store.write().await;
        store.sweep_expired()
    }

    // == Memory Pressure Entry Point ==
    /// Host-invoked low-memory handler: forces LRU eviction down to half the
    /// pre-signal item count, bypassing the configured ceilings.
    ///
    /// Returns the number of entries evicted.
    pub async fn on_memory_pressure(&self) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        let evicted = store.shrink_to_half();
        warn!(before, evicted, "memory pressure: forced cache shrink");
        evicted
    }

    // == Suspension Entry Point ==
    /// Host-invoked suspension handler: runs an immediate expiry sweep so
    /// stale entries do not linger across a long suspension.
    ///
    /// Returns the number of entries removed.
    pub async fn on_suspend(&self) -> usize {
        let removed = self.sweep_now().await;
        info!(removed, "suspension sweep completed");
        removed
    }
}
