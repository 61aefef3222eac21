//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.
//! Pure observability: counters never influence eviction or expiry decisions.

use serde::Serialize;

// == Cache Stats ==
/// Running hit/miss/eviction counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found, expired, or undecodable)
    pub misses: u64,
    /// Number of entries evicted by the count/size ceilings or memory pressure
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Evictions ==
    /// Adds to the eviction counter.
    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    // == Reset ==
    /// Zeroes all counters, starting a fresh measurement window.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Statistics Snapshot ==
/// Point-in-time diagnostics view combining counters with live store totals.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatistics {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Hit rate (hits / (hits + misses)), 0.0 with no requests
    pub hit_rate: f64,
    /// Current number of entries in the cache
    pub total_items: usize,
    /// Aggregate payload size across all entries, in bytes
    pub total_size_bytes: usize,
}

impl CacheStatistics {
    /// Builds a snapshot from the running counters and the store's totals.
    pub fn new(stats: &CacheStats, total_items: usize, total_size_bytes: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
            total_items,
            total_size_bytes,
        }
    }
}
