//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry: serialized payload plus metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized payload bytes
    pub payload: Vec<u8>,
    /// Byte length of the payload; must always equal `payload.len()`
    pub size_bytes: usize,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds); always in the future at creation
    pub expires_at: u64,
    /// Number of successful reads since creation
    pub hit_count: u64,
    /// Timestamp of the most recent successful read (creation time if never read)
    pub last_accessed_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// Callers are responsible for rejecting zero TTLs before construction.
    pub fn new(payload: Vec<u8>, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let size_bytes = payload.len();

        Self {
            payload,
            size_bytes,
            created_at: now,
            expires_at: now.saturating_add(ttl.as_millis() as u64),
            hit_count: 0,
            last_accessed_at: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is considered expired when the current time
    /// is greater than or equal to the expiration time, so an entry whose TTL
    /// has fully elapsed is immediately treated as stale.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Touch ==
    /// Records a successful read: bumps the hit count and refreshes the
    /// last-access timestamp.
    pub fn touch(&mut self) {
        self.hit_count += 1;
        self.last_accessed_at = current_timestamp_ms();
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or 0 once the entry has expired.
    ///
    /// Useful for diagnostics and tests.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let now = current_timestamp_ms();
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
