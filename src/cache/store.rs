//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, TTL
//! expiration, and count/size ceiling enforcement.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheStatistics, CacheStats, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// Values are kept as serialized bytes so the store stays type-agnostic;
/// callers bind the value type at `set`/`get` call sites via serde.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    pub(crate) entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    pub(crate) lru: LruTracker,
    /// Performance statistics
    pub(crate) stats: CacheStats,
    /// Maximum number of entries allowed
    max_item_count: usize,
    /// Maximum aggregate payload size in bytes
    max_total_bytes: usize,
    /// Default TTL for entries stored without an explicit TTL
    default_ttl: Duration,
}

/// Final classification of a lookup, resolved before any map mutation.
enum Lookup<T> {
    Hit(T),
    Missing,
    Expired,
    Corrupt,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given ceilings and default TTL.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_item_count: config.max_item_count,
            max_total_bytes: config.max_total_bytes,
            default_ttl: config.default_ttl,
        }
    }

    // == Set ==
    /// Serializes `value` and stores it under `key` with the given TTL.
    ///
    /// Overwrites atomically if the key already exists. After the write, the
    /// item-count and byte-size ceilings are enforced synchronously, so both
    /// invariants hold by the time this returns.
    ///
    /// Fails without mutating the store if the key is oversized, the TTL is
    /// zero, or the value cannot be serialized.
    pub fn set<T: Serialize>(&mut self, key: String, value: &T, ttl: Option<Duration>) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        if effective_ttl.is_zero() {
            return Err(CacheError::InvalidRequest(
                "ttl must be greater than zero".to_string(),
            ));
        }

        let payload = serde_json::to_vec(value).map_err(|source| CacheError::Serialization {
            key: key.clone(),
            source,
        })?;

        if payload.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "serialized value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let entry = CacheEntry::new(payload, effective_ttl);
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);

        self.enforce_ceilings();

        Ok(())
    }

    // == Get ==
    /// Retrieves and deserializes the value stored under `key`.
    ///
    /// Missing and expired entries both surface as `None` and count as
    /// misses; an expired entry is lazily deleted on the way out. An entry
    /// whose payload no longer decodes is evicted so it cannot fail
    /// repeatedly, and also counts as a miss.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let lookup = match self.entries.get_mut(key) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired() => Lookup::Expired,
            Some(entry) => match serde_json::from_slice::<T>(&entry.payload) {
                Ok(value) => {
                    entry.touch();
                    Lookup::Hit(value)
                }
                Err(err) => {
                    warn!(key, error = %err, "evicting undecodable cache entry");
                    Lookup::Corrupt
                }
            },
        };

        match lookup {
            Lookup::Hit(value) => {
                self.lru.touch(key);
                self.stats.record_hit();
                Some(value)
            }
            Lookup::Missing => {
                self.stats.record_miss();
                None
            }
            Lookup::Expired | Lookup::Corrupt => {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes an entry by key. Returns false (no-op) when the key is absent.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }

    // == Remove Matching ==
    /// Removes every entry whose key contains `pattern` as a substring.
    ///
    /// Returns the number of entries removed. Used to drop all cached data
    /// for one user (e.g. pattern `"user_42"`) in a single call.
    pub fn remove_matching(&mut self, pattern: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        if !matching.is_empty() {
            debug!(pattern, removed = matching.len(), "removed entries by pattern");
        }
        matching.len()
    }

    // == Contains ==
    /// Returns true iff an unexpired entry exists for `key`.
    ///
    /// Does not update access metadata or statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Clear ==
    /// Deletes all entries and resets statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.reset();
    }

    // == Sweep Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed. This is the safety net behind
    /// the lazy expiration `get` performs.
    pub fn sweep_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        expired_keys.len()
    }

    // == Shrink To Half ==
    /// Forced LRU eviction down to half the current item count, bypassing
    /// the configured ceilings. Invoked on a host memory-pressure signal.
    ///
    /// Returns the number of entries evicted.
    pub fn shrink_to_half(&mut self) -> usize {
        let target = self.entries.len() / 2;
        let mut removed = 0usize;

        while self.entries.len() > target {
            match self.lru.evict_oldest() {
                Some(key) => {
                    if self.entries.remove(&key).is_some() {
                        removed += 1;
                    }
                }
                None => break,
            }
        }

        if removed > 0 {
            self.stats.record_evictions(removed as u64);
        }
        removed
    }

    // == Statistics ==
    /// Returns a point-in-time statistics snapshot.
    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics::new(&self.stats, self.entries.len(), self.total_size_bytes())
    }

    // == Reset Statistics ==
    /// Zeroes the hit/miss/eviction counters without touching entries.
    pub fn reset_statistics(&mut self) {
        self.stats.reset();
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Total Size ==
    /// Aggregate payload size across all entries, in bytes.
    pub fn total_size_bytes(&self) -> usize {
        self.entries.values().map(|entry| entry.size_bytes).sum()
    }

    // == Ceiling Enforcement ==
    /// Applies the item-count ceiling, then the byte-size ceiling.
    ///
    /// Count pass removes least-recently-used entries; size pass removes the
    /// largest entries first. Runs synchronously after every write.
    fn enforce_ceilings(&mut self) {
        let mut evicted = 0u64;

        // Count pass: least-recently-used first
        while self.entries.len() > self.max_item_count {
            match self.lru.evict_oldest() {
                Some(key) => {
                    if self.entries.remove(&key).is_some() {
                        evicted += 1;
                    }
                }
                None => break,
            }
        }

        // Size pass: largest entries first, key order breaks size ties
        let mut total = self.total_size_bytes();
        if total > self.max_total_bytes {
            let mut by_size: Vec<(String, usize)> = self
                .entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.size_bytes))
                .collect();
            by_size.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

            for (key, size) in by_size {
                if total <= self.max_total_bytes {
                    break;
                }
                self.entries.remove(&key);
                self.lru.remove(&key);
                total -= size;
                evicted += 1;
            }
        }

        if evicted > 0 {
            self.stats.record_evictions(evicted);
            debug!(evicted, "evicted entries while enforcing ceilings");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::current_timestamp_ms;
    use std::thread::sleep;

    fn test_store(max_items: usize, max_bytes: usize) -> CacheStore {
        CacheStore::new(&CacheConfig {
            max_item_count: max_items,
            max_total_bytes: max_bytes,
            default_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_store_new() {
        let store = test_store(100, 1024 * 1024);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.total_size_bytes(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set("listing:1".to_string(), &"corolla".to_string(), None)
            .unwrap();
        let value: Option<String> = store.get("listing:1");

        assert_eq!(value.as_deref(), Some("corolla"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_size_bytes(), "\"corolla\"".len());
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = test_store(100, 1024 * 1024);

        let value: Option<String> = store.get("nonexistent");
        assert!(value.is_none());
        assert_eq!(store.stats.misses, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set("key1".to_string(), &"value1".to_string(), None)
            .unwrap();
        store
            .set("key1".to_string(), &"value2".to_string(), None)
            .unwrap();

        let value: Option<String> = store.get("key1");
        assert_eq!(value.as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_remove() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set("key1".to_string(), &"value1".to_string(), None)
            .unwrap();

        assert!(store.remove("key1"));
        assert!(store.is_empty());

        // Removing an absent key is a no-op, not an error
        assert!(!store.remove("key1"));
    }

    #[test]
    fn test_store_remove_matching() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set("favorites:user_42".to_string(), &1u32, None)
            .unwrap();
        store
            .set("recommendations:user_42".to_string(), &2u32, None)
            .unwrap();
        store
            .set("favorites:user_7".to_string(), &3u32, None)
            .unwrap();

        let removed = store.remove_matching("user_42");

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains("favorites:user_7"));
    }

    #[test]
    fn test_store_contains_does_not_touch() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set("key1".to_string(), &"value1".to_string(), None)
            .unwrap();

        assert!(store.contains("key1"));
        assert!(!store.contains("other"));

        // contains must not count as a hit or bump access metadata
        assert_eq!(store.stats.hits, 0);
        assert_eq!(store.stats.misses, 0);
        assert_eq!(store.entries.get("key1").unwrap().hit_count, 0);
    }

    #[test]
    fn test_store_contains_expired_entry() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set(
                "key1".to_string(),
                &"value1".to_string(),
                Some(Duration::from_millis(30)),
            )
            .unwrap();

        sleep(Duration::from_millis(60));

        assert!(!store.contains("key1"));
    }

    #[test]
    fn test_store_ttl_expiration_is_lazy_delete() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set(
                "key1".to_string(),
                &"value1".to_string(),
                Some(Duration::from_millis(30)),
            )
            .unwrap();

        let before: Option<String> = store.get("key1");
        assert!(before.is_some());

        sleep(Duration::from_millis(60));

        let after: Option<String> = store.get("key1");
        assert!(after.is_none());
        // Lazy expiration removed the entry during get
        assert_eq!(store.len(), 0);
        assert_eq!(store.stats.misses, 1);
    }

    #[test]
    fn test_store_zero_ttl_rejected() {
        let mut store = test_store(100, 1024 * 1024);

        let result = store.set(
            "key1".to_string(),
            &"value1".to_string(),
            Some(Duration::ZERO),
        );
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_key_too_long() {
        let mut store = test_store(100, 1024 * 1024);
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        let result = store.set(long_key, &"value".to_string(), None);
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[test]
    fn test_store_value_too_large() {
        let mut store = test_store(100, 16 * 1024 * 1024);
        let large_value = "x".repeat(MAX_VALUE_SIZE + 1);

        let result = store.set("key".to_string(), &large_value, None);
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_lru_eviction_on_count_ceiling() {
        let mut store = test_store(3, 1024 * 1024);

        store.set("key1".to_string(), &1u32, None).unwrap();
        store.set("key2".to_string(), &2u32, None).unwrap();
        store.set("key3".to_string(), &3u32, None).unwrap();

        // Cache is full, adding key4 should evict key1 (oldest)
        store.set("key4".to_string(), &4u32, None).unwrap();

        assert_eq!(store.len(), 3);
        assert!(!store.contains("key1"));
        assert!(store.contains("key2"));
        assert!(store.contains("key3"));
        assert!(store.contains("key4"));
        assert_eq!(store.stats.evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = test_store(3, 1024 * 1024);

        store.set("key1".to_string(), &1u32, None).unwrap();
        store.set("key2".to_string(), &2u32, None).unwrap();
        store.set("key3".to_string(), &3u32, None).unwrap();

        // Access key1 to make it most recently used
        let _: Option<u32> = store.get("key1");

        // Adding key4 should evict key2 (now oldest)
        store.set("key4".to_string(), &4u32, None).unwrap();

        assert!(store.contains("key1"));
        assert!(!store.contains("key2"));
    }

    #[test]
    fn test_store_size_ceiling_evicts_largest_first() {
        // Ceiling fits roughly two of the three payloads
        let mut store = test_store(100, 60);

        store
            .set("small".to_string(), &"aa".to_string(), None)
            .unwrap();
        store
            .set("medium".to_string(), &"b".repeat(18), None)
            .unwrap();
        store
            .set("large".to_string(), &"c".repeat(38), None)
            .unwrap();

        // Aggregate exceeded the ceiling, so the largest entry went first
        assert!(store.total_size_bytes() <= 60);
        assert!(!store.contains("large"));
        assert!(store.contains("small"));
        assert!(store.contains("medium"));
    }

    #[test]
    fn test_store_size_ceiling_holds_after_every_set() {
        let mut store = test_store(100, 200);

        for i in 0..50 {
            store
                .set(format!("key{}", i), &"x".repeat(1 + (i * 7) % 40), None)
                .unwrap();
            assert!(
                store.total_size_bytes() <= 200,
                "aggregate size {} exceeds ceiling after set #{}",
                store.total_size_bytes(),
                i
            );
        }
    }

    #[test]
    fn test_store_corrupt_entry_evicted_on_get() {
        let mut store = test_store(100, 1024 * 1024);
        let now = current_timestamp_ms();

        store.entries.insert(
            "bad".to_string(),
            CacheEntry {
                payload: b"not valid json".to_vec(),
                size_bytes: 14,
                created_at: now,
                expires_at: now + 60_000,
                hit_count: 0,
                last_accessed_at: now,
            },
        );
        store.lru.touch("bad");

        let value: Option<String> = store.get("bad");

        assert!(value.is_none());
        // Corrupt entry was evicted so it cannot fail repeatedly
        assert!(store.is_empty());
        assert_eq!(store.stats.misses, 1);
        assert_eq!(store.stats.hits, 0);
    }

    #[test]
    fn test_store_hit_metadata_updated() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set("key1".to_string(), &"value1".to_string(), None)
            .unwrap();

        let _: Option<String> = store.get("key1");
        let _: Option<String> = store.get("key1");

        let entry = store.entries.get("key1").unwrap();
        assert_eq!(entry.hit_count, 2);
        assert!(entry.last_accessed_at >= entry.created_at);
    }

    #[test]
    fn test_store_stats_and_clear() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set("key1".to_string(), &"value1".to_string(), None)
            .unwrap();
        let _: Option<String> = store.get("key1"); // hit
        let _: Option<String> = store.get("nonexistent"); // miss

        let stats = store.statistics();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_items, 1);
        assert!((stats.hit_rate - 0.5).abs() < 0.001);

        store.clear();

        let stats = store.statistics();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.total_size_bytes, 0);
    }

    #[test]
    fn test_store_sweep_expired() {
        let mut store = test_store(100, 1024 * 1024);

        store
            .set(
                "short".to_string(),
                &"value1".to_string(),
                Some(Duration::from_millis(30)),
            )
            .unwrap();
        store
            .set(
                "long".to_string(),
                &"value2".to_string(),
                Some(Duration::from_secs(10)),
            )
            .unwrap();

        sleep(Duration::from_millis(60));

        let removed = store.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains("long"));
    }

    #[test]
    fn test_store_shrink_to_half() {
        let mut store = test_store(100, 1024 * 1024);

        for i in 0..10 {
            store.set(format!("key{}", i), &i, None).unwrap();
        }

        // Make key0 and key1 most recently used
        let _: Option<i32> = store.get("key0");
        let _: Option<i32> = store.get("key1");

        let removed = store.shrink_to_half();

        assert_eq!(removed, 5);
        assert_eq!(store.len(), 5);
        assert!(store.contains("key0"));
        assert!(store.contains("key1"));
        assert_eq!(store.stats.evictions, 5);
    }

    #[test]
    fn test_store_shrink_to_half_empty() {
        let mut store = test_store(100, 1024 * 1024);
        assert_eq!(store.shrink_to_half(), 0);
    }
}
