//! Cache Integrity Module
//!
//! Read-only validation and self-healing repair over the store's entries.
//!
//! Integrity issues are never raised as errors: `validate` reports them in a
//! structured form and `repair` remediates them, always completing.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::cache::CacheStore;

// == Validation Report ==
/// Structured result of a full integrity pass over the cache.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Number of entries inspected
    pub total_items: usize,
    /// Entries whose TTL has elapsed (do not by themselves invalidate the cache)
    pub expired_items: usize,
    /// Entries whose payload no longer decodes
    pub corrupted_items: usize,
    /// Entries whose recorded size disagrees with the live payload length
    pub size_mismatch_items: usize,
    /// Keys of the corrupted entries, sorted for stable output
    pub corrupted_keys: Vec<String>,
    /// True iff no corrupted and no size-mismatched entries exist
    pub is_valid: bool,
    /// When the report was generated (RFC 3339)
    pub generated_at: String,
}

impl CacheStore {
    // == Validate ==
    /// Integrity-checks every entry without mutating the store.
    ///
    /// An entry is "corrupted" if its payload cannot be parsed back into
    /// structured form, and "size-mismatched" if `size_bytes` disagrees with
    /// the payload length. Expired entries are reported but do not make the
    /// cache invalid.
    pub fn validate(&self) -> ValidationReport {
        let mut expired_items = 0;
        let mut size_mismatch_items = 0;
        let mut corrupted_keys = Vec::new();

        for (key, entry) in &self.entries {
            if entry.is_expired() {
                expired_items += 1;
            }
            if serde_json::from_slice::<serde_json::Value>(&entry.payload).is_err() {
                corrupted_keys.push(key.clone());
            }
            if entry.size_bytes != entry.payload.len() {
                size_mismatch_items += 1;
            }
        }

        corrupted_keys.sort();

        ValidationReport {
            total_items: self.entries.len(),
            expired_items,
            corrupted_items: corrupted_keys.len(),
            size_mismatch_items,
            is_valid: corrupted_keys.is_empty() && size_mismatch_items == 0,
            corrupted_keys,
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    // == Repair ==
    /// Single self-healing pass: deletes every expired and corrupted entry,
    /// and recomputes `size_bytes` in place for size-mismatched entries.
    ///
    /// Returns the number of entries deleted or fixed. Never fails.
    pub fn repair(&mut self) -> usize {
        let mut to_delete = Vec::new();
        let mut to_resize = Vec::new();

        for (key, entry) in &self.entries {
            let corrupted =
                serde_json::from_slice::<serde_json::Value>(&entry.payload).is_err();
            if entry.is_expired() || corrupted {
                to_delete.push(key.clone());
            } else if entry.size_bytes != entry.payload.len() {
                to_resize.push(key.clone());
            }
        }

        for key in &to_delete {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        for key in &to_resize {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.size_bytes = entry.payload.len();
            }
        }

        let repaired = to_delete.len() + to_resize.len();
        if repaired > 0 {
            info!(
                deleted = to_delete.len(),
                resized = to_resize.len(),
                "cache repair completed"
            );
        }
        repaired
    }
}
