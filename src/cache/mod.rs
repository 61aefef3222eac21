//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, count- and size-bounded
//! LRU eviction, statistics, and integrity validation/repair.

mod entry;
mod integrity;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use integrity::ValidationReport;
pub use lru::LruTracker;
pub use shared::SharedCache;
pub use stats::{CacheStatistics, CacheStats};
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized payload size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
