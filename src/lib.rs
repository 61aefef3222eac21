//! Listing Cache - an in-process cache for the vehicle listings client
//!
//! Avoids redundant network fetches of recommendations and favorites data by
//! keeping serialized values in a TTL- and capacity-bounded store with LRU
//! eviction, statistics, and integrity self-checks.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStatistics, CacheStore, SharedCache, ValidationReport};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweeper_task;
