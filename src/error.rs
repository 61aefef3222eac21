//! Error types for the listing cache
//!
//! Provides unified error handling using thiserror.
//!
//! Only the write path can fail: `set` surfaces serialization and validation
//! errors synchronously. Every read-side fault (missing key, expired entry,
//! undecodable payload) degrades to an absent value instead of an error.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the listing cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be serialized; the store was not mutated
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid request data (oversized key or payload, zero TTL)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// == Result Type Alias ==
/// Convenience Result type for the listing cache.
pub type Result<T> = std::result::Result<T, CacheError>;
