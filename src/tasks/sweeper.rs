//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! The sweep is a safety net: `get` already expires entries lazily, so
//! staleness visible to a caller is bounded by the TTL itself, not by the
//! sweep interval.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that sweeps expired entries on a fixed interval.
///
/// The task sleeps for `interval` between sweeps and acquires the store's
/// write exclusion only for the sweep itself.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it at process shutdown so the
/// timer does not leak.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::new(&config);
/// let sweeper = spawn_sweeper_task(cache.clone(), config.sweep_interval);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "starting expiry sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep_now().await;

            if removed > 0 {
                info!(removed, "expiry sweep removed stale entries");
            } else {
                debug!("expiry sweep found no stale entries");
            }
        }
    })
}
