//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//! The cache is correct without it (lazy expiry on access); the sweep
//! just reclaims memory ahead of time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheEngine;

/// Spawns the periodic expiry sweep.
///
/// Every `interval_secs` the task takes the write lock and removes all
/// expired entries. Abort the returned handle to stop it.
///
/// # Arguments
/// * `cache` - shared cache engine
/// * `interval_secs` - seconds between sweeps
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<CacheEngine>>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "starting expiry sweep task");
        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache = cache.write().await;
                cache.cleanup_expired()
            };

            if removed > 0 {
                info!(removed, "expiry sweep removed entries");
            } else {
                debug!("expiry sweep found nothing to remove");
            }
        }
    })
}
