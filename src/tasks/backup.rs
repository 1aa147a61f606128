//! Periodic Backup Task
//!
//! Background task that snapshots the store on an interval. Backups are
//! best-effort: a failed run is logged and the next one proceeds.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::store::StoreManager;

/// Spawns the periodic backup task.
///
/// Returns `None` when `interval_ms` is zero or negative (backups
/// disabled). Abort the returned handle to stop the task.
pub fn spawn_backup_task(
    manager: Arc<StoreManager>,
    interval_ms: i64,
) -> Option<JoinHandle<()>> {
    if interval_ms <= 0 {
        info!("periodic backup disabled");
        return None;
    }
    let interval = Duration::from_millis(interval_ms as u64);

    Some(tokio::spawn(async move {
        info!(interval_ms, "starting periodic backup task");
        loop {
            tokio::time::sleep(interval).await;

            match manager.backup().await {
                Ok(path) => info!(path = %path.display(), "periodic backup written"),
                Err(e) => warn!(error = %e, "periodic backup failed"),
            }
        }
    }))
}
