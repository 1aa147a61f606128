//! Store Manager Module
//!
//! Wraps the partitioned store with an asynchronous write queue, a small
//! read cache, and backup/restore/compaction maintenance.
//!
//! All mutations that must observe arrival order (writes, compaction,
//! flush barriers) travel through one FIFO queue drained by a single
//! task, so writers never race each other on the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::fs;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::{KvError, Result};
use crate::store::{PartitionedStore, ReadCache, StorageEntry, StoreStats};

// == Queue Jobs ==
enum Job {
    Write {
        key: String,
        value: Value,
        reply: oneshot::Sender<Result<StorageEntry>>,
    },
    Compact {
        reply: oneshot::Sender<Result<usize>>,
    },
    /// Barrier: replied to once every earlier job has drained.
    Flush { reply: oneshot::Sender<()> },
}

// == Store Manager ==
/// Serialized write access plus cached reads over a [`PartitionedStore`].
pub struct StoreManager {
    store: Arc<PartitionedStore>,
    read_cache: Arc<Mutex<ReadCache>>,
    queue: mpsc::UnboundedSender<Job>,
}

impl StoreManager {
    // == Constructor ==
    /// Wraps `store` and spawns the queue drainer.
    ///
    /// The drainer exits when the manager (and with it the queue sender)
    /// is dropped.
    pub fn new(store: PartitionedStore) -> Self {
        let store = Arc::new(store);
        let read_cache = Arc::new(Mutex::new(ReadCache::default()));
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(drain_queue(
            Arc::clone(&store),
            Arc::clone(&read_cache),
            rx,
        ));

        Self {
            store,
            read_cache,
            queue: tx,
        }
    }

    /// The data root of the wrapped store.
    pub fn data_path(&self) -> &Path {
        self.store.data_path()
    }

    // == Save ==
    /// Enqueues a write and waits for it to land on disk.
    ///
    /// Writes drain strictly in arrival order; a failed write resolves
    /// this caller only and never stalls the queue.
    pub async fn save(&self, key: &str, value: Value) -> Result<StorageEntry> {
        let (reply, response) = oneshot::channel();
        self.queue
            .send(Job::Write {
                key: key.to_string(),
                value,
                reply,
            })
            .map_err(|_| KvError::Internal("write queue is closed".to_string()))?;
        response
            .await
            .map_err(|_| KvError::Internal("write worker dropped the request".to_string()))?
    }

    // == Load ==
    /// Reads an entry, preferring the read cache.
    ///
    /// A file hit populates the cache. Reads are not ordered against
    /// queued writes; call [`flush`] first for read-your-write.
    ///
    /// [`flush`]: StoreManager::flush
    pub async fn load(&self, key: &str) -> Result<Option<StorageEntry>> {
        if let Some(entry) = self.read_cache.lock().await.get(key) {
            debug!(key, "read cache hit");
            return Ok(Some(entry.clone()));
        }

        match self.store.load(key).await? {
            Some(entry) => {
                self.read_cache.lock().await.insert(entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    // == Delete ==
    /// Removes the entry file and its read-cache slot.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.read_cache.lock().await.remove(key);
        self.store.delete(key).await
    }

    // == Exists ==
    /// Presence check against the read cache, then the filesystem.
    pub async fn exists(&self, key: &str) -> bool {
        if self.read_cache.lock().await.get(key).is_some() {
            return true;
        }
        self.store.exists(key).await
    }

    // == Clear ==
    /// Drops every stored entry and empties the read cache.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        self.read_cache.lock().await.clear();
        Ok(())
    }

    // == List / Stats Pass-throughs ==
    /// Keys of all live entries.
    pub async fn list(&self) -> Result<Vec<String>> {
        self.store.list().await
    }

    /// Every live entry (used by backup and the HTTP surface).
    pub async fn get_all_entries(&self) -> Result<Vec<StorageEntry>> {
        self.store.get_all_entries().await
    }

    /// Aggregate store statistics.
    pub async fn stats(&self) -> Result<StoreStats> {
        self.store.stats().await
    }

    // == Backup ==
    /// Writes a point-in-time snapshot of every live entry.
    ///
    /// The file lands at `<data_root>/backup_<timestamp>.json` where the
    /// timestamp is RFC 3339 with `:` and `.` replaced by `-`. Backups
    /// are never read back by the store itself.
    pub async fn backup(&self) -> Result<PathBuf> {
        let entries = self.store.get_all_entries().await?;
        let stamp = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let path = self
            .store
            .data_path()
            .join(format!("backup_{}.json", stamp));

        let body = serde_json::to_string_pretty(&entries)
            .map_err(|e| KvError::Internal(format!("serialize backup: {}", e)))?;
        fs::write(&path, body).await?;
        info!(path = %path.display(), entries = entries.len(), "backup written");
        Ok(path)
    }

    // == Restore ==
    /// Replays a backup file through the write queue.
    ///
    /// Each replayed entry is a fresh save, so versions renumber rather
    /// than restoring history. Returns how many entries were replayed.
    pub async fn restore(&self, path: &Path) -> Result<usize> {
        let text = fs::read_to_string(path).await?;
        let entries: Vec<StorageEntry> =
            serde_json::from_str(&text).map_err(|e| KvError::CorruptEntry {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let count = entries.len();
        for entry in entries {
            self.save(&entry.key, entry.value).await?;
        }
        info!(count, "restore complete");
        Ok(count)
    }

    // == Compact ==
    /// Rewrites the store keeping only the highest version per key.
    ///
    /// Runs inside the drainer, serialized against pending writes. Kept
    /// entries are re-saved into a cleared store, so versions restart at
    /// 1. Returns the number of surviving keys.
    pub async fn compact(&self) -> Result<usize> {
        let (reply, response) = oneshot::channel();
        self.queue
            .send(Job::Compact { reply })
            .map_err(|_| KvError::Internal("write queue is closed".to_string()))?;
        response
            .await
            .map_err(|_| KvError::Internal("write worker dropped the request".to_string()))?
    }

    // == Flush ==
    /// Waits until every previously enqueued write has drained.
    pub async fn flush(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.queue
            .send(Job::Flush { reply })
            .map_err(|_| KvError::Internal("write queue is closed".to_string()))?;
        response
            .await
            .map_err(|_| KvError::Internal("write worker dropped the request".to_string()))
    }

    // == Shutdown ==
    /// Drains pending writes, then attempts one final backup.
    ///
    /// Backup failure is logged; shutdown proceeds regardless.
    pub async fn shutdown(&self) {
        if let Err(e) = self.flush().await {
            error!(error = %e, "flush on shutdown failed");
        }
        match self.backup().await {
            Ok(path) => info!(path = %path.display(), "shutdown backup written"),
            Err(e) => warn!(error = %e, "shutdown backup failed"),
        }
    }
}

// == Queue Drainer ==
/// Processes queued jobs one at a time, in arrival order.
async fn drain_queue(
    store: Arc<PartitionedStore>,
    read_cache: Arc<Mutex<ReadCache>>,
    mut rx: mpsc::UnboundedReceiver<Job>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Write { key, value, reply } => {
                let result = store.save(&key, value).await;
                match &result {
                    Ok(entry) => {
                        read_cache.lock().await.insert(entry.clone());
                    }
                    Err(e) => {
                        error!(%key, error = %e, "queued write failed");
                    }
                }
                let _ = reply.send(result);
            }
            Job::Compact { reply } => {
                let result = run_compact(&store, &read_cache).await;
                if let Err(e) = &result {
                    error!(error = %e, "compaction failed");
                }
                let _ = reply.send(result);
            }
            Job::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }
    debug!("write queue drained and closed");
}

/// Keeps the highest version per key (ties: last seen wins), clears the
/// store and the read cache, then re-saves the survivors.
async fn run_compact(
    store: &PartitionedStore,
    read_cache: &Mutex<ReadCache>,
) -> Result<usize> {
    let entries = store.get_all_entries().await?;
    let mut latest: HashMap<String, StorageEntry> = HashMap::new();
    for entry in entries {
        match latest.get(&entry.key) {
            Some(existing) if existing.metadata.version > entry.metadata.version => {}
            _ => {
                latest.insert(entry.key.clone(), entry);
            }
        }
    }

    store.clear().await?;
    read_cache.lock().await.clear();

    let count = latest.len();
    for (key, entry) in latest {
        store.save(&key, entry.value).await?;
    }
    info!(kept = count, "compaction complete");
    Ok(count)
}
