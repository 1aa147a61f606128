//! Partitioned Store Module
//!
//! One JSON file per key, spread across a fixed set of partition
//! directories selected by djb2. Losing one file loses exactly one key.
//!
//! Layout, partition count, filename encoding, and the pretty-printed
//! payload are compatibility-critical: they must interoperate with
//! existing data directories byte-for-byte.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{KvError, Result};
use crate::hash::djb2;
use crate::store::{StorageEntry, PARTITION_COUNT};

// == Store Stats ==
/// Aggregate numbers for the whole data directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_keys: usize,
    /// Sum of serialized JSON lengths of live entries, in bytes
    pub total_size: u64,
    pub partitions: usize,
    pub data_path: String,
}

// == Partitioned Store ==
/// Per-key file storage under `<root>/partition_{0..P-1}/`.
#[derive(Debug, Clone)]
pub struct PartitionedStore {
    root: PathBuf,
}

impl PartitionedStore {
    // == Constructor ==
    /// Creates a store rooted at `root`. Call [`initialize`] before use.
    ///
    /// [`initialize`]: PartitionedStore::initialize
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root this store reads and writes.
    pub fn data_path(&self) -> &Path {
        &self.root
    }

    // == Partition Selection ==
    /// Partition index for a key: `djb2(key) mod P`.
    pub fn partition_for(key: &str) -> usize {
        (djb2(key) % PARTITION_COUNT as u64) as usize
    }

    /// Filesystem-safe filename stem for a key: standard Base64 with
    /// `/`, `+`, and `=` each replaced by `_`.
    pub fn encode_key(key: &str) -> String {
        general_purpose::STANDARD
            .encode(key.as_bytes())
            .replace(['/', '+', '='], "_")
    }

    /// Full path of the file holding `key`, whether or not it exists.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("partition_{}", Self::partition_for(key)))
            .join(format!("{}.json", Self::encode_key(key)))
    }

    // == Initialize ==
    /// Creates the root and every partition directory. Idempotent.
    pub async fn initialize(&self) -> Result<()> {
        for partition in 0..PARTITION_COUNT {
            fs::create_dir_all(self.root.join(format!("partition_{}", partition))).await?;
        }
        debug!(path = %self.root.display(), partitions = PARTITION_COUNT, "store initialized");
        Ok(())
    }

    // == Save ==
    /// Writes the entry file for `key`, carrying metadata forward.
    ///
    /// A prior file contributes its `createdAt` and `version + 1`; a
    /// corrupt prior file is treated as absent so one bad file cannot
    /// wedge writes to its key. The write is a full rewrite.
    pub async fn save(&self, key: &str, value: Value) -> Result<StorageEntry> {
        let entry = match self.load(key).await {
            Ok(Some(previous)) => previous.rewrite(value),
            Ok(None) => StorageEntry::new(key.to_string(), value),
            Err(KvError::CorruptEntry { reason, .. }) => {
                warn!(key, %reason, "overwriting corrupt entry file");
                StorageEntry::new(key.to_string(), value)
            }
            Err(e) => return Err(e),
        };

        let body = entry
            .to_disk_json()
            .map_err(|e| KvError::Internal(format!("serialize entry: {}", e)))?;
        fs::write(self.entry_path(key), body).await?;
        Ok(entry)
    }

    // == Load ==
    /// Reads the entry for `key`; a missing file is `None`.
    pub async fn load(&self, key: &str) -> Result<Option<StorageEntry>> {
        let path = self.entry_path(key);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry = serde_json::from_str(&text).map_err(|e| KvError::CorruptEntry {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(entry))
    }

    // == Delete ==
    /// Unlinks the entry file. Returns whether a file was removed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // == Exists ==
    /// Checks whether an entry file is present for `key`.
    pub async fn exists(&self, key: &str) -> bool {
        fs::try_exists(self.entry_path(key)).await.unwrap_or(false)
    }

    // == List ==
    /// Keys of all live entries, taken from the parsed file contents
    /// rather than the filenames.
    pub async fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .get_all_entries()
            .await?
            .into_iter()
            .map(|entry| entry.key)
            .collect())
    }

    // == Get All Entries ==
    /// Every parseable entry across all partitions.
    ///
    /// Files that fail to parse are logged and skipped; a bad file never
    /// fails the whole scan.
    pub async fn get_all_entries(&self) -> Result<Vec<StorageEntry>> {
        let mut entries = Vec::new();
        for partition in 0..PARTITION_COUNT {
            let dir = self.root.join(format!("partition_{}", partition));
            let mut reader = match fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(dirent) = reader.next_entry().await? {
                let path = dirent.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let text = match fs::read_to_string(&path).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable entry file");
                        continue;
                    }
                };
                match serde_json::from_str::<StorageEntry>(&text) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping corrupt entry file");
                    }
                }
            }
        }
        Ok(entries)
    }

    // == Clear ==
    /// Unlinks every entry file in every partition.
    pub async fn clear(&self) -> Result<()> {
        for partition in 0..PARTITION_COUNT {
            let dir = self.root.join(format!("partition_{}", partition));
            let mut reader = match fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(dirent) = reader.next_entry().await? {
                let path = dirent.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    fs::remove_file(&path).await?;
                }
            }
        }
        Ok(())
    }

    // == Stats ==
    /// Key count and summed serialized size of all live entries.
    pub async fn stats(&self) -> Result<StoreStats> {
        let entries = self.get_all_entries().await?;
        let total_size = entries
            .iter()
            .filter_map(|entry| entry.to_disk_json().ok())
            .map(|text| text.len() as u64)
            .sum();
        Ok(StoreStats {
            total_keys: entries.len(),
            total_size,
            partitions: PARTITION_COUNT,
            data_path: self.root.display().to_string(),
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    async fn fresh_store() -> (tempfile::TempDir, PartitionedStore) {
        let dir = tempdir().unwrap();
        let store = PartitionedStore::new(dir.path());
        store.initialize().await.unwrap();
        (dir, store)
    }

    #[test]
    fn test_encode_key_replaces_symbols() {
        // "a/b+c=d" -> standard Base64 "YS9iK2M9ZA==" -> trailing pads swapped
        assert_eq!(PartitionedStore::encode_key("a/b+c=d"), "YS9iK2M9ZA__");
        assert_eq!(PartitionedStore::encode_key("abc"), "YWJj");
    }

    #[test]
    fn test_partition_is_djb2_mod_p() {
        for key in ["a", "user:1", "a/b+c=d", "日本語"] {
            assert_eq!(
                PartitionedStore::partition_for(key),
                (djb2(key) % PARTITION_COUNT as u64) as usize
            );
        }
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (_dir, store) = fresh_store().await;
        store.initialize().await.unwrap();

        for partition in 0..PARTITION_COUNT {
            let path = store.data_path().join(format!("partition_{}", partition));
            assert!(path.is_dir());
        }
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let (_dir, store) = fresh_store().await;

        let saved = store.save("k", json!({"n": 1})).await.unwrap();
        assert_eq!(saved.metadata.version, 1);

        let loaded = store.load("k").await.unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_save_places_file_by_partition_contract() {
        let (_dir, store) = fresh_store().await;
        store.save("a/b+c=d", json!({"x": 1})).await.unwrap();

        let expected = store
            .data_path()
            .join(format!("partition_{}", PartitionedStore::partition_for("a/b+c=d")))
            .join("YS9iK2M9ZA__.json");
        assert!(expected.is_file());

        // Exactly one file across all partitions.
        let entries = store.get_all_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].metadata.version, 1);
    }

    #[tokio::test]
    async fn test_save_file_is_pretty_printed() {
        let (_dir, store) = fresh_store().await;
        store.save("k", json!({"a": 1})).await.unwrap();

        let text = fs::read_to_string(store.entry_path("k")).await.unwrap();
        assert!(text.contains("\n  \"metadata\""));
        assert!(text.contains("\"createdAt\""));
    }

    #[tokio::test]
    async fn test_rewrite_preserves_created_at_and_bumps_version() {
        let (_dir, store) = fresh_store().await;

        let first = store.save("k", json!("v1")).await.unwrap();
        let second = store.save("k", json!("v2")).await.unwrap();
        let third = store.save("k", json!("v3")).await.unwrap();

        assert_eq!(second.metadata.version, 2);
        assert_eq!(third.metadata.version, 3);
        assert_eq!(third.metadata.created_at, first.metadata.created_at);
        assert!(third.metadata.updated_at >= first.metadata.updated_at);

        let loaded = store.load("k").await.unwrap().unwrap();
        assert_eq!(loaded.value, json!("v3"));
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let (_dir, store) = fresh_store().await;
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_errors() {
        let (_dir, store) = fresh_store().await;
        fs::write(store.entry_path("bad"), "{not json")
            .await
            .unwrap();

        let result = store.load("bad").await;
        assert!(matches!(result, Err(KvError::CorruptEntry { .. })));
    }

    #[tokio::test]
    async fn test_save_over_corrupt_file_starts_fresh() {
        let (_dir, store) = fresh_store().await;
        fs::write(store.entry_path("bad"), "{not json")
            .await
            .unwrap();

        let entry = store.save("bad", json!("recovered")).await.unwrap();
        assert_eq!(entry.metadata.version, 1);
        assert_eq!(
            store.load("bad").await.unwrap().unwrap().value,
            json!("recovered")
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = fresh_store().await;
        store.save("k", json!(1)).await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(!store.exists("k").await);
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_files() {
        let (_dir, store) = fresh_store().await;
        store.save("good1", json!(1)).await.unwrap();
        store.save("good2", json!(2)).await.unwrap();
        fs::write(store.entry_path("bad"), "oops").await.unwrap();

        let mut keys = store.list().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["good1".to_string(), "good2".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_removes_all_entries() {
        let (_dir, store) = fresh_store().await;
        for i in 0..20 {
            store.save(&format!("key{}", i), json!(i)).await.unwrap();
        }

        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        // Idempotent.
        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let (_dir, store) = fresh_store().await;
        store.save("a", json!("x")).await.unwrap();
        store.save("b", json!("y")).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_keys, 2);
        assert!(stats.total_size > 0);
        assert_eq!(stats.partitions, PARTITION_COUNT);
    }

    #[tokio::test]
    async fn test_keys_spread_across_partitions() {
        let (_dir, store) = fresh_store().await;
        for i in 0..64 {
            store.save(&format!("key{}", i), json!(i)).await.unwrap();
        }

        let mut used = 0;
        for partition in 0..PARTITION_COUNT {
            let dir = store.data_path().join(format!("partition_{}", partition));
            let count = std::fs::read_dir(dir).unwrap().count();
            if count > 0 {
                used += 1;
            }
        }
        // djb2 of sequential keys must not collapse into one directory.
        assert!(used > PARTITION_COUNT / 2);
        assert_eq!(store.list().await.unwrap().len(), 64);
    }
}
