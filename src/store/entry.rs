//! Storage Entry Module
//!
//! The versioned record persisted for each key. The serialized shape is
//! the on-disk format and must stay stable: existing data directories are
//! read back by field name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hash::now_ms;

// == Entry Metadata ==
/// Version and timestamp bookkeeping for a stored entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    /// First write timestamp (Unix milliseconds); preserved across rewrites
    pub created_at: u64,
    /// Last write timestamp (Unix milliseconds)
    pub updated_at: u64,
    /// Monotonically increasing per-key write counter, starting at 1
    pub version: u64,
}

// == Storage Entry ==
/// One key's durable record: value plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub key: String,
    pub value: Value,
    pub metadata: EntryMetadata,
}

impl StorageEntry {
    // == Constructor ==
    /// Creates a first-version entry stamped at the current wall clock.
    pub fn new(key: String, value: Value) -> Self {
        let now = now_ms();
        Self {
            key,
            value,
            metadata: EntryMetadata {
                created_at: now,
                updated_at: now,
                version: 1,
            },
        }
    }

    // == Rewrite ==
    /// Produces the successor entry for a rewrite of the same key.
    ///
    /// `created_at` carries over, `updated_at` advances, and the version
    /// increments by exactly one.
    pub fn rewrite(&self, value: Value) -> Self {
        Self {
            key: self.key.clone(),
            value,
            metadata: EntryMetadata {
                created_at: self.metadata.created_at,
                updated_at: now_ms(),
                version: self.metadata.version + 1,
            },
        }
    }

    /// Serializes in the on-disk format: pretty-printed, 2-space indent.
    pub fn to_disk_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
