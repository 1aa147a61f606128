//! Store Module
//!
//! Durable side of the system: per-key JSON files partitioned by hash,
//! fronted by a write queue and a small read cache.

mod entry;
mod manager;
mod partition;
mod read_cache;

// Re-export public types
pub use entry::{EntryMetadata, StorageEntry};
pub use manager::StoreManager;
pub use partition::{PartitionedStore, StoreStats};
pub use read_cache::{ReadCache, READ_CACHE_CAPACITY};

// == Public Constants ==
/// Number of partition directories under the data root.
///
/// Compatibility-critical: changing it orphans every existing entry file.
pub const PARTITION_COUNT: usize = 16;

/// Maximum serialized value size accepted by the store
pub const MAX_STORE_VALUE_SIZE: usize = 10 * 1024 * 1024; // 10 MiB
