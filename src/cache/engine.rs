//! Cache Engine Module
//!
//! The bounded cache: TTL expiry plus LRU eviction over the chained hash
//! table, with hit/miss/eviction accounting.
//!
//! Every record in the table has exactly one node in the LRU list; the two
//! structures are created and destroyed together.

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheRecord, CacheStats, LruList};
use crate::hash::now_ms;
use crate::table::HashTable;

// == Cache Engine ==
/// Bounded key/value cache with per-entry TTL and LRU eviction.
#[derive(Debug)]
pub struct CacheEngine {
    /// Record storage
    table: HashTable<CacheRecord>,
    /// Recency order, head = most recent
    lru: LruList,
    /// Performance counters
    stats: CacheStats,
    /// Hard upper bound on live entries
    max_size: usize,
    /// TTL in seconds applied when the caller omits one (0 = never expires)
    default_ttl: u64,
}

impl CacheEngine {
    // == Constructor ==
    /// Creates an engine bounded at `max_size` entries.
    ///
    /// `default_ttl` (seconds) applies to `set` calls without an explicit
    /// TTL; 0 disables expiry.
    pub fn new(max_size: usize, default_ttl: u64) -> Self {
        Self {
            table: HashTable::new(),
            lru: LruList::new(),
            stats: CacheStats {
                max_size,
                ..CacheStats::default()
            },
            max_size,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a key-value pair. Never fails.
    ///
    /// Omitted TTL falls back to the default; a TTL of 0 means no expiry.
    /// Overwriting resets the record's timestamps. A truly new insertion
    /// at capacity evicts the least recently used entry first.
    pub fn set(&mut self, key: &str, value: Value, ttl: Option<u64>) {
        let ttl_seconds = ttl.unwrap_or(self.default_ttl);

        if !self.table.has(key) && self.table.len() >= self.max_size {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.table.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        let record = CacheRecord::new(key.to_string(), value, ttl_seconds);
        self.table.set(key, record);
        self.lru.touch(key);
        self.stats.size = self.table.len();
    }

    // == Get ==
    /// Retrieves the value for a key.
    ///
    /// Expired records are deleted on the way (a miss, not an eviction).
    /// A hit refreshes `last_accessed` and recency.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.table.get_mut(key) {
            None => {
                self.stats.record_miss();
                None
            }
            Some(record) if record.is_expired() => {
                self.remove_entry(key);
                self.stats.record_miss();
                None
            }
            Some(record) => {
                record.last_accessed = now_ms();
                let value = record.value.clone();
                self.lru.touch(key);
                self.stats.record_hit();
                Some(value)
            }
        }
    }

    // == Has ==
    /// Pure presence check: no recency motion, no counters.
    ///
    /// Still lazily expires, since a stale record is not truly present.
    pub fn has(&mut self, key: &str) -> bool {
        match self.table.get(key) {
            None => false,
            Some(record) if record.is_expired() => {
                self.remove_entry(key);
                false
            }
            Some(_) => true,
        }
    }

    // == Delete ==
    /// Removes an entry. Returns whether something was removed.
    ///
    /// Explicit deletion is not an eviction.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        self.stats.size = self.table.len();
        removed
    }

    // == Update TTL ==
    /// Resets a key's expiry deadline; a TTL of 0 clears it.
    ///
    /// Lazily expires first; recency is untouched.
    pub fn update_ttl(&mut self, key: &str, ttl: u64) -> bool {
        if self.table.get(key).is_some_and(|r| r.is_expired()) {
            self.remove_entry(key);
            return false;
        }
        match self.table.get_mut(key) {
            Some(record) => {
                record.update_ttl(ttl);
                record.last_accessed = now_ms();
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Empties the cache and resets all counters.
    pub fn clear(&mut self) {
        self.table.clear();
        self.lru.clear();
        self.stats.reset();
    }

    // == Keys ==
    /// Returns all non-expired keys.
    ///
    /// Expired entries discovered during the scan are deleted.
    pub fn keys(&mut self) -> Vec<String> {
        let mut live = Vec::new();
        let mut expired = Vec::new();
        for (key, record) in self.table.iter() {
            if record.is_expired() {
                expired.push(key.to_string());
            } else {
                live.push(key.to_string());
            }
        }
        for key in expired {
            self.remove_entry(&key);
        }
        self.stats.size = self.table.len();
        live
    }

    // == Get Entry ==
    /// Returns a copy of the full record for admin/debug surfaces.
    ///
    /// Lazily expires like `get`, but touches neither recency nor counters.
    pub fn get_entry(&mut self, key: &str) -> Option<CacheRecord> {
        match self.table.get(key) {
            None => None,
            Some(record) if record.is_expired() => {
                self.remove_entry(key);
                None
            }
            Some(record) => Some(record.clone()),
        }
    }

    // == Stats ==
    /// Returns a snapshot of the performance counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.size = self.table.len();
        stats
    }

    // == Length ==
    /// Current number of entries (expired-but-unswept included).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // == Cleanup Expired ==
    /// Sweeps out every expired entry; returns how many were removed.
    ///
    /// Sweep deletions are not evictions and not misses. Correctness never
    /// depends on the sweep running; lazy expiry on access is sufficient.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .table
            .iter()
            .filter(|(_, record)| record.is_expired())
            .map(|(key, _)| key.to_string())
            .collect();

        let count = expired.len();
        for key in expired {
            self.remove_entry(&key);
        }
        self.stats.size = self.table.len();
        count
    }

    /// Removes a key from both the table and the LRU list.
    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.table.remove(key).is_some();
        if removed {
            self.lru.remove(key);
        }
        removed
    }
}
