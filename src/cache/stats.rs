//! Cache Statistics Module
//!
//! Tracks hit, miss, and eviction counters for the cache engine.

use serde::Serialize;

// == Cache Stats ==
/// Cache performance counters.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted by the LRU policy
    pub evictions: u64,
    /// Current number of entries in the cache
    pub size: usize,
    /// Configured entry limit
    pub max_size: usize,
}

impl CacheStats {
    /// Creates new stats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Hit rate as a percentage, rounded to two decimals.
    ///
    /// Defined as 0 when no lookups have happened yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 * 100.0 / total as f64 * 100.0).round() / 100.0
        }
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Resets every counter to zero, keeping the size limit.
    pub fn reset(&mut self) {
        let max_size = self.max_size;
        *self = Self {
            max_size,
            ..Self::default()
        };
    }
}
