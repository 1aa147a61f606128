//! Cache Record Module
//!
//! Defines the record stored for each cached key, with TTL math.

use serde::Serialize;
use serde_json::Value;

use crate::hash::now_ms;

// == Cache Record ==
/// A single cached key with its value and bookkeeping metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// The key this record is stored under
    pub key: String,
    /// The stored JSON document
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
    /// Timestamp of the last successful read or update (Unix milliseconds)
    pub last_accessed: u64,
    /// The TTL the record was declared with, in seconds (0 = never expires)
    pub ttl_seconds: u64,
}

impl CacheRecord {
    // == Constructor ==
    /// Creates a record stamped at the current wall clock.
    ///
    /// A `ttl_seconds` of 0 means the record never expires.
    pub fn new(key: String, value: Value, ttl_seconds: u64) -> Self {
        let now = now_ms();
        let expires_at = if ttl_seconds == 0 {
            None
        } else {
            Some(now + ttl_seconds * 1000)
        };
        Self {
            key,
            value,
            created_at: now,
            expires_at,
            last_accessed: now,
            ttl_seconds,
        }
    }

    // == Is Expired ==
    /// Checks whether the record has expired.
    ///
    /// A record with a deadline is expired once the current time is greater
    /// than or equal to it; a record without a deadline never expires.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => now_ms() >= expires,
            None => false,
        }
    }

    // == Update TTL ==
    /// Resets the expiry deadline relative to now.
    ///
    /// A `ttl_seconds` of 0 clears the deadline entirely.
    pub fn update_ttl(&mut self, ttl_seconds: u64) {
        self.ttl_seconds = ttl_seconds;
        self.expires_at = if ttl_seconds == 0 {
            None
        } else {
            Some(now_ms() + ttl_seconds * 1000)
        };
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// Expired records report `Some(0)`.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(now_ms()))
    }

    /// Returns remaining TTL in whole seconds, or None if no expiration is set.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms / 1000)
    }
}
