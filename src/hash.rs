//! Shared Primitives Module
//!
//! djb2 hashing, key validation, and wall-clock helpers shared by the
//! cache table and the partitioned store.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{KvError, Result};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

// == djb2 Hash ==
/// Computes the djb2 hash of a key's UTF-8 bytes.
///
/// Seeded at 5381 and combined as `hash = hash * 33 + byte` with wrapping
/// 64-bit arithmetic, then the absolute value of the signed result.
///
/// The absolute-value step is part of the contract: it decides both the
/// hash-table bucket and the on-disk partition for a key, so existing data
/// directories stop resolving if it ever changes.
pub fn djb2(key: &str) -> u64 {
    let mut hash: i64 = 5381;
    for byte in key.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as i64);
    }
    hash.unsigned_abs()
}

// == Key Validation ==
/// Validates a cache/store key.
///
/// Keys must be non-empty and at most [`MAX_KEY_LENGTH`] bytes.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::Validation("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(KvError::Validation(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
