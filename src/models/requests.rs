//! Request DTOs for both HTTP surfaces
//!
//! Defines incoming body shapes and their validation, which runs before
//! anything touches the cache engine or the store.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_VALUE_SIZE;
use crate::hash::validate_key;
use crate::store::MAX_STORE_VALUE_SIZE;

/// Serialized size of a JSON value, used for the size caps.
fn value_size(value: &Value) -> usize {
    serde_json::to_string(value).map(|s| s.len()).unwrap_or(0)
}

fn validate_value(value: &Value, max: usize) -> Option<String> {
    let size = value_size(value);
    if size > max {
        return Some(format!(
            "Value of {} bytes exceeds maximum size of {} bytes",
            size, max
        ));
    }
    None
}

// == Set Key Request ==
/// Body for POST `/api/keys`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetKeyRequest {
    /// The cache key
    pub key: String,
    /// The JSON document to store
    pub value: Value,
    /// Optional TTL in seconds (0 = never expires)
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Write through to the storage service as well
    #[serde(default)]
    pub persist: bool,
}

impl SetKeyRequest {
    /// Returns an error message if the request is invalid.
    pub fn validate(&self) -> Option<String> {
        if let Err(e) = validate_key(&self.key) {
            return Some(e.to_string());
        }
        validate_value(&self.value, MAX_VALUE_SIZE)
    }
}

// == Update Key Request ==
/// Body for PUT `/api/keys/:key`; at least one field must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateKeyRequest {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl UpdateKeyRequest {
    /// Returns an error message if the request is invalid.
    pub fn validate(&self) -> Option<String> {
        if self.value.is_none() && self.ttl.is_none() {
            return Some("Request must include a value and/or a ttl".to_string());
        }
        if let Some(value) = &self.value {
            return validate_value(value, MAX_VALUE_SIZE);
        }
        None
    }
}

// == Save Data Request ==
/// Body for POST `/api/data` on the store service.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveDataRequest {
    pub key: String,
    pub value: Value,
}

impl SaveDataRequest {
    /// Returns an error message if the request is invalid.
    ///
    /// `max_file_size` comes from store configuration and is capped at
    /// the built-in store limit.
    pub fn validate(&self, max_file_size: usize) -> Option<String> {
        if let Err(e) = validate_key(&self.key) {
            return Some(e.to_string());
        }
        validate_value(&self.value, max_file_size.min(MAX_STORE_VALUE_SIZE))
    }
}

// == Restore Request ==
/// Body for POST `/api/backup/restore`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestoreRequest {
    /// Path of the backup file to replay
    pub path: String,
}
