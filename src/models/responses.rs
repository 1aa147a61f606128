//! Response DTOs for both HTTP surfaces
//!
//! Every endpoint responds with the same envelope:
//! `{ success, data?, error?, message? }`.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::store::EntryMetadata;

// == Response Envelope ==
/// The wire envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success with a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Success with a payload and a human-readable message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }
}

// == Cache Payloads ==
/// Payload for GET `/api/keys/:key`.
#[derive(Debug, Clone, Serialize)]
pub struct KeyValueData {
    pub key: String,
    pub value: Value,
}

/// Payload for POST `/api/keys`.
#[derive(Debug, Clone, Serialize)]
pub struct SetKeyData {
    pub key: String,
    /// Whether the write-through to the store succeeded (false when not requested)
    pub persisted: bool,
}

/// Payload for GET `/api/keys`.
#[derive(Debug, Clone, Serialize)]
pub struct KeyListData {
    pub keys: Vec<String>,
    pub count: usize,
}

/// Payload for GET `/api/stats` on the cache service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsData {
    pub hits: u64,
    pub misses: u64,
    /// Percent, rounded to two decimals; 0 when no lookups happened
    pub hit_rate: f64,
    pub size: usize,
    pub max_size: usize,
    pub evictions: u64,
}

impl From<CacheStats> for CacheStatsData {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            size: stats.size,
            max_size: stats.max_size,
            evictions: stats.evictions,
        }
    }
}

/// Payload for GET `/api/health` on the cache service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheHealthData {
    pub status: String,
    pub size: usize,
    pub max_size: usize,
    pub uptime_seconds: u64,
    pub timestamp: String,
}

// == Store Payloads ==
/// Payload returned by store writes: key plus resulting metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReceiptData {
    pub key: String,
    pub version: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

impl WriteReceiptData {
    /// Builds a receipt from a saved entry's metadata.
    pub fn new(key: String, metadata: &EntryMetadata) -> Self {
        Self {
            key,
            version: metadata.version,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
        }
    }
}

/// Payload for GET `/api/health` on the store service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealthData {
    pub status: String,
    pub total_keys: usize,
    pub uptime_seconds: u64,
    pub timestamp: String,
}

/// Payload for POST `/api/backup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub path: String,
}

/// Payload for POST `/api/backup/restore` and POST `/api/compact`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCountData {
    pub entries: usize,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_ok_skips_empty_fields() {
        let body = serde_json::to_value(ApiResponse::ok(json!({"n": 1}))).unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"], json!({"n": 1}));
        assert!(body.get("error").is_none());
        assert!(body.get("message").is_none());
    }

    #[test]
    fn test_envelope_message_only() {
        let body = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("done"));
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_cache_stats_data_camel_case() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            evictions: 0,
            size: 2,
            max_size: 100,
        };
        let body = serde_json::to_value(CacheStatsData::from(stats)).unwrap();
        assert_eq!(body["hitRate"], json!(75.0));
        assert_eq!(body["maxSize"], json!(100));
    }

    #[test]
    fn test_write_receipt_fields() {
        let metadata = EntryMetadata {
            created_at: 1,
            updated_at: 2,
            version: 3,
        };
        let body =
            serde_json::to_value(WriteReceiptData::new("k".to_string(), &metadata)).unwrap();
        assert_eq!(body["key"], json!("k"));
        assert_eq!(body["version"], json!(3));
        assert_eq!(body["createdAt"], json!(1));
        assert_eq!(body["updatedAt"], json!(2));
    }
}
