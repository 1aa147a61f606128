//! Error types for the cache and store services
//!
//! Provides unified error handling using thiserror, with a mapping onto
//! HTTP statuses and the shared response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Error Enum ==
/// Unified error type across the cache engine, store, and HTTP adapters.
#[derive(Error, Debug)]
pub enum KvError {
    /// Request data failed validation (empty key, oversized value, ...)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Key not found (a lazily expired key counts as absent)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// File read/write failure other than a missing file
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored file exists but its JSON does not parse
    #[error("Corrupt entry for key {key}: {reason}")]
    CorruptEntry { key: String, reason: String },

    /// The storage service is unreachable or timed out
    #[error("Storage service unavailable: {0}")]
    Unavailable(String),

    /// Client exceeded the per-IP request budget
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for KvError {
    fn into_response(self) -> Response {
        let status = match &self {
            KvError::Validation(_) => StatusCode::BAD_REQUEST,
            KvError::NotFound(_) => StatusCode::NOT_FOUND,
            KvError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            KvError::CorruptEntry { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            KvError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            KvError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            KvError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Same envelope as successful responses; message text is safe to
        // show to clients (no paths or stack traces).
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, KvError>;
