//! Cache API Handlers
//!
//! HTTP request handlers for the cache service endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::CacheEngine;
use crate::client::StorageClient;
use crate::config::CacheConfig;
use crate::error::{KvError, Result};
use crate::models::{
    ApiResponse, CacheHealthData, CacheStatsData, KeyListData, KeyValueData, SetKeyData,
    SetKeyRequest, UpdateKeyRequest,
};

// == Application State ==
/// Shared state for the cache service.
///
/// The engine lives behind `Arc<RwLock<_>>`: its methods are synchronous
/// and never suspend, so each call is one atomic critical section.
#[derive(Clone)]
pub struct CacheState {
    pub cache: Arc<RwLock<CacheEngine>>,
    pub storage: Arc<StorageClient>,
    pub started_at: Instant,
}

impl CacheState {
    /// Creates state with the given engine and storage client.
    pub fn new(cache: CacheEngine, storage: StorageClient) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            storage: Arc::new(storage),
            started_at: Instant::now(),
        }
    }

    /// Creates state from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            CacheEngine::new(config.max_cache_size, config.default_ttl),
            StorageClient::new(config.storage_service_url.clone()),
        )
    }
}

/// Query parameters for GET `/api/keys/:key`.
#[derive(Debug, Deserialize)]
pub struct GetKeyParams {
    #[serde(default)]
    fallback: bool,
}

// == Set Key ==
/// Handler for POST `/api/keys`.
///
/// Mutates the cache first; the optional write-through hop happens after
/// the cache state is already observable. A failed write-through is
/// reported in the payload, never as a request failure.
pub async fn set_key(
    State(state): State<CacheState>,
    Json(req): Json<SetKeyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SetKeyData>>)> {
    if let Some(error) = req.validate() {
        return Err(KvError::Validation(error));
    }

    {
        let mut cache = state.cache.write().await;
        cache.set(&req.key, req.value.clone(), req.ttl);
    }

    let persisted = if req.persist {
        let ok = state.storage.save(&req.key, &req.value).await;
        if !ok {
            warn!(key = %req.key, "write-through to storage failed");
        }
        ok
    } else {
        false
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            SetKeyData {
                key: req.key.clone(),
                persisted,
            },
            format!("Key '{}' set successfully", req.key),
        )),
    ))
}

// == Get Key ==
/// Handler for GET `/api/keys/:key`.
///
/// On a miss with `?fallback=true`, consults the storage service and
/// populates the cache before answering. Storage failures stay misses.
pub async fn get_key(
    State(state): State<CacheState>,
    Path(key): Path<String>,
    Query(params): Query<GetKeyParams>,
) -> Result<Json<ApiResponse<KeyValueData>>> {
    if let Some(value) = state.cache.write().await.get(&key) {
        return Ok(Json(ApiResponse::ok(KeyValueData { key, value })));
    }

    if params.fallback {
        if let Some(value) = state.storage.load(&key).await {
            debug!(%key, "populated cache from storage fallback");
            state.cache.write().await.set(&key, value.clone(), None);
            return Ok(Json(ApiResponse::ok(KeyValueData { key, value })));
        }
    }

    Err(KvError::NotFound(key))
}

// == Update Key ==
/// Handler for PUT `/api/keys/:key`.
///
/// Requires the key to be present. A value-only update keeps the
/// record's declared TTL; a ttl-only update leaves the value and its
/// recency alone.
pub async fn update_key(
    State(state): State<CacheState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateKeyRequest>,
) -> Result<Json<ApiResponse<KeyValueData>>> {
    if let Some(error) = req.validate() {
        return Err(KvError::Validation(error));
    }

    let mut cache = state.cache.write().await;
    let existing = cache
        .get_entry(&key)
        .ok_or_else(|| KvError::NotFound(key.clone()))?;

    let value = match (req.value, req.ttl) {
        (Some(value), ttl) => {
            cache.set(&key, value.clone(), Some(ttl.unwrap_or(existing.ttl_seconds)));
            value
        }
        (None, Some(ttl)) => {
            cache.update_ttl(&key, ttl);
            existing.value
        }
        (None, None) => unreachable!("validated above"),
    };

    Ok(Json(ApiResponse::ok_with_message(
        KeyValueData {
            key: key.clone(),
            value,
        },
        format!("Key '{}' updated successfully", key),
    )))
}

// == Delete Key ==
/// Handler for DELETE `/api/keys/:key`.
pub async fn delete_key(
    State(state): State<CacheState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let deleted = state.cache.write().await.delete(&key);
    if !deleted {
        return Err(KvError::NotFound(key));
    }
    Ok(Json(ApiResponse::message(format!(
        "Key '{}' deleted successfully",
        key
    ))))
}

// == List Keys ==
/// Handler for GET `/api/keys`.
pub async fn list_keys(
    State(state): State<CacheState>,
) -> Json<ApiResponse<KeyListData>> {
    let keys = state.cache.write().await.keys();
    let count = keys.len();
    Json(ApiResponse::ok(KeyListData { keys, count }))
}

// == Stats ==
/// Handler for GET `/api/stats`.
pub async fn cache_stats(
    State(state): State<CacheState>,
) -> Json<ApiResponse<CacheStatsData>> {
    let stats = state.cache.read().await.stats();
    Json(ApiResponse::ok(stats.into()))
}

// == Clear ==
/// Handler for DELETE `/api/cache`.
pub async fn clear_cache(State(state): State<CacheState>) -> Json<ApiResponse<()>> {
    state.cache.write().await.clear();
    Json(ApiResponse::message("Cache cleared"))
}

// == Health ==
/// Handler for GET `/api/health`.
pub async fn cache_health(
    State(state): State<CacheState>,
) -> Json<ApiResponse<CacheHealthData>> {
    let stats = state.cache.read().await.stats();
    Json(ApiResponse::ok(CacheHealthData {
        status: "healthy".to_string(),
        size: stats.size,
        max_size: stats.max_size,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
