//! Store API Handlers
//!
//! HTTP request handlers for the store service endpoints.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::config::StoreConfig;
use crate::error::{KvError, Result};
use crate::models::{
    ApiResponse, BackupData, EntryCountData, KeyListData, RestoreRequest, SaveDataRequest,
    StoreHealthData, WriteReceiptData,
};
use crate::store::{StorageEntry, StoreManager, StoreStats};

// == Application State ==
/// Shared state for the store service.
#[derive(Clone)]
pub struct StoreState {
    pub manager: Arc<StoreManager>,
    pub max_file_size: usize,
    pub started_at: Instant,
}

impl StoreState {
    /// Creates state around an already-initialized manager.
    pub fn new(manager: StoreManager, max_file_size: usize) -> Self {
        Self {
            manager: Arc::new(manager),
            max_file_size,
            started_at: Instant::now(),
        }
    }

    /// Creates state from configuration (manager supplied by the caller,
    /// which owns store initialization).
    pub fn from_config(manager: StoreManager, config: &StoreConfig) -> Self {
        Self::new(manager, config.max_file_size)
    }
}

// == Save ==
/// Handler for POST `/api/data`.
///
/// Waits for the queued write to land, then answers with the resulting
/// version receipt.
pub async fn save_data(
    State(state): State<StoreState>,
    Json(req): Json<SaveDataRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WriteReceiptData>>)> {
    if let Some(error) = req.validate(state.max_file_size) {
        return Err(KvError::Validation(error));
    }

    let entry = state.manager.save(&req.key, req.value).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(WriteReceiptData::new(
            entry.key,
            &entry.metadata,
        ))),
    ))
}

// == Get ==
/// Handler for GET `/api/data/:key`.
pub async fn get_data(
    State(state): State<StoreState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<StorageEntry>>> {
    match state.manager.load(&key).await? {
        Some(entry) => Ok(Json(ApiResponse::ok(entry))),
        None => Err(KvError::NotFound(key)),
    }
}

// == Delete ==
/// Handler for DELETE `/api/data/:key`.
pub async fn delete_data(
    State(state): State<StoreState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.manager.delete(&key).await? {
        return Err(KvError::NotFound(key));
    }
    Ok(Json(ApiResponse::message(format!(
        "Key '{}' deleted successfully",
        key
    ))))
}

// == List ==
/// Handler for GET `/api/data`.
pub async fn list_data(
    State(state): State<StoreState>,
) -> Result<Json<ApiResponse<KeyListData>>> {
    let keys = state.manager.list().await?;
    let count = keys.len();
    Ok(Json(ApiResponse::ok(KeyListData { keys, count })))
}

// == Clear ==
/// Handler for DELETE `/api/storage`.
pub async fn clear_storage(
    State(state): State<StoreState>,
) -> Result<Json<ApiResponse<()>>> {
    state.manager.clear().await?;
    Ok(Json(ApiResponse::message("Storage cleared")))
}

// == Backup ==
/// Handler for POST `/api/backup`.
pub async fn run_backup(
    State(state): State<StoreState>,
) -> Result<Json<ApiResponse<BackupData>>> {
    let path = state.manager.backup().await?;
    Ok(Json(ApiResponse::ok(BackupData {
        path: path.display().to_string(),
    })))
}

// == Restore ==
/// Handler for POST `/api/backup/restore`.
pub async fn run_restore(
    State(state): State<StoreState>,
    Json(req): Json<RestoreRequest>,
) -> Result<Json<ApiResponse<EntryCountData>>> {
    let entries = state.manager.restore(&PathBuf::from(req.path)).await?;
    Ok(Json(ApiResponse::ok_with_message(
        EntryCountData { entries },
        "Restore complete",
    )))
}

// == Compact ==
/// Handler for POST `/api/compact`.
pub async fn run_compact(
    State(state): State<StoreState>,
) -> Result<Json<ApiResponse<EntryCountData>>> {
    let entries = state.manager.compact().await?;
    Ok(Json(ApiResponse::ok_with_message(
        EntryCountData { entries },
        "Compaction complete",
    )))
}

// == Stats ==
/// Handler for GET `/api/stats`.
pub async fn store_stats(
    State(state): State<StoreState>,
) -> Result<Json<ApiResponse<StoreStats>>> {
    Ok(Json(ApiResponse::ok(state.manager.stats().await?)))
}

// == Health ==
/// Handler for GET `/api/health`.
pub async fn store_health(
    State(state): State<StoreState>,
) -> Json<ApiResponse<StoreHealthData>> {
    // Health stays cheap and infallible: a stats failure reports zero
    // keys rather than an unhealthy service.
    let total_keys = state
        .manager
        .stats()
        .await
        .map(|s| s.total_keys)
        .unwrap_or(0);
    Json(ApiResponse::ok(StoreHealthData {
        status: "healthy".to_string(),
        total_keys,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
