//! Store API Routes
//!
//! Configures the axum router for the store service.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::rate_limit::{rate_limit, RateLimiter};
use super::store_handlers::{
    clear_storage, delete_data, get_data, list_data, run_backup, run_compact, run_restore,
    save_data, store_health, store_stats, StoreState,
};

/// Creates the store service router.
///
/// # Endpoints
/// - `POST /api/data` - persist a key (queued, answers with the receipt)
/// - `GET /api/data/:key` - read an entry
/// - `DELETE /api/data/:key` - delete an entry
/// - `GET /api/data` - list keys
/// - `DELETE /api/storage` - remove every entry
/// - `POST /api/backup` - snapshot all entries
/// - `POST /api/backup/restore` - replay a snapshot
/// - `POST /api/compact` - keep only the latest version per key
/// - `GET /api/stats` - store statistics
/// - `GET /api/health` - liveness
pub fn create_store_router(state: StoreState, limiter: Arc<RateLimiter>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/data", post(save_data).get(list_data))
        .route("/api/data/:key", get(get_data).delete(delete_data))
        .route("/api/storage", delete(clear_storage))
        .route("/api/backup", post(run_backup))
        .route("/api/backup/restore", post(run_restore))
        .route("/api/compact", post(run_compact))
        .route("/api/stats", get(store_stats))
        .route("/api/health", get(store_health))
        .layer(middleware::from_fn_with_state(limiter, rate_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
