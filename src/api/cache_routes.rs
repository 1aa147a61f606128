//! Cache API Routes
//!
//! Configures the axum router for the cache service.

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

use super::cache_handlers::{
    cache_health, cache_stats, clear_cache, delete_key, get_key, list_keys, set_key,
    update_key, CacheState,
};
use super::rate_limit::{rate_limit, RateLimiter};

/// Creates the cache service router.
///
/// # Endpoints
/// - `POST /api/keys` - store a key (optionally write-through)
/// - `GET /api/keys/:key` - read a key (`?fallback=true` consults the store)
/// - `PUT /api/keys/:key` - update value and/or ttl
/// - `DELETE /api/keys/:key` - delete a key
/// - `GET /api/keys` - list keys
/// - `GET /api/stats` - cache statistics
/// - `DELETE /api/cache` - clear everything
/// - `GET /api/health` - liveness
pub fn create_cache_router(state: CacheState, limiter: Arc<RateLimiter>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/keys", post(set_key).get(list_keys))
        .route(
            "/api/keys/:key",
            get(get_key).put(update_key).delete(delete_key),
        )
        .route("/api/stats", get(cache_stats))
        .route("/api/cache", delete(clear_cache))
        .route("/api/health", get(cache_health))
        .layer(middleware::from_fn_with_state(limiter, rate_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
