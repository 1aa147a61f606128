//! Cache service binary.
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Create the cache engine and storage client
//! 4. Start the background expiry sweep
//! 5. Build the axum router and serve
//! 6. Handle graceful shutdown on SIGINT/SIGTERM

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minikv::api::{create_cache_router, CacheState, RateLimiter};
use minikv::config::CacheConfig;
use minikv::tasks::spawn_cleanup_task;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minikv=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting minikv cache service");

    let config = CacheConfig::from_env();
    info!(
        max_cache_size = config.max_cache_size,
        default_ttl = config.default_ttl,
        port = config.port,
        storage = %config.storage_service_url,
        "configuration loaded"
    );

    let state = CacheState::from_config(&config);
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window_ms,
    ));

    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cleanup_interval);

    if state.storage.available().await {
        info!("storage service reachable");
    } else {
        warn!("storage service unreachable; persistence and fallback are degraded");
    }

    let app = create_cache_router(state, limiter);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind cache service port");
    info!("cache service listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cleanup_handle))
    .await
    .expect("cache service crashed");

    info!("cache service shutdown complete");
}

/// Waits for Ctrl+C or SIGTERM, then stops the sweep.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("received SIGTERM, shutting down");
        }
    }

    cleanup_handle.abort();
    warn!("expiry sweep stopped");
}
