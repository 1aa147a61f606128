//! Store service binary.
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Initialize the partitioned store and the manager
//! 4. Start the periodic backup task (if enabled)
//! 5. Build the axum router and serve
//! 6. On shutdown: stop the backup task, flush the queue, final backup

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minikv::api::{create_store_router, RateLimiter, StoreState};
use minikv::config::StoreConfig;
use minikv::store::{PartitionedStore, StoreManager};
use minikv::tasks::spawn_backup_task;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minikv=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting minikv store service");

    let config = StoreConfig::from_env();
    info!(
        data_path = %config.data_path,
        backup_interval_ms = config.backup_interval_ms,
        port = config.port,
        "configuration loaded"
    );

    let store = PartitionedStore::new(&config.data_path);
    store
        .initialize()
        .await
        .expect("failed to initialize data directory");

    let state = StoreState::from_config(StoreManager::new(store), &config);
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window_ms,
    ));

    let backup_handle = spawn_backup_task(state.manager.clone(), config.backup_interval_ms);
    let manager = state.manager.clone();

    let app = create_store_router(state, limiter);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind store service port");
    info!("store service listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(backup_handle))
    .await
    .expect("store service crashed");

    // Drain pending writes and attempt one last snapshot.
    manager.shutdown().await;
    info!("store service shutdown complete");
}

/// Waits for Ctrl+C or SIGTERM, then stops the backup timer.
async fn shutdown_signal(backup_handle: Option<JoinHandle<()>>) {
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

    if let Some(handle) = backup_handle {
        handle.abort();
        info!("periodic backup stopped");
    }
}
