mod api;
mod config;
mod model;
mod storage;

use crate::api::AppState;
use crate::config::{AppConfig, StorageBackend};
use crate::storage::{InMemoryReviewStore, PgReviewStore, ReviewStore};
use anyhow::Context;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    info!("🚀 Starting Movie Review API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Storage: {}", config.storage.backend);
    info!("   - Server: {}", config.server.bind_addr());

    // Initialize review store
    let store: Arc<dyn ReviewStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            info!("💾 Connecting to PostgreSQL...");
            let store = PgReviewStore::connect(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            Arc::new(store)
        }
        StorageBackend::Memory => {
            warn!("💾 Using in-memory storage, reviews are lost on shutdown");
            Arc::new(InMemoryReviewStore::new())
        }
    };
    info!("✅ Review store ready");

    let app = api::router(AppState::new(store.clone()), config.server.request_timeout());

    // Start server
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET    /health       - Health check");
    info!("   POST   /review       - Create review");
    info!("   GET    /review/{{id}}  - Get review");
    info!("   PUT    /review/{{id}}  - Update review");
    info!("   DELETE /review/{{id}}  - Delete review");
    info!("");
    info!("✨ Server is ready to accept requests!");

    let stop_accepting = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let stop_accepting = stop_accepting.clone();
            async move { stop_accepting.notified().await }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown_signal() => {
            stop_accepting.notify_one();

            let grace = config.server.shutdown_grace();
            info!(?grace, "⏳ Waiting for in-flight requests");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(?grace, "⚠️  Grace period elapsed, closing remaining connections"),
            }
        }
    }

    store.close().await;
    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
