mod api_doc;
mod app;
mod config;
mod error;
mod handlers;
mod models;
mod mutation;
mod repository;
mod routes;
mod spanner;
mod state;
mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use config::{Config, StorageBackend};
use repository::DocumentRepository;
use spanner::SpannerStore;
use state::AppState;
use store::{InMemoryStore, KvStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    tracing::info!("navlinks-kv starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store = build_store(&config).await?;
    let address = config.address();

    let state = AppState {
        repository: DocumentRepository::new(store),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app::build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("navlinks-kv stopped");
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn KvStore>> {
    match config.storage_backend {
        StorageBackend::Spanner => {
            let spanner = config
                .spanner
                .as_ref()
                .context("Spanner settings are missing")?;
            Ok(Arc::new(SpannerStore::from_config(spanner).await?))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; links are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
