//! # people-api: Binary Entry Point
//!
//! Loads configuration, connects the record store, and starts the Axum
//! HTTP server on `SERVER_PORT` (default 8080). Any startup failure is
//! logged and terminates the process.

use std::sync::Arc;

use people_api::config::{AppConfig, LogFormat};
use people_api::db::memory::MemoryPersonStore;
use people_api::db::people::PgPersonStore;
use people_api::db::PersonStore;
use people_api::state::AppState;
use people_enrich::EnrichmentClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real deployments set the environment.
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {e}");
        e
    })?;

    let store: Arc<dyn PersonStore> = match &config.database {
        Some(db) => {
            let pool = people_api::db::init_pool(db).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            Arc::new(PgPersonStore::new(pool))
        }
        None => {
            tracing::warn!(
                "DB_HOST not set: running with the in-memory store. \
                 Records will not survive restarts."
            );
            Arc::new(MemoryPersonStore::new())
        }
    };

    let enrichment = EnrichmentClient::new(config.enrich.clone()).map_err(|e| {
        tracing::error!("Failed to create enrichment client: {e}");
        e
    })?;
    tracing::info!(enrich = ?config.enrich, "Enrichment client configured");

    let state = AppState::new(store, enrichment);
    tracing::debug!(?state, "Application state ready");
    let app = people_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("People API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
