//! CONVOY API Server Entry Point
//!
//! Bootstraps configuration, verifies the log-table schema, spawns the cache
//! purge and view refresh background tasks, and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use convoy_api::jobs::{view_refresh_task, ViewRefreshConfig};
use convoy_api::{create_api_router, ApiConfig, ApiError, ApiResult, DbClient, DbConfig};
use convoy_core::ALL_TABLES;
use convoy_storage::{CacheConfig, ResultCache};

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;

    // Schema problems are fatal; nothing below works without the tables.
    db.ensure_schema(ALL_TABLES).await?;

    let cache = Arc::new(ResultCache::new(CacheConfig::from_env()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    cache.spawn_purge_task(shutdown_rx.clone());
    tokio::spawn(view_refresh_task(
        Arc::new(db.clone()),
        ViewRefreshConfig::from_env(),
        shutdown_rx,
    ));

    let app: Router = create_api_router(db, cache);

    let api_config = ApiConfig::from_env();
    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting CONVOY API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    Ok(())
}
