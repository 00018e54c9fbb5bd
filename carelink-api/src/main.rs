//! Carelink API Server Entry Point
//!
//! Bootstraps configuration, wires the store, cache, and realtime gateway,
//! and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use carelink_api::{
    create_api_router, init_telemetry, ApiConfig, ApiError, ApiResult, AppState, TelemetryConfig,
    WsState,
};
use carelink_storage::{CacheBackend, InMemoryCacheBackend, InMemoryStorage, StorageTrait};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_telemetry(&telemetry_config)?;

    let config = ApiConfig::from_env();

    let store: Arc<dyn StorageTrait> = Arc::new(InMemoryStorage::new());
    let cache: Arc<dyn CacheBackend> =
        Arc::new(InMemoryCacheBackend::new(config.cache_max_entries));
    let ws = Arc::new(WsState::new(config.ws_capacity));

    let state = AppState::new(store, cache, ws, config.cache_config());
    let app: Router = create_api_router(state, &config);

    let addr = config.bind_addr()?;
    tracing::info!(%addr, "Starting Carelink API server");

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

    Ok(())
}
