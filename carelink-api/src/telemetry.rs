//! Structured logging initialization.
//!
//! Sets up the tracing subscriber with an env-filter and optional JSON
//! output for log aggregation.

use tracing_subscriber::EnvFilter;

use crate::error::{ApiError, ApiResult};

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directive for log verbosity (RUST_LOG syntax).
    pub log_filter: String,
    /// Emit JSON-formatted logs.
    pub log_json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: std::env::var("CARELINK_LOG")
                .unwrap_or_else(|_| "info,carelink_api=debug".to_string()),
            log_json: std::env::var("CARELINK_LOG_JSON")
                .map(|value| value == "true" || value == "1")
                .unwrap_or(false),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Call once at startup, before any tracing occurs.
pub fn init_telemetry(config: &TelemetryConfig) -> ApiResult<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| ApiError::internal_error(format!("Failed to initialize tracing: {}", e)))
}
