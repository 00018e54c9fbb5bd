//! API Configuration Module
//!
//! Configuration is loaded from environment variables with sensible defaults
//! for development.

use std::net::SocketAddr;
use std::time::Duration;

use carelink_storage::CacheConfig;

use crate::error::{ApiError, ApiResult};

/// API configuration for binding, CORS, the realtime gateway, and the read
/// cache.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP server.
    pub bind_host: String,

    /// Bind port for the HTTP server.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Broadcast channel capacity for the realtime gateway.
    pub ws_capacity: usize,

    /// TTL for cached read results.
    pub cache_ttl: Duration,

    /// Maximum number of cached entries.
    pub cache_max_entries: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(), // Empty = allow all
            ws_capacity: 1000,
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 10_000,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CARELINK_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `CARELINK_API_PORT`: Bind port (default: 3000)
    /// - `CARELINK_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `CARELINK_WS_CAPACITY`: Broadcast channel capacity (default: 1000)
    /// - `CARELINK_CACHE_TTL_SECS`: Cached read TTL in seconds (default: 300)
    /// - `CARELINK_CACHE_MAX_ENTRIES`: Cache capacity (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host =
            std::env::var("CARELINK_API_BIND").unwrap_or(defaults.bind_host);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CARELINK_API_PORT").ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = std::env::var("CARELINK_CORS_ORIGINS")
            .ok()
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let ws_capacity = std::env::var("CARELINK_WS_CAPACITY")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.ws_capacity);

        let cache_ttl = std::env::var("CARELINK_CACHE_TTL_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let cache_max_entries = std::env::var("CARELINK_CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.cache_max_entries);

        Self {
            bind_host,
            port,
            cors_origins,
            ws_capacity,
            cache_ttl,
            cache_max_entries,
        }
    }

    /// Cache configuration derived from the API settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_ttl(self.cache_ttl)
            .with_max_entries(self.cache_max_entries)
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}
