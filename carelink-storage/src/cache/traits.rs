//! Cache backend trait and statistics.
//!
//! The backend is an injected seam: the service holds a `dyn CacheBackend`
//! so tests can substitute a recording fake and assert exact invalidation
//! call sequences.

use async_trait::async_trait;
use carelink_core::{CarelinkResult, Timestamp};
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::keys::{CacheKey, CacheKeyPrefix};

/// Cache backend trait for pluggable cache implementations.
///
/// Values are stored as serialized JSON: the cached artifact is the
/// already-role-filtered response body, not a live entity.
///
/// Backends surface failures as `DependencyError`; callers on the mutation
/// path treat those as fire-and-forget (log, never fail the write).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value and the instant it was cached, or None on miss/expiry.
    async fn get(&self, key: &CacheKey) -> CarelinkResult<Option<(JsonValue, Timestamp)>>;

    /// Put a value with the given time-to-live.
    async fn put(&self, key: &CacheKey, value: JsonValue, ttl: Duration) -> CarelinkResult<()>;

    /// Delete a single entry. Deleting an absent entry is not an error.
    async fn invalidate(&self, key: &CacheKey) -> CarelinkResult<()>;

    /// Delete every entry under a prefix, returning the count removed.
    async fn invalidate_prefix(&self, prefix: &CacheKeyPrefix) -> CarelinkResult<u64>;

    /// Get cache statistics.
    async fn stats(&self) -> CarelinkResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (including expired entries).
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
    /// Number of entries removed by invalidation.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
