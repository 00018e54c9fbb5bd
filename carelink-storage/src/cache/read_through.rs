//! Read-through wrapper over a cache backend.
//!
//! Callers probe the cache first; on miss the injected fetch closure
//! computes the role-filtered result from the store, the cache is populated
//! with a fixed TTL, and the result is returned. TTL bounds staleness when
//! an invalidation is lost.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use carelink_core::{CarelinkResult, Timestamp};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::keys::CacheKey;
use super::traits::CacheBackend;

/// Configuration for the read-through cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied to every populated entry.
    pub entry_ttl: Duration,
    /// Maximum number of entries the backend should hold.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: Duration::from_secs(300),
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Set the max entry count.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

/// Result of a cached read, carrying hit/miss provenance.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    cached_at: Timestamp,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// Wrap a cache hit.
    pub fn from_cache(value: T, cached_at: Timestamp) -> Self {
        Self {
            value,
            cached_at,
            was_cache_hit: true,
        }
    }

    /// Wrap a freshly computed value (cache miss).
    pub fn from_store(value: T) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
            was_cache_hit: false,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Borrow the underlying value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the value was cached (or computed).
    pub fn cached_at(&self) -> Timestamp {
        self.cached_at
    }

    /// Whether this read was served from the cache.
    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    /// Whether this read had to go to the store.
    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }
}

/// Read-through cache over an injected backend.
pub struct CachedReads<C: CacheBackend + ?Sized> {
    cache: Arc<C>,
    config: CacheConfig,
}

impl<C: CacheBackend + ?Sized> CachedReads<C> {
    /// Create a new read-through wrapper.
    pub fn new(cache: Arc<C>, config: CacheConfig) -> Self {
        Self { cache, config }
    }

    /// Create with default configuration.
    pub fn with_defaults(cache: Arc<C>) -> Self {
        Self::new(cache, CacheConfig::default())
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a reference to the cache backend.
    pub fn backend(&self) -> &C {
        &self.cache
    }

    /// Serve `key` from the cache, computing via `fetch` on miss.
    ///
    /// The fetched value is cached with the configured TTL before being
    /// returned. Cache failures on either the probe or the populate degrade
    /// to the store path: they are logged and the computed value is still
    /// returned, so a broken cache slows reads down but never fails them.
    pub async fn get_with<T, F, Fut>(&self, key: &CacheKey, fetch: F) -> CarelinkResult<CacheRead<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = CarelinkResult<T>>,
    {
        match self.cache.get(key).await {
            Ok(Some((value, cached_at))) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => return Ok(CacheRead::from_cache(decoded, cached_at)),
                Err(e) => {
                    // A corrupt entry must not poison reads; drop it.
                    warn!(key = %key.encode(), error = %e, "Discarding undecodable cache entry");
                    let _ = self.cache.invalidate(key).await;
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key.encode(), error = %e, "Cache probe failed, falling through to store");
            }
        }

        let value = fetch().await?;

        match serde_json::to_value(&value) {
            Ok(serialized) => {
                if let Err(e) = self.cache.put(key, serialized, self.config.entry_ttl).await {
                    warn!(key = %key.encode(), error = %e, "Failed to populate cache");
                }
            }
            Err(e) => {
                warn!(key = %key.encode(), error = %e, "Failed to serialize value for cache");
            }
        }

        Ok(CacheRead::from_store(value))
    }
}

impl<C: CacheBackend + ?Sized> Clone for CachedReads<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryCacheBackend;
    use carelink_core::{EntityIdType, Role, UserId};

    #[tokio::test]
    async fn test_miss_fetches_and_populates() {
        let backend = Arc::new(InMemoryCacheBackend::default());
        let reads = CachedReads::with_defaults(backend);
        let key = CacheKey::list(UserId::now_v7(), Role::Admin);

        let read = reads
            .get_with(&key, || async { Ok(vec!["plan-a".to_string()]) })
            .await
            .unwrap();
        assert!(read.was_cache_miss());
        assert_eq!(read.value(), &vec!["plan-a".to_string()]);

        // Second read must come from the cache without calling fetch.
        let read = reads
            .get_with::<Vec<String>, _, _>(&key, || async {
                panic!("fetch must not run on a warm cache")
            })
            .await
            .unwrap();
        assert!(read.was_cache_hit());
        assert_eq!(read.into_value(), vec!["plan-a".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let backend = Arc::new(InMemoryCacheBackend::default());
        let reads = CachedReads::with_defaults(backend);
        let key = CacheKey::list(UserId::now_v7(), Role::User);

        let result = reads
            .get_with::<Vec<String>, _, _>(&key, || async {
                Err(carelink_core::StorageError::LockPoisoned.into())
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_zero_ttl_always_misses() {
        let backend = Arc::new(InMemoryCacheBackend::default());
        let reads = CachedReads::new(
            backend,
            CacheConfig::new().with_ttl(Duration::from_secs(0)),
        );
        let key = CacheKey::list(UserId::now_v7(), Role::Admin);

        let first = reads.get_with(&key, || async { Ok(1u32) }).await.unwrap();
        assert!(first.was_cache_miss());
        let second = reads.get_with(&key, || async { Ok(2u32) }).await.unwrap();
        assert!(second.was_cache_miss());
        assert_eq!(second.into_value(), 2);
    }
}
