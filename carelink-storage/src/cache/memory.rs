//! In-memory cache backend with per-entry TTL.
//!
//! Entries expire lazily: an expired entry found on `get` is removed and
//! counted as a miss. A bounded capacity evicts the oldest entry on insert.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use carelink_core::{CarelinkError, CarelinkResult, DependencyError, Timestamp};
use chrono::Utc;
use serde_json::Value as JsonValue;

use super::keys::{CacheKey, CacheKeyPrefix};
use super::traits::{CacheBackend, CacheStats};

/// Default capacity before eviction kicks in.
const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: JsonValue,
    cached_at: Timestamp,
    expires_at: Timestamp,
}

/// In-memory cache backend.
#[derive(Debug)]
pub struct InMemoryCacheBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
    max_entries: usize,
}

impl Default for InMemoryCacheBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl InMemoryCacheBackend {
    /// Create a backend bounded to `max_entries`.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
            max_entries,
        }
    }

    /// Drop every expired entry. Expiry is otherwise lazy (on read).
    pub fn purge_expired(&self) -> CarelinkResult<u64> {
        let now = Utc::now();
        let mut entries = self.entries.write().map_err(unavailable)?;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }

    fn record_hit(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.hits += 1;
        }
    }

    fn record_miss(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.misses += 1;
        }
    }
}

fn unavailable(_: impl std::fmt::Debug) -> CarelinkError {
    CarelinkError::Dependency(DependencyError::CacheUnavailable {
        reason: "cache lock poisoned".to_string(),
    })
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &CacheKey) -> CarelinkResult<Option<(JsonValue, Timestamp)>> {
        let encoded = key.encode();
        let now = Utc::now();

        {
            let entries = self.entries.read().map_err(unavailable)?;
            if let Some(entry) = entries.get(&encoded) {
                if entry.expires_at > now {
                    self.record_hit();
                    return Ok(Some((entry.value.clone(), entry.cached_at)));
                }
            } else {
                self.record_miss();
                return Ok(None);
            }
        }

        // Entry exists but is expired: remove it under the write lock.
        let mut entries = self.entries.write().map_err(unavailable)?;
        if let Some(entry) = entries.get(&encoded) {
            if entry.expires_at > now {
                // Re-populated between the locks.
                self.record_hit();
                return Ok(Some((entry.value.clone(), entry.cached_at)));
            }
            entries.remove(&encoded);
        }
        self.record_miss();
        Ok(None)
    }

    async fn put(&self, key: &CacheKey, value: JsonValue, ttl: Duration) -> CarelinkResult<()> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        let mut entries = self.entries.write().map_err(unavailable)?;

        let encoded = key.encode();
        if entries.len() >= self.max_entries && !entries.contains_key(&encoded) {
            // Evict the oldest entry to stay within capacity.
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.cached_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
                if let Ok(mut stats) = self.stats.write() {
                    stats.evictions += 1;
                }
            }
        }

        entries.insert(
            encoded,
            CacheEntry {
                value,
                cached_at: now,
                expires_at: now + ttl,
            },
        );

        if let Ok(mut stats) = self.stats.write() {
            stats.entry_count = entries.len() as u64;
        }
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> CarelinkResult<()> {
        let mut entries = self.entries.write().map_err(unavailable)?;
        if entries.remove(&key.encode()).is_some() {
            if let Ok(mut stats) = self.stats.write() {
                stats.invalidations += 1;
                stats.entry_count = entries.len() as u64;
            }
        }
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &CacheKeyPrefix) -> CarelinkResult<u64> {
        let mut entries = self.entries.write().map_err(unavailable)?;
        let before = entries.len();
        entries.retain(|encoded, _| !prefix.matches(encoded));
        let removed = (before - entries.len()) as u64;
        if let Ok(mut stats) = self.stats.write() {
            stats.invalidations += removed;
            stats.entry_count = entries.len() as u64;
        }
        Ok(removed)
    }

    async fn stats(&self) -> CarelinkResult<CacheStats> {
        let mut stats = self.stats.read().map_err(unavailable)?.clone();
        stats.entry_count = self.entries.read().map_err(unavailable)?.len() as u64;
        Ok(stats)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::{CarePlanId, EntityIdType, Role, UserId};
    use serde_json::json;

    fn key_for(user: UserId, role: Role) -> CacheKey {
        CacheKey::list(user, role)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let cache = InMemoryCacheBackend::default();
        let key = key_for(UserId::now_v7(), Role::Admin);
        cache
            .put(&key, json!(["plan-a"]), Duration::from_secs(300))
            .await
            .unwrap();

        let (value, _) = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(value, json!(["plan-a"]));

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = InMemoryCacheBackend::default();
        let key = key_for(UserId::now_v7(), Role::User);
        cache
            .put(&key, json!([]), Duration::from_secs(0))
            .await
            .unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 0);
    }

    #[tokio::test]
    async fn test_entries_are_keyed_per_user_and_role() {
        let cache = InMemoryCacheBackend::default();
        let user_a = UserId::now_v7();
        let user_b = UserId::now_v7();

        cache
            .put(&key_for(user_a, Role::Caregiver), json!(["a"]), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put(&key_for(user_b, Role::Caregiver), json!(["b"]), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put(&key_for(user_a, Role::Admin), json!(["a-admin"]), Duration::from_secs(60))
            .await
            .unwrap();

        let (a, _) = cache.get(&key_for(user_a, Role::Caregiver)).await.unwrap().unwrap();
        let (b, _) = cache.get(&key_for(user_b, Role::Caregiver)).await.unwrap().unwrap();
        let (a_admin, _) = cache.get(&key_for(user_a, Role::Admin)).await.unwrap().unwrap();
        assert_eq!(a, json!(["a"]));
        assert_eq!(b, json!(["b"]));
        assert_eq!(a_admin, json!(["a-admin"]));
    }

    #[tokio::test]
    async fn test_invalidate_prefix_sweeps_matching_entries() {
        let cache = InMemoryCacheBackend::default();
        let plan = CarePlanId::now_v7();
        let user_a = UserId::now_v7();
        let user_b = UserId::now_v7();

        for (user, role) in [(user_a, Role::User), (user_b, Role::Caregiver)] {
            cache
                .put(&CacheKey::list(user, role), json!([]), Duration::from_secs(60))
                .await
                .unwrap();
            cache
                .put(&CacheKey::item(plan, user, role), json!({}), Duration::from_secs(60))
                .await
                .unwrap();
        }

        let removed = cache
            .invalidate_prefix(&CacheKeyPrefix::item(plan))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        // List entries survive an item sweep.
        assert!(cache.get(&CacheKey::list(user_a, Role::User)).await.unwrap().is_some());

        let removed = cache
            .invalidate_prefix(&CacheKeyPrefix::user_lists(user_a))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get(&CacheKey::list(user_b, Role::Caregiver)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_capacity_eviction() {
        let cache = InMemoryCacheBackend::new(2);
        let first = key_for(UserId::now_v7(), Role::User);
        cache.put(&first, json!(1), Duration::from_secs(60)).await.unwrap();
        cache
            .put(&key_for(UserId::now_v7(), Role::User), json!(2), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put(&key_for(UserId::now_v7(), Role::User), json!(3), Duration::from_secs(60))
            .await
            .unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.evictions, 1);
    }
}
