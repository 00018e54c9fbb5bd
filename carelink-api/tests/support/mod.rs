//! Shared helpers for the integration test suites.

use std::sync::Arc;

use carelink_api::{AppState, AuthContext, WsState};
use carelink_storage::{CacheBackend, CacheConfig, StorageTrait};
use carelink_test_utils::{
    FailingCacheBackend, InMemoryCacheBackend, InMemoryStorage, RecordingCacheBackend, Role,
    UserId,
};

pub fn auth(user_id: UserId, role: Role) -> AuthContext {
    AuthContext::new(user_id, role)
}

/// State over a fresh in-memory store and cache.
pub fn state() -> (Arc<InMemoryStorage>, Arc<InMemoryCacheBackend>, AppState) {
    let store = Arc::new(InMemoryStorage::new());
    let cache = Arc::new(InMemoryCacheBackend::default());
    let app = AppState::new(
        store.clone() as Arc<dyn StorageTrait>,
        cache.clone() as Arc<dyn CacheBackend>,
        Arc::new(WsState::new(64)),
        CacheConfig::default(),
    );
    (store, cache, app)
}

/// State whose cache records every call, for invalidation-sequence asserts.
pub fn state_with_recording_cache() -> (
    Arc<InMemoryStorage>,
    Arc<RecordingCacheBackend>,
    AppState,
) {
    let store = Arc::new(InMemoryStorage::new());
    let cache = Arc::new(RecordingCacheBackend::new());
    let app = AppState::new(
        store.clone() as Arc<dyn StorageTrait>,
        cache.clone() as Arc<dyn CacheBackend>,
        Arc::new(WsState::new(64)),
        CacheConfig::default(),
    );
    (store, cache, app)
}

/// State whose cache fails every call, for degrade-path asserts.
pub fn state_with_failing_cache() -> (Arc<InMemoryStorage>, AppState) {
    let store = Arc::new(InMemoryStorage::new());
    let app = AppState::new(
        store.clone() as Arc<dyn StorageTrait>,
        Arc::new(FailingCacheBackend) as Arc<dyn CacheBackend>,
        Arc::new(WsState::new(64)),
        CacheConfig::default(),
    );
    (store, app)
}
