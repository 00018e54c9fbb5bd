//! Shared application state for Axum routers.

use std::sync::Arc;

use carelink_storage::{CacheBackend, CacheConfig, StorageTrait};

use crate::services::{CarePlanService, NotificationService};
use crate::ws::WsState;

/// Application-wide state shared across all routes.
///
/// The store and cache are injected as trait objects so tests can substitute
/// in-memory fakes (including recording fakes that assert exact invalidation
/// call sequences).
#[derive(Clone)]
pub struct AppState {
    /// Authoritative document store.
    pub store: Arc<dyn StorageTrait>,
    /// Read cache backend.
    pub cache: Arc<dyn CacheBackend>,
    /// Realtime gateway state.
    pub ws: Arc<WsState>,
    /// Care-plan reads and mutations.
    pub care_plans: CarePlanService,
    /// Notification feed and reminder sweep.
    pub notifications: NotificationService,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire the services over the given store, cache, and gateway.
    pub fn new(
        store: Arc<dyn StorageTrait>,
        cache: Arc<dyn CacheBackend>,
        ws: Arc<WsState>,
        cache_config: CacheConfig,
    ) -> Self {
        let care_plans = CarePlanService::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            cache_config,
            Arc::clone(&ws),
        );
        let notifications =
            NotificationService::new(Arc::clone(&store), care_plans.dispatcher().clone());
        Self {
            store,
            cache,
            ws,
            care_plans,
            notifications,
            start_time: std::time::Instant::now(),
        }
    }
}
