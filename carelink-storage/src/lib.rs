//! Carelink Storage - Storage Trait and In-Memory Store
//!
//! Defines the storage abstraction for care plans and notifications plus the
//! in-process document store that backs the service. Per-document write
//! ordering is provided by the store itself: a care-plan replace is atomic
//! and version-checked, so concurrent read-modify-write sequences cannot
//! silently lose updates.

pub mod cache;

pub use cache::{
    CacheBackend, CacheConfig, CacheKey, CacheKeyPrefix, CacheRead, CacheStats, CachedReads,
    InMemoryCacheBackend,
};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use carelink_core::{
    CarePlan, CarePlanId, CarelinkError, CarelinkResult, EntityIdType, EntityType, Notification,
    NotificationId, StorageError, UserId,
};

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for Carelink entities.
///
/// Implementations provide persistence for care-plan documents and
/// notification records. Tasks are not independently addressable: they live
/// inside their parent plan document and are written by replacing the whole
/// document.
pub trait StorageTrait: Send + Sync {
    // === Care Plan Operations ===

    /// Insert a new care plan.
    fn care_plan_insert(&self, plan: &CarePlan) -> CarelinkResult<()>;

    /// Get a care plan by ID.
    fn care_plan_get(&self, id: CarePlanId) -> CarelinkResult<Option<CarePlan>>;

    /// List all care plans. Role filtering is the caller's concern.
    fn care_plan_list(&self) -> CarelinkResult<Vec<CarePlan>>;

    /// Replace a care plan document, checking the optimistic version.
    ///
    /// The stored document's version must equal `expected_version`; on match
    /// the replacement is persisted with the version incremented and
    /// `updated_at` refreshed, and the stored document is returned. A
    /// mismatch fails with `StorageError::Conflict` and leaves the stored
    /// document untouched.
    fn care_plan_replace(
        &self,
        id: CarePlanId,
        expected_version: u64,
        plan: CarePlan,
    ) -> CarelinkResult<CarePlan>;

    /// Hard-delete a care plan. Fails with `NotFound` if absent.
    fn care_plan_delete(&self, id: CarePlanId) -> CarelinkResult<()>;

    // === Notification Operations ===

    /// Insert a new notification record.
    fn notification_insert(&self, notification: &Notification) -> CarelinkResult<()>;

    /// Get a notification by ID.
    fn notification_get(&self, id: NotificationId) -> CarelinkResult<Option<Notification>>;

    /// List a user's notifications, newest first.
    fn notification_list_for_user(&self, user_id: UserId) -> CarelinkResult<Vec<Notification>>;

    /// Set the read flag. Idempotent; returns the stored record.
    fn notification_mark_read(&self, id: NotificationId) -> CarelinkResult<Notification>;

    /// Delete a notification. Fails with `NotFound` if absent.
    fn notification_delete(&self, id: NotificationId) -> CarelinkResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory document store.
///
/// The authoritative store engine for this service: RwLock'd tables keyed by
/// entity id. Taking the table's write lock for the whole replace gives the
/// per-document write serialization the mutation service relies on.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    care_plans: Arc<RwLock<HashMap<CarePlanId, CarePlan>>>,
    notifications: Arc<RwLock<HashMap<NotificationId, Notification>>>,
}

impl InMemoryStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        if let Ok(mut plans) = self.care_plans.write() {
            plans.clear();
        }
        if let Ok(mut notifications) = self.notifications.write() {
            notifications.clear();
        }
    }

    /// Number of stored care plans.
    pub fn care_plan_count(&self) -> usize {
        self.care_plans.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Number of stored notifications.
    pub fn notification_count(&self) -> usize {
        self.notifications.read().map(|t| t.len()).unwrap_or(0)
    }
}

fn poisoned(_: impl std::fmt::Debug) -> CarelinkError {
    CarelinkError::Storage(StorageError::LockPoisoned)
}

impl StorageTrait for InMemoryStorage {
    // === Care Plan Operations ===

    fn care_plan_insert(&self, plan: &CarePlan) -> CarelinkResult<()> {
        let mut plans = self.care_plans.write().map_err(poisoned)?;
        plans.insert(plan.care_plan_id, plan.clone());
        Ok(())
    }

    fn care_plan_get(&self, id: CarePlanId) -> CarelinkResult<Option<CarePlan>> {
        let plans = self.care_plans.read().map_err(poisoned)?;
        Ok(plans.get(&id).cloned())
    }

    fn care_plan_list(&self) -> CarelinkResult<Vec<CarePlan>> {
        let plans = self.care_plans.read().map_err(poisoned)?;
        let mut all: Vec<CarePlan> = plans.values().cloned().collect();
        all.sort_by_key(|p| p.care_plan_id);
        Ok(all)
    }

    fn care_plan_replace(
        &self,
        id: CarePlanId,
        expected_version: u64,
        mut plan: CarePlan,
    ) -> CarelinkResult<CarePlan> {
        let mut plans = self.care_plans.write().map_err(poisoned)?;
        let stored = plans.get(&id).ok_or(CarelinkError::Storage(StorageError::NotFound {
            entity_type: EntityType::CarePlan,
            id: id.as_uuid(),
        }))?;

        if stored.version != expected_version {
            return Err(CarelinkError::Storage(StorageError::Conflict {
                entity_type: EntityType::CarePlan,
                id: id.as_uuid(),
                expected: expected_version,
                found: stored.version,
            }));
        }

        plan.care_plan_id = id;
        plan.version = expected_version + 1;
        plan.updated_at = chrono::Utc::now();
        plans.insert(id, plan.clone());
        Ok(plan)
    }

    fn care_plan_delete(&self, id: CarePlanId) -> CarelinkResult<()> {
        let mut plans = self.care_plans.write().map_err(poisoned)?;
        plans
            .remove(&id)
            .map(|_| ())
            .ok_or(CarelinkError::Storage(StorageError::NotFound {
                entity_type: EntityType::CarePlan,
                id: id.as_uuid(),
            }))
    }

    // === Notification Operations ===

    fn notification_insert(&self, notification: &Notification) -> CarelinkResult<()> {
        let mut notifications = self.notifications.write().map_err(poisoned)?;
        notifications.insert(notification.notification_id, notification.clone());
        Ok(())
    }

    fn notification_get(&self, id: NotificationId) -> CarelinkResult<Option<Notification>> {
        let notifications = self.notifications.read().map_err(poisoned)?;
        Ok(notifications.get(&id).cloned())
    }

    fn notification_list_for_user(&self, user_id: UserId) -> CarelinkResult<Vec<Notification>> {
        let notifications = self.notifications.read().map_err(poisoned)?;
        let mut for_user: Vec<Notification> = notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        for_user.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(for_user)
    }

    fn notification_mark_read(&self, id: NotificationId) -> CarelinkResult<Notification> {
        let mut notifications = self.notifications.write().map_err(poisoned)?;
        let notification =
            notifications
                .get_mut(&id)
                .ok_or(CarelinkError::Storage(StorageError::NotFound {
                    entity_type: EntityType::Notification,
                    id: id.as_uuid(),
                }))?;
        notification.mark_read();
        Ok(notification.clone())
    }

    fn notification_delete(&self, id: NotificationId) -> CarelinkResult<()> {
        let mut notifications = self.notifications.write().map_err(poisoned)?;
        notifications
            .remove(&id)
            .map(|_| ())
            .ok_or(CarelinkError::Storage(StorageError::NotFound {
                entity_type: EntityType::Notification,
                id: id.as_uuid(),
            }))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::{EntityRef, NotificationType, Task};
    use chrono::Utc;

    fn sample_plan() -> CarePlan {
        CarePlan::new(
            UserId::now_v7(),
            "Weekly Care",
            vec![Task::new("Meds", UserId::now_v7(), Utc::now())],
        )
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let store = InMemoryStorage::new();
        let plan = sample_plan();
        store.care_plan_insert(&plan).unwrap();

        let fetched = store.care_plan_get(plan.care_plan_id).unwrap().unwrap();
        assert_eq!(fetched, plan);
        assert!(store.care_plan_get(CarePlanId::now_v7()).unwrap().is_none());
    }

    #[test]
    fn test_replace_bumps_version() {
        let store = InMemoryStorage::new();
        let plan = sample_plan();
        store.care_plan_insert(&plan).unwrap();

        let mut updated = plan.clone();
        updated.title = "Revised Care".to_string();
        let stored = store
            .care_plan_replace(plan.care_plan_id, 0, updated)
            .unwrap();

        assert_eq!(stored.version, 1);
        assert_eq!(stored.title, "Revised Care");
        assert!(stored.updated_at >= plan.updated_at);
    }

    #[test]
    fn test_replace_rejects_stale_version() {
        let store = InMemoryStorage::new();
        let plan = sample_plan();
        store.care_plan_insert(&plan).unwrap();

        let first = store
            .care_plan_replace(plan.care_plan_id, 0, plan.clone())
            .unwrap();
        assert_eq!(first.version, 1);

        // A second writer still holding version 0 must be rejected.
        let err = store
            .care_plan_replace(plan.care_plan_id, 0, plan.clone())
            .unwrap_err();
        assert!(matches!(
            err,
            CarelinkError::Storage(StorageError::Conflict { expected: 0, found: 1, .. })
        ));
    }

    #[test]
    fn test_delete_is_final() {
        let store = InMemoryStorage::new();
        let plan = sample_plan();
        store.care_plan_insert(&plan).unwrap();

        store.care_plan_delete(plan.care_plan_id).unwrap();
        assert!(store.care_plan_get(plan.care_plan_id).unwrap().is_none());

        let err = store.care_plan_delete(plan.care_plan_id).unwrap_err();
        assert!(matches!(
            err,
            CarelinkError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_notification_listing_is_per_user_newest_first() {
        let store = InMemoryStorage::new();
        let recipient = UserId::now_v7();
        let other = UserId::now_v7();
        let plan = sample_plan();

        let mut first = Notification::new(
            recipient,
            "first",
            NotificationType::CarePlanAdded,
            EntityRef::care_plan(plan.care_plan_id),
        );
        first.created_at = Utc::now() - chrono::Duration::minutes(5);
        let second = Notification::new(
            recipient,
            "second",
            NotificationType::CarePlanUpdated,
            EntityRef::care_plan(plan.care_plan_id),
        );
        let unrelated = Notification::new(
            other,
            "other",
            NotificationType::TaskAssigned,
            EntityRef::care_plan(plan.care_plan_id),
        );

        store.notification_insert(&first).unwrap();
        store.notification_insert(&second).unwrap();
        store.notification_insert(&unrelated).unwrap();

        let listed = store.notification_list_for_user(recipient).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].message, "second");
        assert_eq!(listed[1].message, "first");
    }

    #[test]
    fn test_mark_read_idempotent_at_store_level() {
        let store = InMemoryStorage::new();
        let plan = sample_plan();
        let n = Notification::new(
            plan.owner_user_id,
            "msg",
            NotificationType::CarePlanAdded,
            EntityRef::care_plan(plan.care_plan_id),
        );
        store.notification_insert(&n).unwrap();

        let once = store.notification_mark_read(n.notification_id).unwrap();
        let twice = store.notification_mark_read(n.notification_id).unwrap();
        assert!(once.read);
        assert_eq!(once, twice);
    }
}
