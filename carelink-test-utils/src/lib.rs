//! Carelink Test Utilities
//!
//! Centralized test infrastructure for the Carelink workspace:
//! - Deterministic fixture users across all four roles
//! - A care-plan builder for assembling scenario fixtures
//! - Cache test doubles (recording and failing backends)
//! - Re-exports of the in-memory store and cache

// Re-export the in-memory engines from their source crate
pub use carelink_storage::{InMemoryCacheBackend, InMemoryStorage};

// Re-export core types for convenience
pub use carelink_core::{
    CarePlan, CarePlanId, CarelinkError, CarelinkResult, EntityIdType, EntityRef, EntityType,
    Notification, NotificationId, NotificationIntent, NotificationType, Role, Task, TaskId,
    TaskStatus, UserId,
};

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use carelink_core::{DependencyError, Timestamp};
use carelink_storage::{CacheBackend, CacheKey, CacheKeyPrefix, CacheStats, StorageTrait};
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

// ============================================================================
// FIXTURE USERS
// ============================================================================

/// Deterministic user id for fixtures: `fixture_user(1)` is stable across
/// runs, so scenario assertions can name their actors.
pub fn fixture_user(n: u128) -> UserId {
    UserId::from_uuid(Uuid::from_u128(n))
}

/// The standard cast: one actor per role plus two caregivers for
/// reassignment scenarios.
#[derive(Debug, Clone, Copy)]
pub struct FixtureUsers {
    /// Care recipient ("user" role).
    pub owner: UserId,
    pub caregiver_one: UserId,
    pub caregiver_two: UserId,
    pub family_member: UserId,
    pub admin: UserId,
}

impl Default for FixtureUsers {
    fn default() -> Self {
        Self {
            owner: fixture_user(1),
            caregiver_one: fixture_user(2),
            caregiver_two: fixture_user(3),
            family_member: fixture_user(4),
            admin: fixture_user(5),
        }
    }
}

impl FixtureUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// CARE PLAN BUILDER
// ============================================================================

/// Builder for scenario care plans.
#[derive(Debug, Clone)]
pub struct CarePlanBuilder {
    owner: UserId,
    title: String,
    tasks: Vec<Task>,
}

impl CarePlanBuilder {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            title: "Weekly Care".to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a pending task due in one day.
    pub fn task(mut self, name: impl Into<String>, assigned_to: UserId) -> Self {
        self.tasks
            .push(Task::new(name, assigned_to, Utc::now() + chrono::Duration::days(1)));
        self
    }

    /// Add a task with explicit due date and status.
    pub fn task_with(
        mut self,
        name: impl Into<String>,
        assigned_to: UserId,
        due_date: Timestamp,
        status: TaskStatus,
    ) -> Self {
        let mut task = Task::new(name, assigned_to, due_date);
        task.status = status;
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> CarePlan {
        CarePlan::new(self.owner, self.title, self.tasks)
    }

    /// Build and insert into the store.
    pub fn insert_into(self, store: &dyn StorageTrait) -> CarelinkResult<CarePlan> {
        let plan = self.build();
        store.care_plan_insert(&plan)?;
        Ok(plan)
    }
}

/// Seed a store with the standard fixture set: one plan per visibility
/// shape, covering every role's filter. Returns the plans in insertion
/// order: (owned-by-owner w/ caregiver_one, foreign plan, owned w/ both
/// caregivers).
pub fn seed_fixture_plans(
    store: &dyn StorageTrait,
    users: &FixtureUsers,
) -> CarelinkResult<Vec<CarePlan>> {
    let first = CarePlanBuilder::new(users.owner)
        .title("Weekly Care")
        .task("Meds", users.caregiver_one)
        .insert_into(store)?;
    let second = CarePlanBuilder::new(fixture_user(99))
        .title("Other Household")
        .task("Physio", fixture_user(98))
        .insert_into(store)?;
    let third = CarePlanBuilder::new(users.owner)
        .title("Weekend Care")
        .task("Walk", users.caregiver_one)
        .task("Shop", users.caregiver_two)
        .insert_into(store)?;
    Ok(vec![first, second, third])
}

// ============================================================================
// CACHE TEST DOUBLES
// ============================================================================

/// A recorded cache operation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Get(String),
    Put(String),
    Invalidate(String),
    InvalidatePrefix(String),
}

/// Cache backend that records every call while delegating to an in-memory
/// backend, so tests can assert exact invalidation sequences.
#[derive(Default)]
pub struct RecordingCacheBackend {
    inner: InMemoryCacheBackend,
    ops: Mutex<Vec<CacheOp>>,
}

impl RecordingCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded operations.
    pub fn ops(&self) -> Vec<CacheOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    /// Recorded prefix invalidations, in call order.
    pub fn invalidated_prefixes(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                CacheOp::InvalidatePrefix(prefix) => Some(prefix),
                _ => None,
            })
            .collect()
    }

    /// Clear the recording (not the cached entries).
    pub fn reset_ops(&self) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.clear();
        }
    }

    fn record(&self, op: CacheOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }
}

#[async_trait]
impl CacheBackend for RecordingCacheBackend {
    async fn get(&self, key: &CacheKey) -> CarelinkResult<Option<(JsonValue, Timestamp)>> {
        self.record(CacheOp::Get(key.encode()));
        self.inner.get(key).await
    }

    async fn put(&self, key: &CacheKey, value: JsonValue, ttl: Duration) -> CarelinkResult<()> {
        self.record(CacheOp::Put(key.encode()));
        self.inner.put(key, value, ttl).await
    }

    async fn invalidate(&self, key: &CacheKey) -> CarelinkResult<()> {
        self.record(CacheOp::Invalidate(key.encode()));
        self.inner.invalidate(key).await
    }

    async fn invalidate_prefix(&self, prefix: &CacheKeyPrefix) -> CarelinkResult<u64> {
        self.record(CacheOp::InvalidatePrefix(prefix.as_str().to_string()));
        self.inner.invalidate_prefix(prefix).await
    }

    async fn stats(&self) -> CarelinkResult<CacheStats> {
        self.inner.stats().await
    }
}

/// Cache backend that fails every operation, for exercising the
/// degrade-to-store and fire-and-forget paths.
#[derive(Debug, Default)]
pub struct FailingCacheBackend;

impl FailingCacheBackend {
    fn unavailable() -> CarelinkError {
        CarelinkError::Dependency(DependencyError::CacheUnavailable {
            reason: "synthetic failure".to_string(),
        })
    }
}

#[async_trait]
impl CacheBackend for FailingCacheBackend {
    async fn get(&self, _key: &CacheKey) -> CarelinkResult<Option<(JsonValue, Timestamp)>> {
        Err(Self::unavailable())
    }

    async fn put(&self, _key: &CacheKey, _value: JsonValue, _ttl: Duration) -> CarelinkResult<()> {
        Err(Self::unavailable())
    }

    async fn invalidate(&self, _key: &CacheKey) -> CarelinkResult<()> {
        Err(Self::unavailable())
    }

    async fn invalidate_prefix(&self, _prefix: &CacheKeyPrefix) -> CarelinkResult<u64> {
        Err(Self::unavailable())
    }

    async fn stats(&self) -> CarelinkResult<CacheStats> {
        Err(Self::unavailable())
    }
}

// ============================================================================
// TESTS
// ============================================================================
