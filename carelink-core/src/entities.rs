//! Core entity structures

use crate::{
    // ID types
    CarePlanId, NotificationId, TaskId, UserId,
    // Other types
    EntityIdType, EntityType, NotificationType, TaskStatus, Timestamp,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to an entity by type and ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EntityRef {
    pub entity_type: EntityType,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: Uuid, // Keep as Uuid - this is intentional, represents ANY entity
}

impl EntityRef {
    pub fn care_plan(id: CarePlanId) -> Self {
        Self {
            entity_type: EntityType::CarePlan,
            id: id.as_uuid(),
        }
    }

    pub fn task(id: TaskId) -> Self {
        Self {
            entity_type: EntityType::Task,
            id: id.as_uuid(),
        }
    }
}

/// Task - a unit of work inside a care plan, assigned to one user.
///
/// Tasks have no independent persistence: they are created and replaced as
/// part of a care-plan write and destroyed with their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Task {
    pub task_id: TaskId,
    pub task_name: String,
    pub assigned_to: UserId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub due_date: Timestamp,
    pub status: TaskStatus,
}

impl Task {
    /// Create a new pending task with a generated id.
    pub fn new(task_name: impl Into<String>, assigned_to: UserId, due_date: Timestamp) -> Self {
        Self {
            task_id: TaskId::now_v7(),
            task_name: task_name.into(),
            assigned_to,
            due_date,
            status: TaskStatus::Pending,
        }
    }
}

/// CarePlan - a titled, versioned collection of tasks owned by a care recipient.
///
/// The owner is immutable once set. `tasks` is never empty after creation
/// completes. `version` is checked-and-incremented on every store write to
/// reject lost updates from concurrent read-modify-write sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CarePlan {
    pub care_plan_id: CarePlanId,
    pub owner_user_id: UserId,
    pub title: String,
    pub tasks: Vec<Task>,
    /// Optimistic concurrency counter, incremented by the store on replace.
    pub version: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl CarePlan {
    /// Create a new care plan with a generated id and version 0.
    pub fn new(owner_user_id: UserId, title: impl Into<String>, tasks: Vec<Task>) -> Self {
        let now = Utc::now();
        Self {
            care_plan_id: CarePlanId::now_v7(),
            owner_user_id,
            title: title.into(),
            tasks,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a task by id.
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    /// Mutable task lookup.
    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.task_id == task_id)
    }

    /// Distinct task assignees, in first-appearance order.
    pub fn assignees(&self) -> Vec<UserId> {
        let mut seen = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.assigned_to) {
                seen.push(task.assigned_to);
            }
        }
        seen
    }

    /// Whether the given user is assigned to at least one task.
    pub fn has_assignee(&self, user_id: UserId) -> bool {
        self.tasks.iter().any(|t| t.assigned_to == user_id)
    }
}

/// Notification - a per-user record derived from a care-plan mutation.
///
/// Immutable except for the `read` flag. May outlive the entity it
/// references; consumers treat a dangling `related_entity` as "no longer
/// available" rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Notification {
    pub notification_id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_entity: EntityRef,
    pub read: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Notification {
    /// Create an unread notification with a generated id.
    pub fn new(
        user_id: UserId,
        message: impl Into<String>,
        notification_type: NotificationType,
        related_entity: EntityRef,
    ) -> Self {
        Self {
            notification_id: NotificationId::now_v7(),
            user_id,
            message: message.into(),
            notification_type,
            related_entity,
            read: false,
            created_at: Utc::now(),
        }
    }

    /// Mark as read. Idempotent: marking an already-read notification is a
    /// no-op, not an error.
    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

// =============================================================================
// TESTS
// =============================================================================
