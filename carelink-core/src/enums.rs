//! Enum types for Carelink entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CORE ENUMS
// ============================================================================

/// Actor role, carried per-request from the authentication collaborator.
///
/// Roles determine both write permission and the read filtering applied by
/// the access policy. Never persisted as an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The care recipient.
    User,
    /// Assigned helper; sees only plans containing one of their tasks.
    Caregiver,
    /// Family coordinator; full read and write access to plans.
    FamilyMember,
    /// Administrator; unrestricted.
    Admin,
}

impl Role {
    /// All roles, in declaration order. Used by tests and fixtures.
    pub const ALL: [Role; 4] = [Role::User, Role::Caregiver, Role::FamilyMember, Role::Admin];

    /// Wire representation, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Caregiver => "caregiver",
            Role::FamilyMember => "family_member",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "caregiver" => Ok(Role::Caregiver),
            "family_member" => Ok(Role::FamilyMember),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Status of a task within a care plan.
///
/// Transitions are unordered: any status is reachable from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TaskStatus::Pending),
            "InProgress" => Ok(TaskStatus::InProgress),
            "Completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Category of a derived notification.
///
/// The wire names double as realtime event names for per-recipient pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum NotificationType {
    #[serde(rename = "careplan_added")]
    CarePlanAdded,
    #[serde(rename = "careplan_updated")]
    CarePlanUpdated,
    #[serde(rename = "task_assigned")]
    TaskAssigned,
    #[serde(rename = "task_reminder")]
    TaskReminder,
}

impl NotificationType {
    /// Wire/event name, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::CarePlanAdded => "careplan_added",
            NotificationType::CarePlanUpdated => "careplan_updated",
            NotificationType::TaskAssigned => "task_assigned",
            NotificationType::TaskReminder => "task_reminder",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity type discriminator for polymorphic references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    CarePlan,
    Task,
    Notification,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::CarePlan => f.write_str("care_plan"),
            EntityType::Task => f.write_str("task"),
            EntityType::Notification => f.write_str("notification"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
