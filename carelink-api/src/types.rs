//! Request and response types for the Carelink API.

use carelink_core::{TaskStatus, TaskId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

// ============================================================================
// CARE PLAN REQUESTS
// ============================================================================

/// Request body for POST /api/v1/care-plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct CreateCarePlanRequest {
    /// The care recipient who owns the plan.
    pub owner_user_id: UserId,
    pub title: String,
    /// Must contain at least one task.
    pub tasks: Vec<TaskInput>,
}

/// One task in a create or update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct TaskInput {
    /// Present when replacing an existing task; absent for a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub task_name: String,
    pub assigned_to: UserId,
    #[schema(value_type = String, format = "date-time")]
    pub due_date: Timestamp,
    /// Defaults to Pending for new tasks, or to the prior status when
    /// replacing an existing task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Request body for PUT /api/v1/care-plans/{id}.
///
/// Fields are independently optional; an omitted field retains its prior
/// value. The owner is immutable, so `owner_user_id` is accepted only to be
/// rejected with a validation error when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct UpdateCarePlanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replaces the full task set when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<UserId>,
}

/// Request body for PUT /api/v1/care-plans/{id}/tasks/{task_id}/status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

// ============================================================================
// NOTIFICATION REQUESTS
// ============================================================================

/// Query parameters for GET /api/v1/notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct ListNotificationsParams {
    /// Admin-only: read another user's notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// Request body for POST /api/v1/notifications/reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct ReminderSweepRequest {
    /// Tasks due within this many hours get a reminder. Defaults to 24.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_hours: Option<u64>,
}

// ============================================================================
// GENERIC RESPONSES
// ============================================================================

/// Response for delete operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { deleted: true }
    }
}

/// Response for the reminder sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct ReminderSweepResponse {
    /// Number of reminder notifications dispatched.
    pub dispatched: u64,
}

/// Response for GET /health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_fields_are_independently_optional() {
        let parsed: UpdateCarePlanRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, UpdateCarePlanRequest::default());

        let parsed: UpdateCarePlanRequest =
            serde_json::from_str(r#"{"title": "Revised"}"#).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Revised"));
        assert!(parsed.tasks.is_none());
    }

    #[test]
    fn test_task_input_accepts_wire_shape() {
        let parsed: TaskInput = serde_json::from_str(
            r#"{
                "task_name": "Meds",
                "assigned_to": "00000000-0000-0000-0000-000000000001",
                "due_date": "2025-06-01T00:00:00Z",
                "status": "Pending"
            }"#,
        )
        .unwrap();
        assert!(parsed.task_id.is_none());
        assert_eq!(parsed.status, Some(TaskStatus::Pending));
    }

    #[test]
    fn test_unknown_status_is_rejected_at_the_wire() {
        let result = serde_json::from_str::<UpdateTaskStatusRequest>(r#"{"status": "Paused"}"#);
        assert!(result.is_err());
    }
}
