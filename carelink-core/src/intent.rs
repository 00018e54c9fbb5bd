//! Notification intents - the effects a mutation fans out.
//!
//! Mutations return their side effects as data instead of performing them
//! inline: each intent describes one notification to persist and push. The
//! dispatcher executes intents after the primary write commits, and its
//! failures never roll the write back. Keeping the list explicit lets tests
//! assert exactly which notifications a mutation implies.

use crate::{CarePlan, EntityRef, NotificationType, Task, UserId};
use serde::{Deserialize, Serialize};

/// An in-memory, not-yet-persisted description of a notification to create
/// as a side effect of a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationIntent {
    /// Recipient of the eventual notification.
    pub recipient: UserId,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_entity: EntityRef,
}

impl NotificationIntent {
    /// Owner-facing intent for a newly created plan.
    pub fn care_plan_added(plan: &CarePlan) -> Self {
        Self {
            recipient: plan.owner_user_id,
            message: format!("A new care plan '{}' was created for you", plan.title),
            notification_type: NotificationType::CarePlanAdded,
            related_entity: EntityRef::care_plan(plan.care_plan_id),
        }
    }

    /// Owner-facing intent for an updated plan.
    pub fn care_plan_updated(plan: &CarePlan) -> Self {
        Self {
            recipient: plan.owner_user_id,
            message: format!("Care plan '{}' was updated", plan.title),
            notification_type: NotificationType::CarePlanUpdated,
            related_entity: EntityRef::care_plan(plan.care_plan_id),
        }
    }

    /// Assignee-facing intent for a new or reassigned task.
    pub fn task_assigned(plan: &CarePlan, task: &Task) -> Self {
        Self {
            recipient: task.assigned_to,
            message: format!(
                "You have been assigned a task: {} (plan '{}')",
                task.task_name, plan.title
            ),
            notification_type: NotificationType::TaskAssigned,
            related_entity: EntityRef::task(task.task_id),
        }
    }

    /// Assignee-facing reminder for a task coming due.
    pub fn task_reminder(plan: &CarePlan, task: &Task) -> Self {
        Self {
            recipient: task.assigned_to,
            message: format!(
                "Task '{}' in plan '{}' is due {}",
                task.task_name,
                plan.title,
                task.due_date.format("%Y-%m-%d")
            ),
            notification_type: NotificationType::TaskReminder,
            related_entity: EntityRef::task(task.task_id),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
