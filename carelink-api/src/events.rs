//! WebSocket event types.
//!
//! Two families share one wire enum:
//!
//! - Mutation events (`careplan:*`, `task:updated`) announce that something
//!   changed. Their payloads carry ids only - no privileged data - so they
//!   can be pushed without per-recipient filtering and clients decide
//!   whether to refetch. Any payload enrichment must re-introduce recipient
//!   filtering first.
//! - Notification events are named after their notification type and go to
//!   exactly one user's channel.
//!
//! The [`Outbound`] envelope pairs an event with its delivery scope; the
//! gateway filters on the scope per connection.

use carelink_core::{
    CarePlanId, EntityRef, Notification, NotificationId, NotificationType, TaskId, TaskStatus,
    UserId,
};
use serde::{Deserialize, Serialize};

/// Delivery scope for an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected client.
    Broadcast,
    /// Only the named user's connections.
    User(UserId),
}

/// An event paired with its delivery scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub event: WsEvent,
}

impl Outbound {
    /// Address an event to every connected client.
    pub fn broadcast(event: WsEvent) -> Self {
        Self {
            recipient: Recipient::Broadcast,
            event,
        }
    }

    /// Address an event to one user's channel.
    pub fn to_user(user_id: UserId, event: WsEvent) -> Self {
        Self {
            recipient: Recipient::User(user_id),
            event,
        }
    }
}

/// WebSocket event types for real-time updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsEvent {
    // ========================================================================
    // MUTATION EVENTS (broadcast; id-only payloads)
    // ========================================================================
    /// A care plan was created.
    #[serde(rename = "careplan:created")]
    CarePlanCreated { care_plan_id: CarePlanId },

    /// A care plan was updated.
    #[serde(rename = "careplan:updated")]
    CarePlanUpdated { care_plan_id: CarePlanId },

    /// A care plan was deleted.
    #[serde(rename = "careplan:deleted")]
    CarePlanDeleted { care_plan_id: CarePlanId },

    /// A task's status changed. Pushed to the plan owner's channel.
    #[serde(rename = "task:updated")]
    TaskUpdated {
        care_plan_id: CarePlanId,
        task_id: TaskId,
        status: TaskStatus,
    },

    // ========================================================================
    // NOTIFICATION EVENTS (per-recipient; named after the notification type)
    // ========================================================================
    /// A careplan_added notification was delivered.
    #[serde(rename = "careplan_added")]
    CarePlanAddedNotification {
        notification_id: NotificationId,
        message: String,
        related_entity: EntityRef,
    },

    /// A careplan_updated notification was delivered.
    #[serde(rename = "careplan_updated")]
    CarePlanUpdatedNotification {
        notification_id: NotificationId,
        message: String,
        related_entity: EntityRef,
    },

    /// A task_assigned notification was delivered.
    #[serde(rename = "task_assigned")]
    TaskAssignedNotification {
        notification_id: NotificationId,
        message: String,
        related_entity: EntityRef,
    },

    /// A task_reminder notification was delivered.
    #[serde(rename = "task_reminder")]
    TaskReminderNotification {
        notification_id: NotificationId,
        message: String,
        related_entity: EntityRef,
    },

    // ========================================================================
    // CONNECTION EVENTS
    // ========================================================================
    /// Client successfully connected to its channel.
    #[serde(rename = "connected")]
    Connected { user_id: UserId },

    /// An error occurred on the connection (e.g. the client lagged).
    #[serde(rename = "error")]
    Error { message: String },
}

impl WsEvent {
    /// Get the wire event name for logging/debugging.
    pub fn event_type(&self) -> &'static str {
        match self {
            WsEvent::CarePlanCreated { .. } => "careplan:created",
            WsEvent::CarePlanUpdated { .. } => "careplan:updated",
            WsEvent::CarePlanDeleted { .. } => "careplan:deleted",
            WsEvent::TaskUpdated { .. } => "task:updated",
            WsEvent::CarePlanAddedNotification { .. } => "careplan_added",
            WsEvent::CarePlanUpdatedNotification { .. } => "careplan_updated",
            WsEvent::TaskAssignedNotification { .. } => "task_assigned",
            WsEvent::TaskReminderNotification { .. } => "task_reminder",
            WsEvent::Connected { .. } => "connected",
            WsEvent::Error { .. } => "error",
        }
    }

    /// Build the per-recipient event for a persisted notification.
    pub fn from_notification(notification: &Notification) -> Self {
        let notification_id = notification.notification_id;
        let message = notification.message.clone();
        let related_entity = notification.related_entity.clone();
        match notification.notification_type {
            NotificationType::CarePlanAdded => WsEvent::CarePlanAddedNotification {
                notification_id,
                message,
                related_entity,
            },
            NotificationType::CarePlanUpdated => WsEvent::CarePlanUpdatedNotification {
                notification_id,
                message,
                related_entity,
            },
            NotificationType::TaskAssigned => WsEvent::TaskAssignedNotification {
                notification_id,
                message,
                related_entity,
            },
            NotificationType::TaskReminder => WsEvent::TaskReminderNotification {
                notification_id,
                message,
                related_entity,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::EntityIdType;

    #[test]
    fn test_mutation_event_wire_names() {
        let event = WsEvent::CarePlanCreated {
            care_plan_id: CarePlanId::now_v7(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "careplan:created");
        assert_eq!(event.event_type(), "careplan:created");
    }

    #[test]
    fn test_notification_event_name_follows_type() {
        let recipient = UserId::now_v7();
        let plan = CarePlanId::now_v7();
        let n = Notification::new(
            recipient,
            "You have been assigned a task",
            NotificationType::TaskAssigned,
            EntityRef::care_plan(plan),
        );
        let event = WsEvent::from_notification(&n);
        assert_eq!(event.event_type(), "task_assigned");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "task_assigned");
        assert_eq!(json["notification_id"], n.notification_id.to_string());
        assert_eq!(json["message"], n.message);
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = WsEvent::TaskUpdated {
            care_plan_id: CarePlanId::now_v7(),
            task_id: TaskId::now_v7(),
            status: TaskStatus::Completed,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: WsEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_outbound_scoping_helpers() {
        let user = UserId::now_v7();
        let event = WsEvent::Connected { user_id: user };

        let broadcast = Outbound::broadcast(event.clone());
        assert_eq!(broadcast.recipient, Recipient::Broadcast);

        let direct = Outbound::to_user(user, event);
        assert_eq!(direct.recipient, Recipient::User(user));
    }
}
