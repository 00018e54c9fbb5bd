//! Notification dispatcher.
//!
//! Consumes the notification intents a mutation produced: persists each as a
//! Notification record, then pushes it to the recipient's realtime channel
//! as an event named after its type. Runs after the primary mutation has
//! committed; every failure here is logged and swallowed so a broken
//! notification pipeline can never roll back or mask a successful write.

use std::sync::Arc;

use carelink_core::{Notification, NotificationIntent};
use carelink_storage::StorageTrait;
use tracing::{debug, error};

use crate::events::WsEvent;
use crate::ws::WsState;

/// Persists and pushes derived notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn StorageTrait>,
    ws: Arc<WsState>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn StorageTrait>, ws: Arc<WsState>) -> Self {
        Self { store, ws }
    }

    /// Execute a batch of intents. Returns the notifications that were
    /// actually persisted (used by callers that report counts, and by
    /// tests asserting fan-out).
    pub async fn dispatch(&self, intents: Vec<NotificationIntent>) -> Vec<Notification> {
        let mut delivered = Vec::with_capacity(intents.len());

        for intent in intents {
            let notification = Notification::new(
                intent.recipient,
                intent.message,
                intent.notification_type,
                intent.related_entity,
            );

            if let Err(e) = self.store.notification_insert(&notification) {
                // At-least-once intent: log and move on, reconciliation is
                // a later read's problem. Skip the push so we never announce
                // a record that does not exist.
                error!(
                    recipient = %notification.user_id,
                    notification_type = %notification.notification_type,
                    error = %e,
                    "Failed to persist notification"
                );
                continue;
            }

            debug!(
                recipient = %notification.user_id,
                notification_type = %notification.notification_type,
                "Dispatching notification"
            );
            self.ws
                .send_to_user(notification.user_id, WsEvent::from_notification(&notification));
            delivered.push(notification);
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::{CarePlan, EntityIdType, Task, UserId};
    use carelink_storage::InMemoryStorage;
    use chrono::Utc;

    fn service() -> (Arc<InMemoryStorage>, Arc<WsState>, NotificationDispatcher) {
        let store = Arc::new(InMemoryStorage::new());
        let ws = Arc::new(WsState::new(16));
        let dispatcher =
            NotificationDispatcher::new(store.clone() as Arc<dyn StorageTrait>, ws.clone());
        (store, ws, dispatcher)
    }

    fn sample_plan() -> CarePlan {
        CarePlan::new(
            UserId::now_v7(),
            "Weekly Care",
            vec![Task::new("Meds", UserId::now_v7(), Utc::now())],
        )
    }

    #[tokio::test]
    async fn test_dispatch_persists_and_pushes() {
        let (store, ws, dispatcher) = service();
        let mut rx = ws.subscribe();

        let plan = sample_plan();
        let intents = vec![
            NotificationIntent::care_plan_added(&plan),
            NotificationIntent::task_assigned(&plan, &plan.tasks[0]),
        ];

        let delivered = dispatcher.dispatch(intents).await;
        assert_eq!(delivered.len(), 2);
        assert_eq!(store.notification_count(), 2);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.event.event_type(), "careplan_added");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.event.event_type(), "task_assigned");
    }

    #[tokio::test]
    async fn test_dispatch_empty_batch_is_a_no_op() {
        let (store, _ws, dispatcher) = service();
        let delivered = dispatcher.dispatch(Vec::new()).await;
        assert!(delivered.is_empty());
        assert_eq!(store.notification_count(), 0);
    }
}
