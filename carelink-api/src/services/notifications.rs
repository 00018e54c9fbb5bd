//! Notification read/ack service and the reminder sweep.

use std::sync::Arc;

use carelink_core::{
    can_access_notification, CarelinkResult, EntityIdType, EntityType, Notification,
    NotificationId, NotificationIntent, PolicyError, Role, StorageError, TaskStatus, UserId,
};
use carelink_storage::StorageTrait;
use chrono::{Duration, Utc};

use crate::auth::AuthContext;

use super::dispatcher::NotificationDispatcher;

/// Serves a user's notifications and executes the reminder sweep.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn StorageTrait>,
    dispatcher: NotificationDispatcher,
}

impl NotificationService {
    pub fn new(store: Arc<dyn StorageTrait>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// List notifications, newest first. Admins may read another user's
    /// feed via `for_user`; everyone else only their own.
    pub fn list(
        &self,
        auth: AuthContext,
        for_user: Option<UserId>,
    ) -> CarelinkResult<Vec<Notification>> {
        let target = match for_user {
            Some(target) if target != auth.user_id => {
                if auth.role != Role::Admin {
                    return Err(PolicyError::forbidden(
                        auth.role,
                        "read another user's notifications",
                    )
                    .into());
                }
                target
            }
            _ => auth.user_id,
        };
        self.store.notification_list_for_user(target)
    }

    /// Mark a notification read. Recipient or admin only; idempotent.
    pub fn mark_read(&self, auth: AuthContext, id: NotificationId) -> CarelinkResult<Notification> {
        let notification = self.load(id)?;
        if !can_access_notification(auth.role, auth.user_id, &notification) {
            return Err(PolicyError::forbidden(auth.role, "mark this notification read").into());
        }
        self.store.notification_mark_read(id)
    }

    /// Delete a notification. Recipient or admin only.
    pub fn delete(&self, auth: AuthContext, id: NotificationId) -> CarelinkResult<()> {
        let notification = self.load(id)?;
        if !can_access_notification(auth.role, auth.user_id, &notification) {
            return Err(PolicyError::forbidden(auth.role, "delete this notification").into());
        }
        self.store.notification_delete(id)
    }

    /// Derive and dispatch `task_reminder` notifications for every
    /// not-completed task due within the window. Admin only.
    ///
    /// Returns the number of reminders dispatched.
    pub async fn reminder_sweep(
        &self,
        auth: AuthContext,
        within: Duration,
    ) -> CarelinkResult<u64> {
        if auth.role != Role::Admin {
            return Err(PolicyError::forbidden(auth.role, "run the reminder sweep").into());
        }

        let horizon = Utc::now() + within;
        let mut intents = Vec::new();
        for plan in self.store.care_plan_list()? {
            for task in &plan.tasks {
                if task.status != TaskStatus::Completed && task.due_date <= horizon {
                    intents.push(NotificationIntent::task_reminder(&plan, task));
                }
            }
        }

        let delivered = self.dispatcher.dispatch(intents).await;
        Ok(delivered.len() as u64)
    }

    fn load(&self, id: NotificationId) -> CarelinkResult<Notification> {
        self.store.notification_get(id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::Notification,
                id: id.as_uuid(),
            }
            .into()
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
