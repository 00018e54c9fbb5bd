//! Care-plan mutation service and cached reads.
//!
//! Each public method is a transaction boundary: authorize, validate,
//! mutate the store, then run the side-effect tail (cache invalidation,
//! notification dispatch, realtime push). The store write is authoritative;
//! everything after it is fire-and-forget and bounded by a short timeout so
//! a slow cache can never hold an HTTP response hostage.

use std::sync::Arc;
use std::time::Duration;

use carelink_core::{
    can_update_task_status, can_view_care_plan, can_write_care_plan, policy, CarePlan, CarePlanId,
    CarelinkError, CarelinkResult, EntityIdType, EntityType, NotificationIntent, PolicyError,
    StorageError, Task, TaskId, TaskStatus, UserId, ValidationError,
};
use carelink_storage::{
    CacheBackend, CacheConfig, CacheKey, CacheKeyPrefix, CachedReads, StorageTrait,
};
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::events::{Outbound, WsEvent};
use crate::types::{CreateCarePlanRequest, TaskInput, UpdateCarePlanRequest};
use crate::ws::WsState;

use super::dispatcher::NotificationDispatcher;

/// Ceiling for any single cache or push side effect on the mutation path.
pub const SIDE_EFFECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Orchestrates care-plan reads and mutations.
#[derive(Clone)]
pub struct CarePlanService {
    store: Arc<dyn StorageTrait>,
    cache: Arc<dyn CacheBackend>,
    reads: CachedReads<dyn CacheBackend>,
    dispatcher: NotificationDispatcher,
    ws: Arc<WsState>,
    side_effect_timeout: Duration,
}

impl CarePlanService {
    pub fn new(
        store: Arc<dyn StorageTrait>,
        cache: Arc<dyn CacheBackend>,
        cache_config: CacheConfig,
        ws: Arc<WsState>,
    ) -> Self {
        let reads = CachedReads::new(Arc::clone(&cache), cache_config);
        let dispatcher = NotificationDispatcher::new(Arc::clone(&store), Arc::clone(&ws));
        Self {
            store,
            cache,
            reads,
            dispatcher,
            ws,
            side_effect_timeout: SIDE_EFFECT_TIMEOUT,
        }
    }

    /// Access the dispatcher (shared with the notification service).
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// List the care plans visible to the actor, through the read cache.
    ///
    /// The cached value is the already-role-filtered list; the `(user, role)`
    /// pair is part of the cache key, so the filter applies identically on
    /// hits and misses.
    pub async fn list(&self, auth: AuthContext) -> CarelinkResult<Vec<CarePlan>> {
        let key = CacheKey::list(auth.user_id, auth.role);
        let store = Arc::clone(&self.store);
        let read = self
            .reads
            .get_with(&key, || async move {
                let plans = store.care_plan_list()?;
                Ok(policy::visible_care_plans(auth.role, auth.user_id, plans))
            })
            .await?;
        Ok(read.into_value())
    }

    /// Fetch one plan through the read cache, re-applying the visibility rule.
    ///
    /// A plan that exists but is not visible fails with `Forbidden`, not
    /// `NotFound`: the list endpoint already reveals which plans exist to
    /// each role, and answering 404 here would leak existence inconsistently.
    pub async fn get(&self, auth: AuthContext, id: CarePlanId) -> CarelinkResult<CarePlan> {
        let key = CacheKey::item(id, auth.user_id, auth.role);
        let store = Arc::clone(&self.store);
        let read = self
            .reads
            .get_with(&key, || async move {
                let plan = store.care_plan_get(id)?.ok_or_else(|| plan_not_found(id))?;
                if !can_view_care_plan(auth.role, auth.user_id, &plan) {
                    return Err(PolicyError::forbidden(auth.role, "view this care plan").into());
                }
                Ok(plan)
            })
            .await?;
        Ok(read.into_value())
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Create a care plan. Returns the stored plan after fanning out
    /// `careplan_added`/`task_assigned` notifications and invalidating the
    /// affected cached views.
    pub async fn create(
        &self,
        auth: AuthContext,
        req: CreateCarePlanRequest,
    ) -> CarelinkResult<CarePlan> {
        if !can_write_care_plan(auth.role) {
            return Err(PolicyError::forbidden(auth.role, "create care plans").into());
        }
        if req.title.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "title".to_string(),
            }
            .into());
        }

        let tasks = build_tasks(req.tasks, None)?;
        let plan = CarePlan::new(req.owner_user_id, req.title, tasks);
        self.store.care_plan_insert(&plan)?;

        let mut intents = vec![NotificationIntent::care_plan_added(&plan)];
        intents.extend(
            plan.tasks
                .iter()
                .map(|task| NotificationIntent::task_assigned(&plan, task)),
        );

        let affected = affected_users(&plan, None);
        self.finish_mutation(
            plan.care_plan_id,
            &affected,
            intents,
            vec![Outbound::broadcast(WsEvent::CarePlanCreated {
                care_plan_id: plan.care_plan_id,
            })],
        )
        .await;

        Ok(plan)
    }

    /// Merge a patch into an existing plan. Omitted fields keep their prior
    /// values; a task set in the patch replaces the plan's task set, and the
    /// old/new diff decides which assignees get `task_assigned`.
    pub async fn update(
        &self,
        auth: AuthContext,
        id: CarePlanId,
        patch: UpdateCarePlanRequest,
    ) -> CarelinkResult<CarePlan> {
        if !can_write_care_plan(auth.role) {
            return Err(PolicyError::forbidden(auth.role, "update care plans").into());
        }
        if patch.owner_user_id.is_some() {
            return Err(ValidationError::ImmutableField {
                field: "owner_user_id".to_string(),
            }
            .into());
        }

        let existing = self.store.care_plan_get(id)?.ok_or_else(|| plan_not_found(id))?;

        let mut updated = existing.clone();
        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(ValidationError::RequiredFieldMissing {
                    field: "title".to_string(),
                }
                .into());
            }
            updated.title = title;
        }
        if let Some(task_inputs) = patch.tasks {
            updated.tasks = build_tasks(task_inputs, Some(&existing))?;
        }

        let mut intents = assignment_intents(&existing, &updated);
        intents.push(NotificationIntent::care_plan_updated(&updated));

        let stored = self
            .store
            .care_plan_replace(id, existing.version, updated)?;

        let affected = affected_users(&stored, Some(&existing));
        self.finish_mutation(
            id,
            &affected,
            intents,
            vec![Outbound::broadcast(WsEvent::CarePlanUpdated {
                care_plan_id: id,
            })],
        )
        .await;

        Ok(stored)
    }

    /// Hard-delete a plan. Outstanding notifications keep their now-dangling
    /// reference; consumers render those as "no longer available".
    pub async fn delete(&self, auth: AuthContext, id: CarePlanId) -> CarelinkResult<()> {
        if !can_write_care_plan(auth.role) {
            return Err(PolicyError::forbidden(auth.role, "delete care plans").into());
        }

        let existing = self.store.care_plan_get(id)?.ok_or_else(|| plan_not_found(id))?;
        self.store.care_plan_delete(id)?;

        let affected = affected_users(&existing, None);
        self.finish_mutation(
            id,
            &affected,
            Vec::new(),
            vec![Outbound::broadcast(WsEvent::CarePlanDeleted {
                care_plan_id: id,
            })],
        )
        .await;

        Ok(())
    }

    /// Change one task's status, persisting the whole plan document.
    ///
    /// Authorized for the assignee or an admin. The optimistic version check
    /// closes the lost-update race between concurrent read-modify-write
    /// sequences: on a version conflict the read-modify-write is retried
    /// once, then the conflict is surfaced.
    pub async fn update_task_status(
        &self,
        auth: AuthContext,
        id: CarePlanId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> CarelinkResult<Task> {
        let mut retried = false;
        let stored = loop {
            let plan = self.store.care_plan_get(id)?.ok_or_else(|| plan_not_found(id))?;
            let task = plan.task(task_id).ok_or_else(|| task_not_found(task_id))?;
            if !can_update_task_status(auth.role, auth.user_id, task) {
                return Err(
                    PolicyError::forbidden(auth.role, "update this task's status").into(),
                );
            }

            let mut updated = plan.clone();
            if let Some(t) = updated.task_mut(task_id) {
                t.status = status;
            }

            match self.store.care_plan_replace(id, plan.version, updated) {
                Ok(stored) => break stored,
                Err(CarelinkError::Storage(StorageError::Conflict { .. })) if !retried => {
                    debug!(care_plan_id = %id, "Version conflict, retrying status write");
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        };

        let task = stored
            .task(task_id)
            .cloned()
            .ok_or_else(|| task_not_found(task_id))?;

        let affected = affected_users(&stored, None);
        self.finish_mutation(
            id,
            &affected,
            Vec::new(),
            vec![Outbound::to_user(
                stored.owner_user_id,
                WsEvent::TaskUpdated {
                    care_plan_id: id,
                    task_id,
                    status: task.status,
                },
            )],
        )
        .await;

        Ok(task)
    }

    // ========================================================================
    // SIDE-EFFECT TAIL
    // ========================================================================

    /// Run the post-commit tail: invalidate caches, dispatch notification
    /// intents, push realtime events. Nothing here can fail the mutation.
    async fn finish_mutation(
        &self,
        plan_id: CarePlanId,
        affected_users: &[UserId],
        intents: Vec<NotificationIntent>,
        events: Vec<Outbound>,
    ) {
        self.invalidate_after_write(plan_id, affected_users).await;
        self.dispatcher.dispatch(intents).await;
        for outbound in events {
            self.ws.send(outbound);
        }
    }

    /// Prefix-invalidate every cached view the write could have staled:
    /// the plan's detail entries, each affected user's list entries, and
    /// the whole list namespace (which covers the unscoped admin and
    /// family_member views). Failures degrade to TTL-bounded staleness.
    async fn invalidate_after_write(&self, plan_id: CarePlanId, affected_users: &[UserId]) {
        let mut prefixes = vec![CacheKeyPrefix::item(plan_id)];
        prefixes.extend(affected_users.iter().map(|u| CacheKeyPrefix::user_lists(*u)));
        prefixes.push(CacheKeyPrefix::all_lists());

        for prefix in prefixes {
            match tokio::time::timeout(
                self.side_effect_timeout,
                self.cache.invalidate_prefix(&prefix),
            )
            .await
            {
                Ok(Ok(removed)) => {
                    debug!(prefix = %prefix, removed, "Invalidated cache entries");
                }
                Ok(Err(e)) => {
                    warn!(prefix = %prefix, error = %e, "Cache invalidation failed");
                }
                Err(_) => {
                    warn!(prefix = %prefix, "Cache invalidation timed out");
                }
            }
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn plan_not_found(id: CarePlanId) -> CarelinkError {
    StorageError::NotFound {
        entity_type: EntityType::CarePlan,
        id: id.as_uuid(),
    }
    .into()
}

fn task_not_found(id: TaskId) -> CarelinkError {
    StorageError::NotFound {
        entity_type: EntityType::Task,
        id: id.as_uuid(),
    }
    .into()
}

/// Materialize the incoming task list, validating names and carrying ids
/// and statuses over from the existing plan where the input references one
/// of its tasks.
fn build_tasks(inputs: Vec<TaskInput>, existing: Option<&CarePlan>) -> CarelinkResult<Vec<Task>> {
    if inputs.is_empty() {
        return Err(ValidationError::EmptyTaskList.into());
    }

    let mut tasks = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input.task_name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "task_name".to_string(),
            }
            .into());
        }

        let prior = input
            .task_id
            .and_then(|tid| existing.and_then(|plan| plan.task(tid)));

        let task_id = match (input.task_id, prior) {
            (Some(tid), Some(_)) => tid,
            // An unknown id in the patch is treated as a new task.
            _ => input.task_id.unwrap_or_else(TaskId::now_v7),
        };
        let status = input
            .status
            .or(prior.map(|t| t.status))
            .unwrap_or(TaskStatus::Pending);

        tasks.push(Task {
            task_id,
            task_name: input.task_name,
            assigned_to: input.assigned_to,
            due_date: input.due_date,
            status,
        });
    }
    Ok(tasks)
}

/// Intents implied by a task-set replacement: newly introduced tasks and
/// tasks whose assignee changed notify the (new) assignee.
fn assignment_intents(old: &CarePlan, new: &CarePlan) -> Vec<NotificationIntent> {
    new.tasks
        .iter()
        .filter(|task| match old.task(task.task_id) {
            None => true,
            Some(prev) => prev.assigned_to != task.assigned_to,
        })
        .map(|task| NotificationIntent::task_assigned(new, task))
        .collect()
}

/// Everyone whose cached list view could contain the plan: the owner and
/// every current (and, for updates, previous) task assignee.
fn affected_users(plan: &CarePlan, previous: Option<&CarePlan>) -> Vec<UserId> {
    let mut users = vec![plan.owner_user_id];
    for assignee in plan.assignees() {
        if !users.contains(&assignee) {
            users.push(assignee);
        }
    }
    if let Some(prev) = previous {
        for assignee in prev.assignees() {
            if !users.contains(&assignee) {
                users.push(assignee);
            }
        }
    }
    users
}

// ============================================================================
// TESTS
// ============================================================================
