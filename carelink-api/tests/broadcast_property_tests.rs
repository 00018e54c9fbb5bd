//! Realtime Push Tests
//!
//! Asserts the push-event surface: mutation events are broadcast with
//! id-only payloads, `task:updated` targets the plan owner's channel, and
//! notification events target exactly their recipient.

mod support;

use std::sync::Arc;

use carelink_api::{AppState, Recipient, UpdateCarePlanRequest, WsState};
use carelink_api::types::{CreateCarePlanRequest, TaskInput};
use carelink_core::{Role, TaskStatus};
use carelink_storage::{CacheBackend, CacheConfig, StorageTrait};
use carelink_test_utils::{FixtureUsers, InMemoryCacheBackend, InMemoryStorage};
use chrono::Utc;
use tokio::sync::broadcast::Receiver;

fn state_with_ws() -> (Arc<WsState>, AppState) {
    let store = Arc::new(InMemoryStorage::new());
    let cache = Arc::new(InMemoryCacheBackend::default());
    let ws = Arc::new(WsState::new(64));
    let app = AppState::new(
        store as Arc<dyn StorageTrait>,
        cache as Arc<dyn CacheBackend>,
        ws.clone(),
        CacheConfig::default(),
    );
    (ws, app)
}

fn drain(rx: &mut Receiver<carelink_api::Outbound>) -> Vec<carelink_api::Outbound> {
    let mut events = Vec::new();
    while let Ok(outbound) = rx.try_recv() {
        events.push(outbound);
    }
    events
}

fn create_request(users: &FixtureUsers) -> CreateCarePlanRequest {
    CreateCarePlanRequest {
        owner_user_id: users.owner,
        title: "Weekly Care".to_string(),
        tasks: vec![TaskInput {
            task_id: None,
            task_name: "Meds".to_string(),
            assigned_to: users.caregiver_one,
            due_date: Utc::now() + chrono::Duration::days(1),
            status: None,
        }],
    }
}

#[tokio::test]
async fn create_broadcasts_mutation_event_and_targets_notifications() {
    let (ws, app) = state_with_ws();
    let users = FixtureUsers::new();
    let mut rx = ws.subscribe();

    let plan = app
        .care_plans
        .create(support::auth(users.family_member, Role::FamilyMember), create_request(&users))
        .await
        .unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 3);

    // Per-recipient notification events first (owner, then assignee).
    assert_eq!(events[0].recipient, Recipient::User(users.owner));
    assert_eq!(events[0].event.event_type(), "careplan_added");
    assert_eq!(events[1].recipient, Recipient::User(users.caregiver_one));
    assert_eq!(events[1].event.event_type(), "task_assigned");

    // Then the unfiltered mutation broadcast with an id-only payload.
    assert_eq!(events[2].recipient, Recipient::Broadcast);
    assert_eq!(events[2].event.event_type(), "careplan:created");
    let payload = serde_json::to_value(&events[2].event).unwrap();
    assert_eq!(payload["care_plan_id"], plan.care_plan_id.to_string());
    assert!(payload.get("title").is_none());
}

#[tokio::test]
async fn update_and_delete_broadcast_plan_ids() {
    let (ws, app) = state_with_ws();
    let users = FixtureUsers::new();
    let family = support::auth(users.family_member, Role::FamilyMember);
    let plan = app.care_plans.create(family, create_request(&users)).await.unwrap();

    let mut rx = ws.subscribe();
    app.care_plans
        .update(
            family,
            plan.care_plan_id,
            UpdateCarePlanRequest {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.care_plans.delete(family, plan.care_plan_id).await.unwrap();

    let events = drain(&mut rx);
    let broadcasts: Vec<_> = events
        .iter()
        .filter(|o| o.recipient == Recipient::Broadcast)
        .collect();
    assert_eq!(broadcasts.len(), 2);
    assert_eq!(broadcasts[0].event.event_type(), "careplan:updated");
    assert_eq!(broadcasts[1].event.event_type(), "careplan:deleted");
}

#[tokio::test]
async fn task_status_event_targets_the_owner_channel() {
    let (ws, app) = state_with_ws();
    let users = FixtureUsers::new();
    let plan = app
        .care_plans
        .create(support::auth(users.family_member, Role::FamilyMember), create_request(&users))
        .await
        .unwrap();

    let mut rx = ws.subscribe();
    app.care_plans
        .update_task_status(
            support::auth(users.caregiver_one, Role::Caregiver),
            plan.care_plan_id,
            plan.tasks[0].task_id,
            TaskStatus::Completed,
        )
        .await
        .unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient, Recipient::User(users.owner));
    assert_eq!(events[0].event.event_type(), "task:updated");

    let payload = serde_json::to_value(&events[0].event).unwrap();
    assert_eq!(payload["care_plan_id"], plan.care_plan_id.to_string());
    assert_eq!(payload["task_id"], plan.tasks[0].task_id.to_string());
    assert_eq!(payload["status"], "Completed");
}

#[tokio::test]
async fn reminder_sweep_pushes_to_each_assignee() {
    let (ws, app) = state_with_ws();
    let users = FixtureUsers::new();
    let mut req = create_request(&users);
    req.tasks.push(TaskInput {
        task_id: None,
        task_name: "Walk".to_string(),
        assigned_to: users.caregiver_two,
        due_date: Utc::now() + chrono::Duration::hours(2),
        status: None,
    });
    app.care_plans
        .create(support::auth(users.family_member, Role::FamilyMember), req)
        .await
        .unwrap();

    let mut rx = ws.subscribe();
    let dispatched = app
        .notifications
        .reminder_sweep(
            support::auth(users.admin, Role::Admin),
            chrono::Duration::hours(48),
        )
        .await
        .unwrap();
    assert_eq!(dispatched, 2);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    for event in &events {
        assert_eq!(event.event.event_type(), "task_reminder");
        assert!(matches!(event.recipient, Recipient::User(_)));
    }
}
