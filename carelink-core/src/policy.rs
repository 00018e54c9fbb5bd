//! Access policy for care plans and notifications.
//!
//! Every authorization decision in the service routes through this module so
//! the rules stay auditable in one place. All functions are pure: they take
//! the actor's role and id plus the candidate entity and return a decision,
//! performing no I/O.
//!
//! Read visibility and write permission are separate axes:
//!
//! | Role          | List/read plans        | Write plans | Write task status   |
//! |---------------|------------------------|-------------|---------------------|
//! | user          | own plans only         | no          | no                  |
//! | caregiver     | plans with own task    | no          | own tasks only      |
//! | family_member | all                    | yes         | own tasks only      |
//! | admin         | all                    | yes         | all tasks           |

use crate::{CarePlan, Notification, Role, Task, UserId};

/// Roles permitted to create, update, and delete care plans.
pub const WRITE_ROLES: [Role; 2] = [Role::FamilyMember, Role::Admin];

/// Whether the role may create, update, or delete care plans.
pub fn can_write_care_plan(role: Role) -> bool {
    WRITE_ROLES.contains(&role)
}

/// Whether the actor may change the status of `task`.
///
/// Admins may always write; otherwise the actor must be the assignee.
/// Assignment alone is not enough for the care-recipient role: a `user` has
/// no task-write surface even when named as assignee.
pub fn can_update_task_status(role: Role, requesting_user: UserId, task: &Task) -> bool {
    match role {
        Role::Admin => true,
        Role::User => false,
        Role::Caregiver | Role::FamilyMember => task.assigned_to == requesting_user,
    }
}

/// Whether the actor may see `plan` at all.
///
/// Used identically for list filtering and single-plan reads, and encoded
/// into every cache key, so a cached view can never cross a role boundary.
pub fn can_view_care_plan(role: Role, requesting_user: UserId, plan: &CarePlan) -> bool {
    match role {
        Role::Admin | Role::FamilyMember => true,
        Role::Caregiver => plan.has_assignee(requesting_user),
        Role::User => plan.owner_user_id == requesting_user,
    }
}

/// Filter a plan set down to what the actor may see.
///
/// This is the single source of truth for list reads; the cached view is the
/// serialized output of this function for one `(user, role)` pair.
pub fn visible_care_plans(role: Role, requesting_user: UserId, plans: Vec<CarePlan>) -> Vec<CarePlan> {
    plans
        .into_iter()
        .filter(|plan| can_view_care_plan(role, requesting_user, plan))
        .collect()
}

/// Whether the actor may read, mark, or delete `notification`.
pub fn can_access_notification(
    role: Role,
    requesting_user: UserId,
    notification: &Notification,
) -> bool {
    role == Role::Admin || notification.user_id == requesting_user
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityIdType, EntityRef, NotificationType, Task};
    use chrono::Utc;

    fn plan_owned_by(owner: UserId, assignee: UserId) -> CarePlan {
        CarePlan::new(
            owner,
            "Weekly Care",
            vec![Task::new("Meds", assignee, Utc::now())],
        )
    }

    #[test]
    fn test_write_roles_table() {
        assert!(!can_write_care_plan(Role::User));
        assert!(!can_write_care_plan(Role::Caregiver));
        assert!(can_write_care_plan(Role::FamilyMember));
        assert!(can_write_care_plan(Role::Admin));
    }

    #[test]
    fn test_admin_and_family_see_everything() {
        let owner = UserId::now_v7();
        let assignee = UserId::now_v7();
        let stranger = UserId::now_v7();
        let plan = plan_owned_by(owner, assignee);

        assert!(can_view_care_plan(Role::Admin, stranger, &plan));
        assert!(can_view_care_plan(Role::FamilyMember, stranger, &plan));
    }

    #[test]
    fn test_caregiver_sees_only_assigned_plans() {
        let owner = UserId::now_v7();
        let assignee = UserId::now_v7();
        let other_caregiver = UserId::now_v7();
        let plan = plan_owned_by(owner, assignee);

        assert!(can_view_care_plan(Role::Caregiver, assignee, &plan));
        assert!(!can_view_care_plan(Role::Caregiver, other_caregiver, &plan));
    }

    #[test]
    fn test_user_sees_only_owned_plans() {
        let owner = UserId::now_v7();
        let assignee = UserId::now_v7();
        let other_user = UserId::now_v7();
        let plan = plan_owned_by(owner, assignee);

        assert!(can_view_care_plan(Role::User, owner, &plan));
        assert!(!can_view_care_plan(Role::User, other_user, &plan));
    }

    #[test]
    fn test_task_status_assignee_or_admin() {
        let assignee = UserId::now_v7();
        let stranger = UserId::now_v7();
        let task = Task::new("Meds", assignee, Utc::now());

        assert!(can_update_task_status(Role::Admin, stranger, &task));
        assert!(can_update_task_status(Role::Caregiver, assignee, &task));
        assert!(can_update_task_status(Role::FamilyMember, assignee, &task));
        assert!(!can_update_task_status(Role::Caregiver, stranger, &task));
    }

    #[test]
    fn test_user_role_never_writes_task_status() {
        // Even as the named assignee, the care-recipient role has no
        // task-write surface.
        let assignee = UserId::now_v7();
        let task = Task::new("Meds", assignee, Utc::now());
        assert!(!can_update_task_status(Role::User, assignee, &task));
    }

    #[test]
    fn test_notification_recipient_or_admin() {
        let recipient = UserId::now_v7();
        let stranger = UserId::now_v7();
        let n = Notification::new(
            recipient,
            "msg",
            NotificationType::TaskAssigned,
            EntityRef::care_plan(crate::CarePlanId::now_v7()),
        );

        assert!(can_access_notification(Role::Caregiver, recipient, &n));
        assert!(can_access_notification(Role::Admin, stranger, &n));
        assert!(!can_access_notification(Role::Caregiver, stranger, &n));
        assert!(!can_access_notification(Role::FamilyMember, stranger, &n));
    }

    #[test]
    fn test_visible_care_plans_matches_predicate() {
        let owner = UserId::now_v7();
        let assignee = UserId::now_v7();
        let plans = vec![
            plan_owned_by(owner, assignee),
            plan_owned_by(UserId::now_v7(), UserId::now_v7()),
            plan_owned_by(owner, UserId::now_v7()),
        ];

        for role in Role::ALL {
            for viewer in [owner, assignee, UserId::now_v7()] {
                let visible = visible_care_plans(role, viewer, plans.clone());
                let expected: Vec<_> = plans
                    .iter()
                    .filter(|p| can_view_care_plan(role, viewer, p))
                    .cloned()
                    .collect();
                assert_eq!(visible, expected);
            }
        }
    }
}
