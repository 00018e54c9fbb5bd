//! OpenAPI document aggregation.

use utoipa::OpenApi;

/// Aggregated OpenAPI documentation for the Carelink API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carelink API",
        description = "Care-plan synchronization and notification delivery"
    ),
    paths(
        crate::routes::health::health,
        crate::routes::care_plans::create_care_plan,
        crate::routes::care_plans::list_care_plans,
        crate::routes::care_plans::get_care_plan_by_id,
        crate::routes::care_plans::update_care_plan,
        crate::routes::care_plans::delete_care_plan,
        crate::routes::care_plans::update_task_status,
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::mark_notification_read,
        crate::routes::notifications::delete_notification,
        crate::routes::notifications::run_reminder_sweep,
    ),
    components(schemas(
        carelink_core::CarePlan,
        carelink_core::Task,
        carelink_core::Notification,
        carelink_core::EntityRef,
        carelink_core::Role,
        carelink_core::TaskStatus,
        carelink_core::NotificationType,
        carelink_core::EntityType,
        crate::types::CreateCarePlanRequest,
        crate::types::TaskInput,
        crate::types::UpdateCarePlanRequest,
        crate::types::UpdateTaskStatusRequest,
        crate::types::ListNotificationsParams,
        crate::types::ReminderSweepRequest,
        crate::types::ReminderSweepResponse,
        crate::types::DeleteResponse,
        crate::types::HealthResponse,
        crate::error::ApiError,
        crate::error::ErrorCode,
    )),
    tags(
        (name = "CarePlans", description = "Care-plan reads and mutations"),
        (name = "Notifications", description = "Derived notification feed"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
