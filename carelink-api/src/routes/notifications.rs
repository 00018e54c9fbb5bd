//! Notification REST route handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use carelink_core::{Notification, NotificationId};
use chrono::Duration;

use crate::{
    auth::AuthContext,
    error::{ApiError, ApiResult},
    extractors::ApiJson,
    state::AppState,
    types::{DeleteResponse, ListNotificationsParams, ReminderSweepRequest, ReminderSweepResponse},
};

/// Default reminder window when the sweep request names none.
const DEFAULT_REMINDER_WINDOW_HOURS: u64 = 24;

/// GET /api/v1/notifications - List the caller's notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    params(("user_id" = Option<String>, Query, description = "Admin-only: another user's feed")),
    responses(
        (status = 200, description = "Notifications, newest first", body = [Notification]),
        (status = 401, description = "Unauthenticated", body = ApiError),
        (status = 403, description = "Non-admin asked for another user's feed", body = ApiError),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(params): Query<ListNotificationsParams>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state.notifications.list(auth, params.user_id)?;
    Ok(Json(notifications))
}

/// PUT /api/v1/notifications/{id}/read - Mark a notification read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "The notification (idempotent)", body = Notification),
        (status = 403, description = "Caller is neither recipient nor admin", body = ApiError),
        (status = 404, description = "No such notification", body = ApiError),
    )
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<NotificationId>,
) -> ApiResult<Json<Notification>> {
    let notification = state.notifications.mark_read(auth, id)?;
    Ok(Json(notification))
}

/// DELETE /api/v1/notifications/{id} - Delete a notification
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    tag = "Notifications",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 403, description = "Caller is neither recipient nor admin", body = ApiError),
        (status = 404, description = "No such notification", body = ApiError),
    )
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<NotificationId>,
) -> ApiResult<Json<DeleteResponse>> {
    state.notifications.delete(auth, id)?;
    Ok(Json(DeleteResponse::ok()))
}

/// POST /api/v1/notifications/reminders - Dispatch task_reminder notifications
#[utoipa::path(
    post,
    path = "/api/v1/notifications/reminders",
    tag = "Notifications",
    request_body = ReminderSweepRequest,
    responses(
        (status = 200, description = "Reminders dispatched", body = ReminderSweepResponse),
        (status = 403, description = "Admin only", body = ApiError),
    )
)]
pub async fn run_reminder_sweep(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<ReminderSweepRequest>,
) -> ApiResult<Json<ReminderSweepResponse>> {
    let hours = req.within_hours.unwrap_or(DEFAULT_REMINDER_WINDOW_HOURS);
    let dispatched = state
        .notifications
        .reminder_sweep(auth, Duration::hours(hours as i64))
        .await?;
    Ok(Json(ReminderSweepResponse { dispatched }))
}
