//! Care-plan REST route handlers.
//!
//! Handlers stay thin: extract identity, delegate to the mutation service,
//! map the result to a status code. Broadcasting and cache invalidation
//! happen inside the service after the store write commits.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use carelink_core::{CarePlan, CarePlanId, Task, TaskId};

use crate::{
    auth::AuthContext,
    error::{ApiError, ApiResult},
    extractors::ApiJson,
    state::AppState,
    types::{CreateCarePlanRequest, DeleteResponse, UpdateCarePlanRequest, UpdateTaskStatusRequest},
};

/// POST /api/v1/care-plans - Create a new care plan
#[utoipa::path(
    post,
    path = "/api/v1/care-plans",
    tag = "CarePlans",
    request_body = CreateCarePlanRequest,
    responses(
        (status = 201, description = "Care plan created", body = CarePlan),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthenticated", body = ApiError),
        (status = 403, description = "Role may not create care plans", body = ApiError),
    )
)]
pub async fn create_care_plan(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateCarePlanRequest>,
) -> ApiResult<impl IntoResponse> {
    let plan = state.care_plans.create(auth, req).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/v1/care-plans - List care plans visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/care-plans",
    tag = "CarePlans",
    responses(
        (status = 200, description = "Role-filtered care plans", body = [CarePlan]),
        (status = 401, description = "Unauthenticated", body = ApiError),
    )
)]
pub async fn list_care_plans(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<CarePlan>>> {
    let plans = state.care_plans.list(auth).await?;
    Ok(Json(plans))
}

/// GET /api/v1/care-plans/{id} - Fetch one care plan
#[utoipa::path(
    get,
    path = "/api/v1/care-plans/{id}",
    tag = "CarePlans",
    params(("id" = String, Path, description = "Care plan id")),
    responses(
        (status = 200, description = "The care plan", body = CarePlan),
        (status = 403, description = "Plan exists but is not visible to the caller", body = ApiError),
        (status = 404, description = "No such care plan", body = ApiError),
    )
)]
pub async fn get_care_plan_by_id(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<CarePlanId>,
) -> ApiResult<Json<CarePlan>> {
    let plan = state.care_plans.get(auth, id).await?;
    Ok(Json(plan))
}

/// PUT /api/v1/care-plans/{id} - Merge a patch into an existing plan
#[utoipa::path(
    put,
    path = "/api/v1/care-plans/{id}",
    tag = "CarePlans",
    params(("id" = String, Path, description = "Care plan id")),
    request_body = UpdateCarePlanRequest,
    responses(
        (status = 200, description = "The updated care plan", body = CarePlan),
        (status = 400, description = "Invalid patch", body = ApiError),
        (status = 403, description = "Role may not update care plans", body = ApiError),
        (status = 404, description = "No such care plan", body = ApiError),
        (status = 409, description = "Concurrent modification", body = ApiError),
    )
)]
pub async fn update_care_plan(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<CarePlanId>,
    ApiJson(patch): ApiJson<UpdateCarePlanRequest>,
) -> ApiResult<Json<CarePlan>> {
    let plan = state.care_plans.update(auth, id, patch).await?;
    Ok(Json(plan))
}

/// DELETE /api/v1/care-plans/{id} - Hard-delete a care plan
#[utoipa::path(
    delete,
    path = "/api/v1/care-plans/{id}",
    tag = "CarePlans",
    params(("id" = String, Path, description = "Care plan id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 403, description = "Role may not delete care plans", body = ApiError),
        (status = 404, description = "No such care plan", body = ApiError),
    )
)]
pub async fn delete_care_plan(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<CarePlanId>,
) -> ApiResult<Json<DeleteResponse>> {
    state.care_plans.delete(auth, id).await?;
    Ok(Json(DeleteResponse::ok()))
}

/// PUT /api/v1/care-plans/{id}/tasks/{task_id}/status - Change a task's status
#[utoipa::path(
    put,
    path = "/api/v1/care-plans/{id}/tasks/{task_id}/status",
    tag = "CarePlans",
    params(
        ("id" = String, Path, description = "Care plan id"),
        ("task_id" = String, Path, description = "Task id"),
    ),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "The updated task", body = Task),
        (status = 400, description = "Unknown status value", body = ApiError),
        (status = 403, description = "Caller is neither assignee nor admin", body = ApiError),
        (status = 404, description = "No such plan or task", body = ApiError),
        (status = 409, description = "Concurrent modification", body = ApiError),
    )
)]
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((id, task_id)): Path<(CarePlanId, TaskId)>,
    ApiJson(req): ApiJson<UpdateTaskStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .care_plans
        .update_task_status(auth, id, task_id, req.status)
        .await?;
    Ok(Json(task))
}
