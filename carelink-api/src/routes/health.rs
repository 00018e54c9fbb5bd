//! Liveness route.

use axum::Json;

use crate::types::HealthResponse;

/// GET /health - Liveness probe, no authentication required.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
