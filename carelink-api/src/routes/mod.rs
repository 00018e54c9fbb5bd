//! Axum router assembly.

pub mod care_plans;
pub mod health;
pub mod notifications;

use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;
use crate::ws;

/// Build the full API router with CORS and request tracing layers.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/v1/care-plans",
            post(care_plans::create_care_plan).get(care_plans::list_care_plans),
        )
        .route(
            "/api/v1/care-plans/:id",
            get(care_plans::get_care_plan_by_id)
                .put(care_plans::update_care_plan)
                .delete(care_plans::delete_care_plan),
        )
        .route(
            "/api/v1/care-plans/:id/tasks/:task_id/status",
            put(care_plans::update_task_status),
        )
        .route(
            "/api/v1/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/v1/notifications/reminders",
            post(notifications::run_reminder_sweep),
        )
        .route(
            "/api/v1/notifications/:id/read",
            put(notifications::mark_notification_read),
        )
        .route(
            "/api/v1/notifications/:id",
            delete(notifications::delete_notification),
        )
        .route("/api/v1/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}

/// Permissive CORS in development (no configured origins), otherwise the
/// configured origin allowlist.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
