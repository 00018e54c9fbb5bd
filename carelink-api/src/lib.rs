//! Carelink API - REST/WebSocket API Layer
//!
//! This crate exposes the care-plan synchronization core over HTTP: Axum
//! REST routes for reads and mutations, and a WebSocket gateway for
//! real-time mutation and notification events. Reads flow through the
//! role-scoped read cache in carelink-storage; mutations run through the
//! service layer, which fans out notification intents and cache
//! invalidations after the store write commits.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod ws;

// Re-export commonly used types
pub use auth::{AuthContext, ROLE_HEADER, USER_ID_HEADER};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use events::{Outbound, Recipient, WsEvent};
pub use extractors::ApiJson;
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::{CarePlanService, NotificationDispatcher, NotificationService};
pub use state::AppState;
pub use telemetry::{init_telemetry, TelemetryConfig};
pub use types::*;
pub use ws::WsState;
