//! Error Types for the Carelink API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! Dependency failures (cache, push channel) never reach this mapping: they
//! are caught and logged where they occur, because a secondary subsystem's
//! failure must not mask the authoritative store mutation's success.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use carelink_core::{CarelinkError, EntityType, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401, 403)
    // ========================================================================
    /// Request carries no usable identity
    Unauthenticated,

    /// Request is authenticated but lacks permission for the resource
    Forbidden,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// Requested care plan does not exist
    CarePlanNotFound,

    /// Requested task does not exist inside the named care plan
    TaskNotFound,

    /// Requested notification does not exist
    NotificationNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Concurrent modification detected (optimistic version mismatch)
    ConcurrentModification,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,

            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound
            | ErrorCode::CarePlanNotFound
            | ErrorCode::TaskNotFound
            | ErrorCode::NotificationNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ConcurrentModification => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "Authentication required",
            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::CarePlanNotFound => "Care plan not found",
            ErrorCode::TaskNotFound => "Task not found",
            ErrorCode::NotificationNotFound => "Notification not found",
            ErrorCode::ConcurrentModification => "Concurrent modification detected",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs and is
/// serialized consistently across REST and WebSocket surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an Unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    /// Create a Forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create a CarePlanNotFound error.
    pub fn care_plan_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CarePlanNotFound,
            format!("Care plan {} not found", id),
        )
    }

    /// Create a TaskNotFound error.
    pub fn task_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task {} not found", id))
    }

    /// Create a NotificationNotFound error.
    pub fn notification_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::NotificationNotFound,
            format!("Notification {} not found", id),
        )
    }

    /// Create a ConcurrentModification error.
    pub fn concurrent_modification(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConcurrentModification,
            format!("{} {} was modified by another request", entity_type, id),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
///
/// This allows ApiError to be returned directly from Axum handlers:
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::forbidden("Role caregiver may not delete care plans"))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

/// Convert from the core error taxonomy to an API error.
///
/// This conversion encodes the propagation policy: request-scoped failures
/// (validation, policy, not-found, version conflict) map to client-visible
/// status codes. Dependency errors are expected to be handled at the point
/// of occurrence; one arriving here indicates a missed catch and is logged
/// before degrading to 503.
impl From<CarelinkError> for ApiError {
    fn from(err: CarelinkError) -> Self {
        match err {
            CarelinkError::Validation(v) => ApiError::validation_failed(v.to_string()),
            CarelinkError::Policy(p) => ApiError::forbidden(p.to_string()),
            CarelinkError::Storage(StorageError::NotFound { entity_type, id }) => {
                match entity_type {
                    EntityType::CarePlan => ApiError::care_plan_not_found(id),
                    EntityType::Task => ApiError::task_not_found(id),
                    EntityType::Notification => ApiError::notification_not_found(id),
                }
            }
            CarelinkError::Storage(StorageError::Conflict { entity_type, id, .. }) => {
                ApiError::concurrent_modification(&entity_type.to_string(), id)
            }
            CarelinkError::Storage(StorageError::LockPoisoned) => {
                tracing::error!("Storage lock poisoned");
                ApiError::internal_error("Storage unavailable")
            }
            CarelinkError::Dependency(d) => {
                tracing::error!(error = %d, "Dependency error escaped its handler");
                ApiError::service_unavailable("A dependent subsystem is unavailable")
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Convert from uuid::Error to ApiError.
impl From<uuid::Error> for ApiError {
    fn from(err: uuid::Error) -> Self {
        ApiError::invalid_input(format!("Invalid UUID: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
