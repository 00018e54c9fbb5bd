//! Error types for Carelink operations

use crate::{EntityType, Role};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("A care plan must contain at least one task")]
    EmptyTaskList,

    #[error("Field {field} is immutable once set")]
    ImmutableField { field: String },
}

/// Authorization failures from the access policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Role {role} may not {action}")]
    Forbidden { role: Role, action: String },
}

impl PolicyError {
    pub fn forbidden(role: Role, action: impl Into<String>) -> Self {
        PolicyError::Forbidden {
            role,
            action: action.into(),
        }
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Version conflict on {entity_type:?} {id}: expected {expected}, found {found}")]
    Conflict {
        entity_type: EntityType,
        id: Uuid,
        expected: u64,
        found: u64,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Secondary-subsystem failures (cache, push channel).
///
/// Never surfaced to API callers: the authoritative store mutation's success
/// must not be masked by a cache or push failure. Logged at the point of
/// occurrence instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Cache unavailable: {reason}")]
    CacheUnavailable { reason: String },

    #[error("Push channel unavailable: {reason}")]
    PushUnavailable { reason: String },

    #[error("Operation '{operation}' timed out")]
    Timeout { operation: String },
}

/// Master error type for all Carelink errors.
#[derive(Debug, Clone, Error)]
pub enum CarelinkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Dependency error: {0}")]
    Dependency(#[from] DependencyError),
}

/// Result type alias for Carelink operations.
pub type CarelinkResult<T> = Result<T, CarelinkError>;

// =============================================================================
// TESTS
// =============================================================================
