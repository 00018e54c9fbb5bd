//! Identity types for Carelink entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Common behavior for strongly-typed entity IDs.
///
/// Each entity family gets its own newtype over [`Uuid`] so that a task ID
/// can never be passed where a care-plan ID is expected.
pub trait EntityIdType: Copy + Eq + std::hash::Hash {
    /// Generate a fresh timestamp-sortable ID.
    fn now_v7() -> Self;

    /// Wrap an existing UUID.
    fn from_uuid(id: Uuid) -> Self;

    /// Access the underlying UUID.
    fn as_uuid(&self) -> Uuid;
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $name(Uuid);

        impl EntityIdType for $name {
            fn now_v7() -> Self {
                Self(Uuid::now_v7())
            }

            fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id! {
    /// Identifier of a care plan document.
    CarePlanId
}

entity_id! {
    /// Identifier of a task within a care plan.
    TaskId
}

entity_id! {
    /// Identifier of a notification record.
    NotificationId
}

entity_id! {
    /// Identifier of a user. Issued by the authentication collaborator;
    /// carelink never mints these except in tests.
    UserId
}
