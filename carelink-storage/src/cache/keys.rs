//! Role-scoped cache key system.
//!
//! The key insight is that [`CacheKey`]'s private constructor fields make
//! cross-role cache access UNCOMPILABLE. You cannot construct a key without
//! explicitly providing the requesting user and role, so forgetting to scope
//! a cached view to its reader is not a bug that can be written.

use carelink_core::{CarePlanId, Role, UserId};

/// A cache key scoped to one requesting identity and role.
///
/// # Design
///
/// The private inner struct ensures a `CacheKey` can ONLY be constructed via
/// [`CacheKey::list`] or [`CacheKey::item`], both of which require the
/// `(user_id, role)` pair. The encoded form is the canonical string schema:
///
/// - `list:{user_id}:{role}`
/// - `item:{care_plan_id}:{user_id}:{role}`
///
/// Identity and role are encoded *into* the key rather than stored next to
/// it: omitting either would let one reader observe another's filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    inner: KeyInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyInner {
    /// Role-filtered list view for one reader.
    List { user_id: UserId, role: Role },
    /// Single-plan view for one reader.
    Item {
        care_plan_id: CarePlanId,
        user_id: UserId,
        role: Role,
    },
}

impl CacheKey {
    /// Key for the list view of `(user_id, role)`.
    pub fn list(user_id: UserId, role: Role) -> Self {
        Self {
            inner: KeyInner::List { user_id, role },
        }
    }

    /// Key for the detail view of one plan as seen by `(user_id, role)`.
    pub fn item(care_plan_id: CarePlanId, user_id: UserId, role: Role) -> Self {
        Self {
            inner: KeyInner::Item {
                care_plan_id,
                user_id,
                role,
            },
        }
    }

    /// The requesting user this key is scoped to.
    pub fn user_id(&self) -> UserId {
        match self.inner {
            KeyInner::List { user_id, .. } => user_id,
            KeyInner::Item { user_id, .. } => user_id,
        }
    }

    /// The role this key is scoped to.
    pub fn role(&self) -> Role {
        match self.inner {
            KeyInner::List { role, .. } => role,
            KeyInner::Item { role, .. } => role,
        }
    }

    /// Canonical string encoding used by cache backends.
    pub fn encode(&self) -> String {
        match &self.inner {
            KeyInner::List { user_id, role } => format!("list:{}:{}", user_id, role),
            KeyInner::Item {
                care_plan_id,
                user_id,
                role,
            } => format!("item:{}:{}:{}", care_plan_id, user_id, role),
        }
    }
}

/// A prefix over encoded cache keys, used for invalidation sweeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyPrefix(String);

impl CacheKeyPrefix {
    /// Every list view, regardless of reader. Covers the unscoped
    /// admin/family views and any assignee enumeration gap.
    pub fn all_lists() -> Self {
        Self("list:".to_string())
    }

    /// One reader's list views across roles.
    pub fn user_lists(user_id: UserId) -> Self {
        Self(format!("list:{}:", user_id))
    }

    /// Every cached detail view of one plan, for all readers and roles.
    pub fn item(care_plan_id: CarePlanId) -> Self {
        Self(format!("item:{}:", care_plan_id))
    }

    /// Whether an encoded key falls under this prefix.
    pub fn matches(&self, encoded_key: &str) -> bool {
        encoded_key.starts_with(&self.0)
    }

    /// The raw prefix string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKeyPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
