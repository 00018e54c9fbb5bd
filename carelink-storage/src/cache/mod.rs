//! Read-through cache with role-scoped keys and explicit invalidation.
//!
//! Cached values are materialized, already-role-filtered read results: a
//! derived, disposable view over the store. Two rules keep the view safe:
//!
//! - Every key carries the requesting identity and role ([`CacheKey`] cannot
//!   be built without them), so one `(user, role)` pair can never observe
//!   another's cached view.
//! - Entries carry a TTL, so even a lost invalidation self-heals within the
//!   TTL window.
//!
//! Invalidation is prefix-based: a mutation sweeps all keys for the affected
//! care-plan id plus the per-user list keys of everyone whose view could
//! have contained it.

pub mod keys;
pub mod memory;
pub mod read_through;
pub mod traits;

pub use keys::{CacheKey, CacheKeyPrefix};
pub use memory::InMemoryCacheBackend;
pub use read_through::{CacheConfig, CacheRead, CachedReads};
pub use traits::{CacheBackend, CacheStats};
