//! Service layer: mutation orchestration and notification delivery.
//!
//! Routes stay thin; these services own the transaction boundaries, the
//! notification-intent computation, the cache invalidation plan, and the
//! realtime pushes. Side effects (cache, notifications, push) run after the
//! primary store write commits and their failures are logged, never
//! surfaced - the store mutation's success is authoritative.

pub mod care_plans;
pub mod dispatcher;
pub mod notifications;

pub use care_plans::CarePlanService;
pub use dispatcher::NotificationDispatcher;
pub use notifications::NotificationService;
