//! Access Aggregate
//!
//! Permission guard and the endpoints exposing its decisions.

pub mod api;
pub mod guard;

pub use api::access_router;
pub use guard::{DecisionKind, GuardDecision, PermissionGuard, View};
