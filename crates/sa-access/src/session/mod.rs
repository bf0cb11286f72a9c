//! Session Aggregate
//!
//! Per-identity store context and the manager that resolves it.

pub mod api;
pub mod context;
pub mod manager;

pub use api::{session_router, SessionState, StoreContextResponse, StoreSummary};
pub use context::{RoleState, StoreContext, StoreList};
pub use manager::SessionManager;
