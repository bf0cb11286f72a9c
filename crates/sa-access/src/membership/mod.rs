//! Membership Aggregate
//!
//! Store memberships and the team administration API.

pub mod api;
pub mod entity;
pub mod repository;

pub use api::{team_router, TeamState};
pub use entity::{resolve_role, Membership, MembershipStatus};
pub use repository::MembershipRepository;
