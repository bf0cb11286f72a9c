//! Role Aggregate
//!
//! Roles, actions, resources and the static grant table.

pub mod entity;
pub mod registry;

pub use entity::{Action, PermissionGrant, Resource, Role, UnknownName};
pub use registry::{Grants, RoleRegistry};
