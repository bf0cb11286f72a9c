//! Authorization Service
//!
//! Permission evaluation against the role registry. Both entry points are
//! pure: no state, no errors, deny when the role is absent.

use crate::role::{Action, Resource, Role, RoleRegistry};

/// Typed permission check.
pub fn can(role: Option<Role>, action: Action, resource: Resource) -> bool {
    match role {
        Some(role) => RoleRegistry::grants_for(role).allows(action, resource),
        None => false,
    }
}

/// String permission check. The superadmin wildcard matches any name;
/// for every other role an unknown action or resource never matches.
pub fn has_permission(role: Option<Role>, action: &str, resource: &str) -> bool {
    let Some(role) = role else {
        return false;
    };
    let grants = RoleRegistry::grants_for(role);
    if grants.is_wildcard() {
        return true;
    }
    match (action.parse::<Action>(), resource.parse::<Resource>()) {
        (Ok(action), Ok(resource)) => grants.allows(action, resource),
        _ => false,
    }
}
