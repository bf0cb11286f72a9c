//! Role, Action and Resource
//!
//! Closed vocabularies of the access-control model. Roles are lookup keys
//! into the registry and are never stored as entities of their own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Authorization level a member holds within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Unrestricted access to every resource
    Superadmin,
    Owner,
    Moderator,
    Editor,
    Shipper,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Superadmin,
        Role::Owner,
        Role::Moderator,
        Role::Editor,
        Role::Shipper,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Owner => "owner",
            Role::Moderator => "moderator",
            Role::Editor => "editor",
            Role::Shipper => "shipper",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role may be handed out through team administration
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Role::Superadmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role, action or resource name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownName {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownName::new("role", s))
    }
}

/// Operation category applied to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    /// Create and update
    Write,
    Delete,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Read, Action::Write, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    /// `create` and `update` are accepted as spellings of `write`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" | "create" | "update" => Ok(Action::Write),
            "delete" => Ok(Action::Delete),
            _ => Err(UnknownName::new("action", s)),
        }
    }
}

/// Catalog domain subject to access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Products,
    Categories,
    Brands,
    Orders,
    Reviews,
    Users,
    Addresses,
    Neighborhoods,
    Dashboard,
    Colors,
    Sizes,
    Tags,
    Slides,
    Stores,
}

impl Resource {
    pub const ALL: [Resource; 14] = [
        Resource::Products,
        Resource::Categories,
        Resource::Brands,
        Resource::Orders,
        Resource::Reviews,
        Resource::Users,
        Resource::Addresses,
        Resource::Neighborhoods,
        Resource::Dashboard,
        Resource::Colors,
        Resource::Sizes,
        Resource::Tags,
        Resource::Slides,
        Resource::Stores,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Brands => "brands",
            Resource::Orders => "orders",
            Resource::Reviews => "reviews",
            Resource::Users => "users",
            Resource::Addresses => "addresses",
            Resource::Neighborhoods => "neighborhoods",
            Resource::Dashboard => "dashboard",
            Resource::Colors => "colors",
            Resource::Sizes => "sizes",
            Resource::Tags => "tags",
            Resource::Slides => "slides",
            Resource::Stores => "stores",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|resource| resource.as_str() == s)
            .ok_or_else(|| UnknownName::new("resource", s))
    }
}

/// A single `(resource, action)` grant.
///
/// Displays as `"resource:action"`, the form used in API payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionGrant {
    pub resource: Resource,
    pub action: Action,
}

impl PermissionGrant {
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl fmt::Display for PermissionGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

impl FromStr for PermissionGrant {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .split_once(':')
            .ok_or_else(|| UnknownName::new("permission", s))?;
        Ok(Self::new(resource.parse()?, action.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_create_and_update_normalise_to_write() {
        assert_eq!("create".parse::<Action>().unwrap(), Action::Write);
        assert_eq!("update".parse::<Action>().unwrap(), Action::Write);
        assert_eq!("write".parse::<Action>().unwrap(), Action::Write);
        assert!("publish".parse::<Action>().is_err());
    }

    #[test]
    fn test_resource_names_are_case_sensitive() {
        assert_eq!("orders".parse::<Resource>().unwrap(), Resource::Orders);
        assert!("Orders".parse::<Resource>().is_err());
        assert!("invoices".parse::<Resource>().is_err());
    }

    #[test]
    fn test_permission_grant_string_form() {
        let grant = PermissionGrant::new(Resource::Orders, Action::Write);
        assert_eq!(grant.to_string(), "orders:write");
        assert_eq!("stores:update".parse::<PermissionGrant>().unwrap(),
            PermissionGrant::new(Resource::Stores, Action::Write));
        assert!("orders".parse::<PermissionGrant>().is_err());
    }

    #[test]
    fn test_superadmin_is_not_assignable() {
        assert!(!Role::Superadmin.is_assignable());
        assert!(Role::Owner.is_assignable());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Shipper).unwrap(), "\"shipper\"");
        let resource: Resource = serde_json::from_str("\"neighborhoods\"").unwrap();
        assert_eq!(resource, Resource::Neighborhoods);
    }
}
