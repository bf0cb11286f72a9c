//! Role Registry
//!
//! Static policy table mapping each role to the grants it carries.

use std::collections::{BTreeMap, BTreeSet};

use super::entity::{Action, PermissionGrant, Resource, Role};

use Action::{Delete, Read, Write};

/// Grants held by a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grants {
    /// Every action on every resource
    All,
    Scoped(BTreeMap<Resource, BTreeSet<Action>>),
}

impl Grants {
    fn scoped(entries: &[(Resource, &[Action])]) -> Self {
        let mut map: BTreeMap<Resource, BTreeSet<Action>> = BTreeMap::new();
        for (resource, actions) in entries {
            map.entry(*resource).or_default().extend(actions.iter().copied());
        }
        Grants::Scoped(map)
    }

    pub fn allows(&self, action: Action, resource: Resource) -> bool {
        match self {
            Grants::All => true,
            Grants::Scoped(map) => map
                .get(&resource)
                .is_some_and(|actions| actions.contains(&action)),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Grants::All)
    }

    /// Flatten to individual grants; empty for the wildcard
    pub fn grants(&self) -> Vec<PermissionGrant> {
        match self {
            Grants::All => Vec::new(),
            Grants::Scoped(map) => map
                .iter()
                .flat_map(|(resource, actions)| {
                    actions.iter().map(move |action| PermissionGrant::new(*resource, *action))
                })
                .collect(),
        }
    }
}

/// Registry of role grants
pub struct RoleRegistry;

impl RoleRegistry {
    /// Grants for a role. Total over the enumeration.
    pub fn grants_for(role: Role) -> Grants {
        match role {
            Role::Superadmin => Grants::All,
            Role::Owner => Grants::scoped(&[
                (Resource::Products, &[Read, Write, Delete]),
                (Resource::Categories, &[Read, Write]),
                (Resource::Brands, &[Read, Write]),
                (Resource::Orders, &[Read, Write]),
                (Resource::Reviews, &[Read, Write, Delete]),
                (Resource::Users, &[Read]),
                (Resource::Addresses, &[Read]),
                (Resource::Neighborhoods, &[Read, Write]),
                (Resource::Dashboard, &[Read]),
            ]),
            Role::Editor => Grants::scoped(&[
                (Resource::Products, &[Read, Write]),
                (Resource::Categories, &[Read, Write]),
                (Resource::Brands, &[Read, Write]),
                (Resource::Slides, &[Read, Write]),
                (Resource::Colors, &[Read, Write]),
                (Resource::Sizes, &[Read, Write]),
                (Resource::Tags, &[Read, Write]),
                (Resource::Dashboard, &[Read]),
            ]),
            Role::Moderator => Grants::scoped(&[
                (Resource::Reviews, &[Read, Write]),
                (Resource::Products, &[Read]),
                (Resource::Orders, &[Read]),
                (Resource::Dashboard, &[Read]),
            ]),
            Role::Shipper => Grants::scoped(&[
                (Resource::Orders, &[Read, Write]),
                (Resource::Addresses, &[Read]),
                (Resource::Neighborhoods, &[Read]),
                (Resource::Dashboard, &[Read]),
            ]),
            Role::Viewer => Grants::scoped(&[
                (Resource::Products, &[Read]),
                (Resource::Categories, &[Read]),
                (Resource::Brands, &[Read]),
                (Resource::Orders, &[Read]),
                (Resource::Reviews, &[Read]),
                (Resource::Users, &[Read]),
                (Resource::Addresses, &[Read]),
                (Resource::Neighborhoods, &[Read]),
                (Resource::Dashboard, &[Read]),
            ]),
        }
    }

    /// Grants for a role in `"resource:action"` form; `["*"]` for the wildcard
    pub fn permission_strings(role: Role) -> Vec<String> {
        let grants = Self::grants_for(role);
        if grants.is_wildcard() {
            return vec!["*".to_string()];
        }
        grants.grants().iter().map(ToString::to_string).collect()
    }

    /// The full table, one entry per role
    pub fn table() -> BTreeMap<Role, Vec<String>> {
        Role::ALL
            .iter()
            .map(|role| (*role, Self::permission_strings(*role)))
            .collect()
    }
}
