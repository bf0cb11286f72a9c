//! Store Membership Entity
//!
//! Binds an identity to a store with a role. This is the authoritative
//! authorization record: a role only counts while its membership is active.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;

use crate::role::Role;

/// Membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    /// Invited, not yet accepted
    Pending,
    Active,
    Inactive,
}

impl Default for MembershipStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Membership entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Identity subject of the member
    pub principal_id: String,

    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub store_id: String,

    pub role: Role,

    #[serde(default)]
    pub status: MembershipStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub invited_at: DateTime<Utc>,

    /// Identity that sent the invitation
    pub invited_by: String,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Membership {
    /// New pending invitation
    pub fn invite(
        principal_id: impl Into<String>,
        email: impl Into<String>,
        store_id: impl Into<String>,
        role: Role,
        invited_by: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            principal_id: principal_id.into(),
            email: email.into(),
            name: None,
            store_id: store_id.into(),
            role,
            status: MembershipStatus::Pending,
            invited_at: Utc::now(),
            invited_by: invited_by.into(),
            updated_at: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Accepted membership; used for seeding and tests
    pub fn active(mut self) -> Self {
        self.status = MembershipStatus::Active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    pub fn accept(&mut self) {
        self.status = MembershipStatus::Active;
        self.touch();
    }

    pub fn change_role(&mut self, role: Role) {
        self.role = role;
        self.touch();
    }

    /// Time of the last change, falling back to the invitation
    pub fn last_changed_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.invited_at)
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Effective role from the memberships of one identity in one store.
///
/// Only active memberships count. If more than one is active the most
/// recently changed wins.
pub fn resolve_role(memberships: &[Membership]) -> Option<Role> {
    memberships
        .iter()
        .filter(|m| m.is_active())
        .max_by_key(|m| m.last_changed_at())
        .map(|m| m.role)
}
