//! Store Entity
//!
//! A tenant storefront administered through the console.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;

/// Store status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Active,
    Inactive,
}

impl Default for StoreStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Store entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Unique URL-safe identifier
    pub slug: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default)]
    pub status: StoreStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Identity that created the store
    pub created_by: String,
}

impl Store {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            logo: None,
            website: None,
            email: None,
            phone: None,
            address: None,
            status: StoreStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
            created_by: created_by.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: StoreStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == StoreStatus::Active
    }

    /// Stamp `updated_at` after an edit
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
