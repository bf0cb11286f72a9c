//! Stores Admin API
//!
//! Store catalogue administration. Every route is gated on the `stores`
//! resource in the caller's selected store.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Store, StoreStatus};
use crate::directory::MembershipDirectory;
use crate::role::{Action, Resource};
use crate::session::SessionManager;
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::AccessError;
use crate::shared::middleware::StoreSession;

/// Create store request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    /// Unique URL-safe identifier
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Update store request; absent fields are left as they are
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<StoreStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StoreListQuery {
    /// Exact store name or slug
    pub search: Option<String>,
}

/// Store response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: StoreStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub created_by: String,
    /// Membership records of any status
    pub member_count: u64,
}

impl StoreResponse {
    fn new(store: Store, member_count: u64) -> Self {
        Self {
            id: store.id,
            name: store.name,
            slug: store.slug,
            description: store.description,
            logo: store.logo,
            website: store.website,
            email: store.email,
            phone: store.phone,
            address: store.address,
            status: store.status,
            created_at: store.created_at.to_rfc3339(),
            updated_at: store.updated_at.map(|t| t.to_rfc3339()),
            created_by: store.created_by,
            member_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreListResponse {
    pub stores: Vec<StoreResponse>,
    pub total: usize,
}

#[derive(Clone)]
pub struct StoresState {
    pub sessions: Arc<SessionManager>,
}

impl StoresState {
    fn directory(&self) -> &Arc<dyn MembershipDirectory> {
        self.sessions.directory()
    }

    async fn store(&self, store_id: &str) -> Result<Store, AccessError> {
        self.directory()
            .find_store(store_id)
            .await?
            .ok_or_else(|| AccessError::not_found("Store", store_id))
    }

    async fn respond(&self, store: Store) -> Result<StoreResponse, AccessError> {
        let count = self.directory().count_members(&store.id).await?;
        Ok(StoreResponse::new(store, count))
    }

    /// Reject a slug already held by a different store
    async fn ensure_slug_free(&self, slug: &str, owner: Option<&str>) -> Result<(), AccessError> {
        match self.directory().find_store_by_slug(slug).await? {
            Some(existing) if Some(existing.id.as_str()) != owner => {
                Err(AccessError::duplicate("Store", "slug", slug))
            }
            _ => Ok(()),
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, AccessError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AccessError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// List stores with their member counts
#[utoipa::path(
    get,
    path = "",
    tag = "stores",
    operation_id = "getApiStores",
    params(StoreListQuery),
    responses(
        (status = 200, description = "Stores", body = StoreListResponse),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_stores(
    State(state): State<StoresState>,
    session: StoreSession,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<StoreListResponse>, AccessError> {
    session.require(Action::Read, Resource::Stores)?;

    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let found = state.directory().list_stores(search).await?;

    let mut stores = Vec::with_capacity(found.len());
    for store in found {
        stores.push(state.respond(store).await?);
    }

    let total = stores.len();
    Ok(Json(StoreListResponse { stores, total }))
}

/// Get a store by ID
#[utoipa::path(
    get,
    path = "/{store_id}",
    tag = "stores",
    operation_id = "getApiStore",
    params(
        ("store_id" = String, Path, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Store", body = StoreResponse),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_store(
    State(state): State<StoresState>,
    session: StoreSession,
    Path(store_id): Path<String>,
) -> Result<Json<StoreResponse>, AccessError> {
    session.require(Action::Read, Resource::Stores)?;

    let store = state.store(&store_id).await?;
    Ok(Json(state.respond(store).await?))
}

/// Create a store
#[utoipa::path(
    post,
    path = "",
    tag = "stores",
    operation_id = "postApiStores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = StoreResponse),
        (status = 400, description = "Missing name or slug"),
        (status = 409, description = "Slug already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_store(
    State(state): State<StoresState>,
    session: StoreSession,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>), AccessError> {
    session.require(Action::Write, Resource::Stores)?;

    let name = required("name", &req.name)?;
    let slug = required("slug", &req.slug)?;
    state.ensure_slug_free(&slug, None).await?;

    let mut store = Store::new(name, slug, &session.identity.id);
    store.description = req.description;
    store.logo = req.logo;
    store.website = req.website;
    store.email = req.email;
    store.phone = req.phone;
    store.address = req.address;
    state.directory().insert_store(&store).await?;

    info!(store_id = %store.id, slug = %store.slug, created_by = %session.identity.id, "Store created");
    Ok((StatusCode::CREATED, Json(StoreResponse::new(store, 0))))
}

/// Update a store
#[utoipa::path(
    put,
    path = "/{store_id}",
    tag = "stores",
    operation_id = "putApiStore",
    params(
        ("store_id" = String, Path, description = "Store ID")
    ),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = StoreResponse),
        (status = 404, description = "Store not found"),
        (status = 409, description = "Slug already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_store(
    State(state): State<StoresState>,
    session: StoreSession,
    Path(store_id): Path<String>,
    Json(req): Json<UpdateStoreRequest>,
) -> Result<Json<StoreResponse>, AccessError> {
    session.require(Action::Write, Resource::Stores)?;

    let mut store = state.store(&store_id).await?;

    if let Some(name) = req.name {
        store.name = required("name", &name)?;
    }
    if let Some(slug) = req.slug {
        let slug = required("slug", &slug)?;
        if slug != store.slug {
            state.ensure_slug_free(&slug, Some(&store.id)).await?;
            store.slug = slug;
        }
    }
    if req.description.is_some() {
        store.description = req.description;
    }
    if req.logo.is_some() {
        store.logo = req.logo;
    }
    if req.website.is_some() {
        store.website = req.website;
    }
    if req.email.is_some() {
        store.email = req.email;
    }
    if req.phone.is_some() {
        store.phone = req.phone;
    }
    if req.address.is_some() {
        store.address = req.address;
    }
    if let Some(status) = req.status {
        store.status = status;
    }
    store.touch();
    state.directory().update_store(&store).await?;

    info!(store_id = %store.id, status = ?store.status, "Store updated");
    Ok(Json(state.respond(store).await?))
}

/// Delete a store along with its memberships
#[utoipa::path(
    delete,
    path = "/{store_id}",
    tag = "stores",
    operation_id = "deleteApiStore",
    params(
        ("store_id" = String, Path, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Store deleted", body = SuccessResponse),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_store(
    State(state): State<StoresState>,
    session: StoreSession,
    Path(store_id): Path<String>,
) -> Result<Json<SuccessResponse>, AccessError> {
    session.require(Action::Delete, Resource::Stores)?;

    if !state.directory().delete_store(&store_id).await? {
        return Err(AccessError::not_found("Store", &store_id));
    }

    info!(store_id = %store_id, deleted_by = %session.identity.id, "Store deleted");
    Ok(Json(SuccessResponse::with_message("Store deleted")))
}

pub fn stores_router(state: StoresState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_stores, create_store))
        .routes(routes!(get_store, update_store, delete_store))
        .with_state(state)
}
