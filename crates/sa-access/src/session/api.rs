//! Session API
//!
//! Current store context, manual store selection and sign-out.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::context::StoreContext;
use super::manager::SessionManager;
use crate::auth::Identity;
use crate::role::{Role, RoleRegistry};
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::AccessError;
use crate::shared::middleware::{Authenticated, StoreSession};
use crate::store::Store;

/// Store summary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<&Store> for StoreSummary {
    fn from(s: &Store) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            slug: s.slug.clone(),
            description: s.description.clone(),
            is_active: s.is_active(),
        }
    }
}

/// Resolved store context of the caller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreContextResponse {
    pub identity: Identity,
    pub stores: Vec<StoreSummary>,
    pub selected_store: Option<StoreSummary>,
    pub is_loading: bool,
    pub has_no_stores: bool,
    /// Role in the selected store; absent while pending or without membership
    pub user_role: Option<Role>,
    pub role_pending: bool,
    /// Grants of `user_role` in `resource:action` form
    pub permissions: Vec<String>,
}

impl From<&StoreContext> for StoreContextResponse {
    fn from(ctx: &StoreContext) -> Self {
        let user_role = ctx.user_role();
        Self {
            identity: ctx.identity().clone(),
            stores: ctx.stores().iter().map(StoreSummary::from).collect(),
            selected_store: ctx.selected_store().map(StoreSummary::from),
            is_loading: ctx.is_loading(),
            has_no_stores: ctx.has_no_stores(),
            user_role,
            role_pending: ctx.is_role_pending(),
            permissions: user_role.map(RoleRegistry::permission_strings).unwrap_or_default(),
        }
    }
}

/// Select store request; `null` clears the selection
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectStoreRequest {
    #[serde(default)]
    pub store_id: Option<String>,
}

#[derive(Clone)]
pub struct SessionState {
    pub sessions: Arc<SessionManager>,
}

/// Get the caller's store context
#[utoipa::path(
    get,
    path = "",
    tag = "session",
    operation_id = "getApiSession",
    responses(
        (status = 200, description = "Current store context", body = StoreContextResponse),
        (status = 303, description = "Not signed in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_session(session: StoreSession) -> Json<StoreContextResponse> {
    Json(StoreContextResponse::from(&session.context))
}

/// Select the active store
#[utoipa::path(
    put,
    path = "/store",
    tag = "session",
    operation_id = "putApiSessionStore",
    request_body = SelectStoreRequest,
    responses(
        (status = 200, description = "Store selected", body = StoreContextResponse),
        (status = 404, description = "Store not available to the caller"),
        (status = 503, description = "Store list still resolving")
    ),
    security(("bearer_auth" = []))
)]
pub async fn select_store(
    State(state): State<SessionState>,
    auth: Authenticated,
    Json(req): Json<SelectStoreRequest>,
) -> Result<Json<StoreContextResponse>, AccessError> {
    let ctx = state.sessions.select_store(&auth.0, req.store_id.as_deref()).await?;
    Ok(Json(StoreContextResponse::from(&ctx)))
}

/// Sign out, discarding the store context
#[utoipa::path(
    delete,
    path = "",
    tag = "session",
    operation_id = "deleteApiSession",
    responses(
        (status = 200, description = "Signed out", body = SuccessResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn sign_out(
    State(state): State<SessionState>,
    auth: Authenticated,
) -> Json<SuccessResponse> {
    state.sessions.sign_out(&auth.id);
    Json(SuccessResponse::with_message("Signed out"))
}

pub fn session_router(state: SessionState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_session, sign_out))
        .routes(routes!(select_store))
        .with_state(state)
}
