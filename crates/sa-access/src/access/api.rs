//! Access API
//!
//! Guard decisions for the caller and the static role table.

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::guard::{DecisionKind, PermissionGuard};
use crate::role::{Role, RoleRegistry};
use crate::shared::middleware::StoreSession;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessCheckQuery {
    /// `read`, `write` or `delete` (`create`/`update` are read as `write`)
    pub action: String,
    pub resource: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheckResponse {
    pub action: String,
    pub resource: String,
    pub decision: DecisionKind,
    pub allowed: bool,
    pub role: Option<Role>,
    pub store_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrantsResponse {
    pub role: Role,
    pub wildcard: bool,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RolesResponse {
    pub roles: Vec<RoleGrantsResponse>,
}

/// Evaluate the guard for an action on a resource in the selected store
#[utoipa::path(
    get,
    path = "/check",
    tag = "access",
    operation_id = "getApiAccessCheck",
    params(AccessCheckQuery),
    responses(
        (status = 200, description = "Guard decision", body = AccessCheckResponse),
        (status = 303, description = "Not signed in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_access(
    session: StoreSession,
    Query(query): Query<AccessCheckQuery>,
) -> Json<AccessCheckResponse> {
    let decision = PermissionGuard::evaluate_named(&query.action, &query.resource, Some(&session.context));

    Json(AccessCheckResponse {
        allowed: decision.is_granted(),
        decision: decision.kind(),
        role: session.context.user_role(),
        store_id: session.context.selected_store_id().map(String::from),
        action: query.action,
        resource: query.resource,
    })
}

/// List every role with its grants
#[utoipa::path(
    get,
    path = "/roles",
    tag = "access",
    operation_id = "getApiAccessRoles",
    responses(
        (status = 200, description = "Role table", body = RolesResponse)
    )
)]
pub async fn list_roles() -> Json<RolesResponse> {
    let roles = Role::ALL
        .iter()
        .map(|role| RoleGrantsResponse {
            role: *role,
            wildcard: RoleRegistry::grants_for(*role).is_wildcard(),
            permissions: RoleRegistry::permission_strings(*role),
        })
        .collect();
    Json(RolesResponse { roles })
}

pub fn access_router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(check_access))
        .routes(routes!(list_roles))
}
