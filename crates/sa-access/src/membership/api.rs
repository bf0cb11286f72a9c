//! Team API
//!
//! Membership administration for the selected store: list, invite, change
//! role, remove. Invitees list and accept their own invitations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Membership, MembershipStatus};
use crate::directory::MembershipDirectory;
use crate::role::{Action, Resource, Role};
use crate::session::SessionManager;
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::AccessError;
use crate::shared::middleware::{Authenticated, StoreSession};

/// Invite request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: Role,
    pub name: Option<String>,
}

/// Role change request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Member response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: String,
    pub principal_id: String,
    pub email: String,
    pub name: Option<String>,
    pub store_id: String,
    pub role: Role,
    pub status: MembershipStatus,
    pub invited_at: String,
    pub invited_by: String,
    pub updated_at: Option<String>,
}

impl From<Membership> for MemberResponse {
    fn from(m: Membership) -> Self {
        Self {
            id: m.id,
            principal_id: m.principal_id,
            email: m.email,
            name: m.name,
            store_id: m.store_id,
            role: m.role,
            status: m.status,
            invited_at: m.invited_at.to_rfc3339(),
            invited_by: m.invited_by,
            updated_at: m.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamListResponse {
    pub members: Vec<MemberResponse>,
    pub total: usize,
}

#[derive(Clone)]
pub struct TeamState {
    pub sessions: Arc<SessionManager>,
}

impl TeamState {
    fn directory(&self) -> &Arc<dyn MembershipDirectory> {
        self.sessions.directory()
    }

    /// Membership by id, scoped to the given store
    async fn member_in_store(&self, member_id: &str, store_id: &str) -> Result<Membership, AccessError> {
        self.directory()
            .find_membership(member_id)
            .await?
            .filter(|m| m.store_id == store_id)
            .ok_or_else(|| AccessError::not_found("Membership", member_id))
    }
}

fn assignable(role: Role) -> Result<Role, AccessError> {
    if role.is_assignable() {
        Ok(role)
    } else {
        Err(AccessError::validation(format!("Role '{}' cannot be assigned", role)))
    }
}

/// List members of the selected store
#[utoipa::path(
    get,
    path = "",
    tag = "team",
    operation_id = "getApiTeam",
    responses(
        (status = 200, description = "Team members", body = TeamListResponse),
        (status = 403, description = "Access denied"),
        (status = 503, description = "Store context still resolving")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_members(
    State(state): State<TeamState>,
    session: StoreSession,
) -> Result<Json<TeamListResponse>, AccessError> {
    session.require(Action::Read, Resource::Users)?;
    let store_id = session.store_id()?;

    let members: Vec<MemberResponse> = state.directory()
        .list_members(store_id)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    let total = members.len();
    Ok(Json(TeamListResponse { members, total }))
}

/// Invite a user to the selected store
#[utoipa::path(
    post,
    path = "",
    tag = "team",
    operation_id = "postApiTeam",
    request_body = InviteMemberRequest,
    responses(
        (status = 201, description = "Invitation created", body = MemberResponse),
        (status = 400, description = "Role cannot be assigned"),
        (status = 404, description = "No user with this email"),
        (status = 409, description = "Already a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn invite_member(
    State(state): State<TeamState>,
    session: StoreSession,
    Json(req): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), AccessError> {
    session.require(Action::Write, Resource::Users)?;
    let store_id = session.store_id()?;
    let role = assignable(req.role)?;

    let user = state.directory()
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| AccessError::not_found("User", &req.email))?;

    let mut membership = Membership::invite(&user.id, &user.email, store_id, role, &session.identity.id);
    if let Some(name) = req.name.filter(|n| !n.trim().is_empty()) {
        membership = membership.with_name(name);
    }
    state.directory().insert_membership(&membership).await?;

    info!(
        store_id,
        member_id = %membership.id,
        role = %role,
        invited_by = %session.identity.id,
        "Team member invited"
    );
    Ok((StatusCode::CREATED, Json(membership.into())))
}

/// Change a member's role
#[utoipa::path(
    put,
    path = "/{member_id}/role",
    tag = "team",
    operation_id = "putApiTeamMemberRole",
    params(
        ("member_id" = String, Path, description = "Membership ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = MemberResponse),
        (status = 400, description = "Role cannot be assigned"),
        (status = 404, description = "Membership not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_member_role(
    State(state): State<TeamState>,
    session: StoreSession,
    Path(member_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<MemberResponse>, AccessError> {
    session.require(Action::Write, Resource::Users)?;
    let store_id = session.store_id()?;
    let role = assignable(req.role)?;

    let mut membership = state.member_in_store(&member_id, store_id).await?;
    membership.change_role(role);
    state.directory().update_membership(&membership).await?;

    info!(store_id, member_id = %member_id, role = %role, "Team member role changed");
    Ok(Json(membership.into()))
}

/// Remove a member from the selected store
#[utoipa::path(
    delete,
    path = "/{member_id}",
    tag = "team",
    operation_id = "deleteApiTeamMember",
    params(
        ("member_id" = String, Path, description = "Membership ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = SuccessResponse),
        (status = 404, description = "Membership not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    State(state): State<TeamState>,
    session: StoreSession,
    Path(member_id): Path<String>,
) -> Result<Json<SuccessResponse>, AccessError> {
    session.require(Action::Write, Resource::Users)?;
    let store_id = session.store_id()?;

    let membership = state.member_in_store(&member_id, store_id).await?;
    if !state.directory().delete_membership(&membership.id).await? {
        return Err(AccessError::not_found("Membership", &member_id));
    }

    info!(store_id, member_id = %member_id, "Team member removed");
    Ok(Json(SuccessResponse::with_message("Member removed")))
}

/// Pending invitations addressed to the caller, across stores
#[utoipa::path(
    get,
    path = "/invitations",
    tag = "team",
    operation_id = "getApiTeamInvitations",
    responses(
        (status = 200, description = "Pending invitations", body = TeamListResponse),
        (status = 303, description = "Not signed in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_invitations(
    State(state): State<TeamState>,
    auth: Authenticated,
) -> Result<Json<TeamListResponse>, AccessError> {
    let members: Vec<MemberResponse> = state.directory()
        .pending_invitations(&auth.id)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    let total = members.len();
    Ok(Json(TeamListResponse { members, total }))
}

/// Accept a pending invitation addressed to the caller
#[utoipa::path(
    post,
    path = "/{member_id}/accept",
    tag = "team",
    operation_id = "postApiTeamMemberAccept",
    params(
        ("member_id" = String, Path, description = "Membership ID")
    ),
    responses(
        (status = 200, description = "Invitation accepted", body = MemberResponse),
        (status = 400, description = "Invitation is not pending"),
        (status = 403, description = "Invitation belongs to someone else"),
        (status = 404, description = "Membership not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn accept_invitation(
    State(state): State<TeamState>,
    auth: Authenticated,
    Path(member_id): Path<String>,
) -> Result<Json<MemberResponse>, AccessError> {
    let mut membership = state.directory()
        .find_membership(&member_id)
        .await?
        .ok_or_else(|| AccessError::not_found("Membership", &member_id))?;

    if membership.principal_id != auth.id {
        return Err(AccessError::forbidden("Invitation belongs to another user"));
    }
    if !membership.is_pending() {
        return Err(AccessError::validation("Invitation is not pending"));
    }

    membership.accept();
    state.directory().update_membership(&membership).await?;

    info!(store_id = %membership.store_id, member_id = %member_id, "Invitation accepted");
    Ok(Json(membership.into()))
}

pub fn team_router(state: TeamState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_members, invite_member))
        .routes(routes!(list_invitations))
        .routes(routes!(update_member_role))
        .routes(routes!(remove_member))
        .routes(routes!(accept_invitation))
        .with_state(state)
}
