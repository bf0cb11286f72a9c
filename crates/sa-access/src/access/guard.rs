//! Access Guard
//!
//! Gates protected content on the resolved store context and a declared
//! `(action, resource)` requirement. Evaluation is a pure function of its
//! inputs and is repeated on every request.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::role::{Action, PermissionGrant, Resource, Role};
use crate::session::StoreContext;
use crate::shared::authorization_service::{can, has_permission};
use crate::shared::error::AccessError;

/// Declared requirement for a protected view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGuard {
    pub action: Action,
    pub resource: Resource,
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    RedirectToSignIn,
    Loading,
    NoStores,
    Denied { permission: String },
    Granted,
}

/// Serialisable form of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    RedirectToSignIn,
    Loading,
    NoStores,
    Denied,
    Granted,
}

/// What to show for a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<T> {
    Content(T),
    Fallback(T),
    SignInRedirect,
    LoadingPlaceholder,
    NoStoreNotice,
    AccessDeniedNotice,
}

impl PermissionGuard {
    pub fn new(action: Action, resource: Resource) -> Self {
        Self { action, resource }
    }

    /// Build from names; `None` if either is unknown
    pub fn parse(action: &str, resource: &str) -> Option<Self> {
        Some(Self::new(action.parse().ok()?, resource.parse().ok()?))
    }

    pub fn permission(&self) -> PermissionGrant {
        PermissionGrant::new(self.resource, self.action)
    }

    /// Evaluate against the caller's context; `None` means no identity.
    pub fn evaluate(&self, context: Option<&StoreContext>) -> GuardDecision {
        gate(context, self.permission().to_string(), |role| {
            can(Some(role), self.action, self.resource)
        })
    }

    /// Evaluate a requirement given by name. Names outside the vocabulary
    /// only pass for a wildcard role.
    pub fn evaluate_named(action: &str, resource: &str, context: Option<&StoreContext>) -> GuardDecision {
        match Self::parse(action, resource) {
            Some(guard) => guard.evaluate(context),
            None => gate(context, format!("{}:{}", resource, action), |role| {
                has_permission(Some(role), action, resource)
            }),
        }
    }
}

fn gate(
    context: Option<&StoreContext>,
    permission: String,
    allowed: impl FnOnce(Role) -> bool,
) -> GuardDecision {
    let Some(ctx) = context else {
        return GuardDecision::RedirectToSignIn;
    };
    if ctx.is_loading() || ctx.is_role_pending() {
        return GuardDecision::Loading;
    }
    if ctx.has_no_stores() {
        return GuardDecision::NoStores;
    }
    match ctx.user_role() {
        Some(role) if allowed(role) => GuardDecision::Granted,
        _ => GuardDecision::Denied { permission },
    }
}

impl GuardDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GuardDecision::Granted)
    }

    pub fn kind(&self) -> DecisionKind {
        match self {
            GuardDecision::RedirectToSignIn => DecisionKind::RedirectToSignIn,
            GuardDecision::Loading => DecisionKind::Loading,
            GuardDecision::NoStores => DecisionKind::NoStores,
            GuardDecision::Denied { .. } => DecisionKind::Denied,
            GuardDecision::Granted => DecisionKind::Granted,
        }
    }

    /// Pick the view. `content` is only built when access is granted; a
    /// denial shows `fallback` when one is given.
    pub fn render<T>(self, content: impl FnOnce() -> T, fallback: Option<T>) -> View<T> {
        match self {
            GuardDecision::Granted => View::Content(content()),
            GuardDecision::Denied { .. } => match fallback {
                Some(fallback) => View::Fallback(fallback),
                None => View::AccessDeniedNotice,
            },
            GuardDecision::RedirectToSignIn => View::SignInRedirect,
            GuardDecision::Loading => View::LoadingPlaceholder,
            GuardDecision::NoStores => View::NoStoreNotice,
        }
    }

    /// HTTP form: anything but `Granted` becomes the matching rejection
    pub fn into_result(self, sign_in_url: &str) -> Result<(), AccessError> {
        match self {
            GuardDecision::Granted => Ok(()),
            GuardDecision::RedirectToSignIn => Err(AccessError::unauthenticated(sign_in_url)),
            GuardDecision::Loading => Err(AccessError::ContextPending),
            GuardDecision::NoStores => Err(AccessError::NoStores),
            GuardDecision::Denied { permission } => Err(AccessError::AccessDenied { permission }),
        }
    }
}
