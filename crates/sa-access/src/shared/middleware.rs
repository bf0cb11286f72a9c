//! API Middleware
//!
//! Identity and store-context extractors for Axum. Credentials are read
//! from the `Authorization: Bearer` header first, then the session cookie.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, header::COOKIE, request::Parts},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::access::guard::{GuardDecision, PermissionGuard};
use crate::auth::{extract_bearer_token, extract_cookie, Identity, IdentityProvider};
use crate::role::{Action, Resource};
use crate::session::{SessionManager, StoreContext};
use crate::shared::error::AccessError;

/// Shared services available to every extractor
#[derive(Clone)]
pub struct AppState {
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub sessions: Arc<SessionManager>,
    pub sign_in_url: String,
    pub session_cookie: String,
}

impl AppState {
    /// Resolve the request's identity, if any
    pub async fn identify(&self, parts: &Parts) -> Option<Identity> {
        let token = parts.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token)
            .or_else(|| {
                parts.headers
                    .get(COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|cookies| extract_cookie(cookies, &self.session_cookie))
            })?;
        self.identity_provider.resolve(token).await
    }
}

fn app_state(parts: &Parts) -> Result<AppState, AccessError> {
    parts.extensions
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| AccessError::internal("Auth layer not configured"))
}

/// Signed-in identity. Anonymous requests are redirected to sign-in.
pub struct Authenticated(pub Identity);

impl std::ops::Deref for Authenticated {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = app_state(parts)?;
        let identity = state.identify(parts).await
            .ok_or_else(|| AccessError::unauthenticated(&state.sign_in_url))?;
        Ok(Authenticated(identity))
    }
}

/// Signed-in identity together with its resolved store context
pub struct StoreSession {
    pub identity: Identity,
    pub context: StoreContext,
    sign_in_url: String,
}

impl StoreSession {
    pub fn decide(&self, action: Action, resource: Resource) -> GuardDecision {
        PermissionGuard::new(action, resource).evaluate(Some(&self.context))
    }

    /// Reject unless the guard grants `(action, resource)`
    pub fn require(&self, action: Action, resource: Resource) -> Result<(), AccessError> {
        self.decide(action, resource).into_result(&self.sign_in_url)
    }

    /// Selected store id, once the context is resolved
    pub fn store_id(&self) -> Result<&str, AccessError> {
        if self.context.is_loading() {
            return Err(AccessError::ContextPending);
        }
        if self.context.has_no_stores() {
            return Err(AccessError::NoStores);
        }
        self.context
            .selected_store_id()
            .ok_or_else(|| AccessError::validation("No store selected"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StoreSession
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = app_state(parts)?;
        let identity = state.identify(parts).await
            .ok_or_else(|| AccessError::unauthenticated(&state.sign_in_url))?;
        let context = state.sessions.current(&identity).await;
        Ok(StoreSession {
            identity,
            context,
            sign_in_url: state.sign_in_url,
        })
    }
}

/// Layer that injects `AppState` into request extensions for the extractors
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());
        Box::pin(self.inner.call(req))
    }
}
