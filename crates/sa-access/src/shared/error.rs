//! Access Error Types

use thiserror::Error;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response, Json},
};
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} with {field}={value}")]
    Duplicate { entity_type: String, field: String, value: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No identity; the response redirects to the sign-in entry point
    #[error("Authentication required")]
    Unauthenticated { sign_in_url: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Access denied: {permission}")]
    AccessDenied { permission: String },

    #[error("No store available for this account")]
    NoStores,

    #[error("Store context is still being resolved")]
    ContextPending,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AccessError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthenticated(sign_in_url: impl Into<String>) -> Self {
        Self::Unauthenticated { sign_in_url: sign_in_url.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable machine-readable code carried in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::NotFound { .. } => "NOT_FOUND",
            AccessError::Duplicate { .. } => "DUPLICATE",
            AccessError::Validation { .. } => "VALIDATION_ERROR",
            AccessError::Unauthenticated { .. } => "UNAUTHENTICATED",
            AccessError::Forbidden { .. } => "FORBIDDEN",
            AccessError::AccessDenied { .. } => "ACCESS_DENIED",
            AccessError::NoStores => "NO_STORES",
            AccessError::ContextPending => "CONTEXT_PENDING",
            AccessError::InvalidToken { .. } => "INVALID_TOKEN",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::NotFound { .. } => StatusCode::NOT_FOUND,
            AccessError::Duplicate { .. } => StatusCode::CONFLICT,
            AccessError::Validation { .. } => StatusCode::BAD_REQUEST,
            AccessError::Unauthenticated { .. } => StatusCode::SEE_OTHER,
            AccessError::Forbidden { .. }
            | AccessError::AccessDenied { .. }
            | AccessError::NoStores => StatusCode::FORBIDDEN,
            AccessError::ContextPending => StatusCode::SERVICE_UNAVAILABLE,
            AccessError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, AccessError>;

/// Server code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

pub(crate) fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

/// Error response body
#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() && !matches!(self, AccessError::ContextPending) {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };

        match self {
            AccessError::Unauthenticated { sign_in_url } => {
                (status, [(header::LOCATION, sign_in_url)], Json(body)).into_response()
            }
            AccessError::ContextPending => {
                (status, [(header::RETRY_AFTER, "1".to_string())], Json(body)).into_response()
            }
            _ => (status, Json(body)).into_response(),
        }
    }
}
