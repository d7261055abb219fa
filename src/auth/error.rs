//! Error taxonomy for the account endpoints and how each maps to HTTP.
//!
//! Credential and token failures share one generic 401 body so clients can't
//! tell "no such user" from "wrong password", or "revoked" from "tampered".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

pub const MSG_USER_EXISTS: &str = "User already exists";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const MSG_UNAUTHORIZED: &str = "Unauthorized access";
pub const MSG_NO_TOKEN: &str = "No token provided";
pub const MSG_VALIDATION: &str = "Validation failed";
pub const MSG_INTERNAL: &str = "Internal Server Error";

/// One rejected input field.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// JSON body of every error response.
#[derive(ToSchema, Serialize, Debug)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no authenticated identity")]
    Unauthorized,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token is blacklisted")]
    Blacklisted,
    #[error("no token provided")]
    MissingToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) | Self::MissingToken => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized | Self::InvalidToken(_) | Self::Blacklisted => {
                StatusCode::UNAUTHORIZED
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, errors) = match self {
            Self::Validation(errors) => (MSG_VALIDATION.to_string(), errors.clone()),
            Self::Conflict(message) => (message.clone(), Vec::new()),
            Self::InvalidCredentials => (MSG_INVALID_CREDENTIALS.to_string(), Vec::new()),
            Self::Unauthorized | Self::InvalidToken(_) | Self::Blacklisted => {
                (MSG_UNAUTHORIZED.to_string(), Vec::new())
            }
            Self::MissingToken => (MSG_NO_TOKEN.to_string(), Vec::new()),
            Self::Internal(_) => (MSG_INTERNAL.to_string(), Vec::new()),
        };
        ErrorBody { message, errors }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(err) => error!("request failed: {err:#}"),
            Self::InvalidToken(reason) => debug!("rejected token: {reason}"),
            Self::Blacklisted => debug!("rejected blacklisted token"),
            _ => debug!("request rejected: {self}"),
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}
