//! Request-boundary error taxonomy.
//!
//! Every handler error ends up here and becomes a status code plus a short
//! `{"message": ...}` body. Internal detail is logged, never returned.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Body used by every endpoint that answers with a plain message.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no token provided")]
    Unauthorized,
    #[error("invalid or expired token")]
    Forbidden,
    #[error("username already exists")]
    Conflict,
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
    #[error("upstream error: {0:#}")]
    Upstream(anyhow::Error),
    #[error("session error: {0:#}")]
    Session(anyhow::Error),
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict
            | Self::Store(_)
            | Self::Upstream(_)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::InvalidCredentials => "Invalid credentials!".to_string(),
            Self::Unauthorized => "No token provided, authorization denied!".to_string(),
            Self::Forbidden => "Invalid or expired token!".to_string(),
            // A duplicate username surfaces like any other store failure.
            Self::Conflict | Self::Store(_) => "Database error".to_string(),
            Self::Upstream(_) => "Error fetching quiz question".to_string(),
            Self::Session(_) => "Failed to destroy session".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store(_) | Self::Upstream(_) | Self::Session(_) | Self::Internal(_) => {
                error!("{self}");
            }
            Self::Conflict => warn!("Registration rejected: username already exists"),
            _ => {}
        }

        (self.status(), Json(MessageResponse::new(self.public_message()))).into_response()
    }
}
