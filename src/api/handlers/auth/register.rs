//! Account registration.

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{password::hash_password_blocking, state::AuthState, types::Credentials};
use crate::api::{
    error::{ApiError, MessageResponse},
    handlers::payload::Payload,
    storage::InsertOutcome,
};

pub(super) const MISSING_CREDENTIALS: &str = "Username and password are required";

#[utoipa::path(
    post,
    path = "/register",
    request_body(content(
        (Credentials = "application/json"),
        (Credentials = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 200, description = "User created", body = MessageResponse),
        (status = 400, description = "Username or password missing", body = MessageResponse),
        (status = 500, description = "Store failure, including a taken username", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    Extension(auth_state): Extension<Arc<AuthState>>,
    payload: Result<Payload<Credentials>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Payload(credentials) = payload?;
    if !credentials.is_complete() {
        return Err(ApiError::Validation(MISSING_CREDENTIALS.to_string()));
    }

    let username = credentials.username.trim().to_string();
    let password_hash = hash_password_blocking(credentials.password)
        .await
        .map_err(ApiError::Internal)?;

    // The unique index is the only duplicate check.
    match auth_state
        .users()
        .insert_user(&username, &password_hash)
        .await
        .map_err(ApiError::Store)?
    {
        InsertOutcome::Created => {
            debug!(%username, "User registered");
            Ok(Json(MessageResponse::new("User registered successfully!")))
        }
        InsertOutcome::Conflict => Err(ApiError::Conflict),
    }
}
