//! Credential check and credential issuance.
//!
//! Flow Overview: look the user up, verify the Argon2id hash, sign the access
//! token, then persist the authenticated session. Cookies are attached only
//! after both succeeded, so the client never holds one without the other.

use anyhow::anyhow;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    password::{burn_verification, verify_password_blocking},
    register::MISSING_CREDENTIALS,
    session::{establish_session, token_cookie},
    state::AuthState,
    token::Identity,
    types::Credentials,
    utils::unix_now,
};
use crate::api::{
    error::{ApiError, MessageResponse},
    handlers::payload::Payload,
};

#[utoipa::path(
    post,
    path = "/login",
    request_body(content(
        (Credentials = "application/json"),
        (Credentials = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 200, description = "Logged in; sets the session and token cookies", body = MessageResponse),
        (status = 400, description = "Username or password missing", body = MessageResponse),
        (status = 401, description = "Unknown user or wrong password", body = MessageResponse),
        (status = 500, description = "Store or signing failure", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
    payload: Result<Payload<Credentials>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let Payload(credentials) = payload?;
    if !credentials.is_complete() {
        return Err(ApiError::Validation(MISSING_CREDENTIALS.to_string()));
    }
    let username = credentials.username.trim();

    let Some(user) = auth_state
        .users()
        .find_user(username)
        .await
        .map_err(ApiError::Store)?
    else {
        burn_verification(credentials.password).await;
        debug!("Login rejected: unknown user");
        return Err(ApiError::InvalidCredentials);
    };

    let verified = verify_password_blocking(credentials.password, user.password_hash)
        .await
        .map_err(ApiError::Internal)?;
    if !verified {
        debug!("Login rejected: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    let identity = Identity {
        id: user.user_id,
        username: user.username,
    };
    let token = auth_state
        .signer()
        .issue(&identity, unix_now())
        .map_err(|err| ApiError::Internal(anyhow!(err)))?;
    let token_cookie = token_cookie(auth_state.config(), &token)
        .map_err(|err| ApiError::Internal(anyhow!("failed to build token cookie: {err}")))?;

    let session_cookie = establish_session(&headers, &auth_state).await?;

    let mut response_headers = HeaderMap::new();
    if let Some(cookie) = session_cookie {
        response_headers.append(SET_COOKIE, cookie);
    }
    response_headers.append(SET_COOKIE, token_cookie);

    debug!(username = %identity.username, "Login successful");
    Ok((
        response_headers,
        Json(MessageResponse::new("Login successful!")),
    ))
}
