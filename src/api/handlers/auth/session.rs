//! Server-side sessions: cookies, the page gate, and logout.
//!
//! Flow Overview: login either flags the caller's live session as
//! authenticated or creates a new authenticated one. Protected pages read the
//! session cookie, resolve it through the session store, and redirect to `/`
//! unless the session is authenticated. Logout destroys the session.

use anyhow::anyhow;
use axum::{
    extract::{Extension, Request},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    state::{AuthConfig, AuthState},
    utils::{extract_cookie, generate_session_token, hash_session_token},
};
use crate::api::error::{ApiError, MessageResponse};

pub(crate) const SESSION_COOKIE_NAME: &str = "quiz_session";
pub(crate) const TOKEN_COOKIE_NAME: &str = "token";

/// Where unauthenticated page requests are sent.
pub(crate) const LOGIN_PAGE: &str = "/";

fn build_cookie(
    name: &str,
    value: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `HttpOnly` cookie carrying the raw session identifier.
pub(super) fn session_cookie(
    config: &AuthConfig,
    session_token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(
        SESSION_COOKIE_NAME,
        session_token,
        config.session_ttl_seconds(),
        config.cookie_secure(),
    )
}

/// `HttpOnly` cookie carrying the signed access token.
pub(super) fn token_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(
        TOKEN_COOKIE_NAME,
        token,
        config.token_ttl_seconds(),
        config.cookie_secure(),
    )
}

fn clear_cookie(config: &AuthConfig, name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(name, "", 0, config.cookie_secure())
}

/// Flag the caller's session as authenticated, creating one if needed.
///
/// Returns the `Set-Cookie` value when a new session was created. The cookie
/// is built before the store write so a failure leaves nothing behind.
pub(super) async fn establish_session(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<Option<HeaderValue>, ApiError> {
    if let Some(existing) = extract_cookie(headers, SESSION_COOKIE_NAME) {
        let session_hash = hash_session_token(&existing);
        let marked = auth_state
            .sessions()
            .mark_authenticated(&session_hash)
            .await
            .map_err(ApiError::Store)?;
        if marked {
            debug!("Existing session marked authenticated");
            return Ok(None);
        }
    }

    let session_token = generate_session_token().map_err(ApiError::Internal)?;
    let cookie = session_cookie(auth_state.config(), &session_token)
        .map_err(|err| ApiError::Internal(anyhow!("failed to build session cookie: {err}")))?;
    let session_hash = hash_session_token(&session_token);

    auth_state
        .sessions()
        .create(
            &session_hash,
            true,
            auth_state.config().session_ttl_seconds(),
        )
        .await
        .map_err(ApiError::Store)?;

    Ok(Some(cookie))
}

/// Whether the request carries a live, authenticated session.
pub(crate) async fn session_authenticated(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<bool, ApiError> {
    let Some(session_token) = extract_cookie(headers, SESSION_COOKIE_NAME) else {
        return Ok(false);
    };
    let session_hash = hash_session_token(&session_token);
    let record = auth_state
        .sessions()
        .lookup(&session_hash)
        .await
        .map_err(ApiError::Store)?;
    Ok(record.is_some_and(|session| session.authenticated))
}

/// Middleware guarding the HTML pages.
pub async fn require_session(
    Extension(auth_state): Extension<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = session_authenticated(request.headers(), &auth_state).await;
    match authenticated {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            debug!(path = %request.uri().path(), "No authenticated session, redirecting");
            Redirect::to(LOGIN_PAGE).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session destroyed and cookies cleared", body = MessageResponse),
        (status = 500, description = "Session could not be destroyed", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> Response {
    // Cookies are cleared whatever happens to the server-side session. The
    // signed token is not revoked and stays usable until it expires.
    let mut response_headers = HeaderMap::new();
    for name in [TOKEN_COOKIE_NAME, SESSION_COOKIE_NAME] {
        if let Ok(cookie) = clear_cookie(auth_state.config(), name) {
            response_headers.append(SET_COOKIE, cookie);
        }
    }

    let outcome = match extract_cookie(&headers, SESSION_COOKIE_NAME) {
        Some(session_token) => {
            let session_hash = hash_session_token(&session_token);
            auth_state.sessions().destroy(&session_hash).await
        }
        None => Ok(()),
    };

    match outcome {
        Ok(()) => (
            StatusCode::OK,
            response_headers,
            Json(MessageResponse::new("Logged out successfully")),
        )
            .into_response(),
        Err(err) => (response_headers, ApiError::Session(err)).into_response(),
    }
}
