//! Token gate: authorization for the score and feedback endpoints.
//!
//! Flow Overview: read the `token` cookie (or an `Authorization: Bearer`
//! header), verify its signature and expiry, and return the identity it names.
//! Session state is never consulted here.

use axum::http::HeaderMap;
use tracing::debug;

use super::{
    session::TOKEN_COOKIE_NAME,
    state::AuthState,
    token::{Identity, TokenError},
    utils::{extract_bearer_token, extract_cookie, unix_now},
};
use crate::api::error::ApiError;

fn presented_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie(headers, TOKEN_COOKIE_NAME).or_else(|| extract_bearer_token(headers))
}

/// Resolve the presented token into an identity.
///
/// Missing token is 401, a bad signature or an expired token is 403.
pub fn require_token(headers: &HeaderMap, auth_state: &AuthState) -> Result<Identity, ApiError> {
    require_token_at(headers, auth_state, unix_now())
}

pub(crate) fn require_token_at(
    headers: &HeaderMap,
    auth_state: &AuthState,
    now: i64,
) -> Result<Identity, ApiError> {
    let token = presented_token(headers).ok_or(ApiError::Unauthorized)?;
    auth_state.signer().verify(&token, now).map_err(|err| {
        match &err {
            TokenError::Expired => debug!("Rejected expired token"),
            other => debug!("Rejected token: {other}"),
        }
        ApiError::Forbidden
    })
}

/// Identity of the caller when a valid token is presented, `None` otherwise.
pub fn optional_identity(headers: &HeaderMap, auth_state: &AuthState) -> Option<Identity> {
    require_token(headers, auth_state).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{handlers::auth::AuthConfig, storage::memory::MemoryStore};
    use axum::http::{header::AUTHORIZATION, header::COOKIE, HeaderValue};
    use secrecy::SecretString;
    use std::sync::Arc;

    fn auth_state() -> AuthState {
        let store = Arc::new(MemoryStore::default());
        AuthState::new(
            AuthConfig::new(SecretString::from("gate-secret".to_string())),
            store.clone(),
            store,
        )
    }

    fn alice() -> Identity {
        Identity {
            id: 7,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let state = auth_state();
        let result = require_token(&HeaderMap::new(), &state);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn cookie_token_yields_identity() -> anyhow::Result<()> {
        let state = auth_state();
        let token = state.signer().issue(&alice(), unix_now())?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("token={token}"))?);
        let identity = require_token(&headers, &state)?;
        assert_eq!(identity, alice());
        Ok(())
    }

    #[test]
    fn bearer_header_is_accepted() -> anyhow::Result<()> {
        let state = auth_state();
        let token = state.signer().issue(&alice(), unix_now())?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        assert_eq!(require_token(&headers, &state)?, alice());
        Ok(())
    }

    #[test]
    fn garbage_token_is_forbidden() -> anyhow::Result<()> {
        let state = auth_state();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=not-a-jwt"));
        assert!(matches!(
            require_token(&headers, &state),
            Err(ApiError::Forbidden)
        ));
        assert!(optional_identity(&headers, &state).is_none());
        Ok(())
    }

    #[test]
    fn expired_token_is_forbidden() -> anyhow::Result<()> {
        let state = auth_state();
        let issued_at = 1_000;
        let token = state.signer().issue(&alice(), issued_at)?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("token={token}"))?);
        let expiry = issued_at + state.signer().ttl_seconds();
        assert!(require_token_at(&headers, &state, expiry - 1).is_ok());
        assert!(matches!(
            require_token_at(&headers, &state, expiry),
            Err(ApiError::Forbidden)
        ));
        Ok(())
    }
}
