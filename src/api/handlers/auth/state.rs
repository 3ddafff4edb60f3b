//! Auth configuration and shared state.

use secrecy::SecretString;
use std::sync::Arc;

use super::token::TokenSigner;
use crate::api::storage::{CredentialStore, SessionStore};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    session_ttl_seconds: i64,
    token_ttl_seconds: i64,
    cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

/// Everything the auth handlers and both gates need.
pub struct AuthState {
    config: AuthConfig,
    signer: TokenSigner,
    users: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let signer = TokenSigner::new(&config.jwt_secret, config.token_ttl_seconds);
        Self {
            config,
            signer,
            users,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub(crate) fn users(&self) -> &dyn CredentialStore {
        self.users.as_ref()
    }

    pub(crate) fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }
}
