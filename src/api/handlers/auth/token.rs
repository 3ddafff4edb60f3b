//! Signed access tokens (HS256 JWT).
//!
//! Claims are `{id, username, iat, exp}`. Expiry is checked here against an
//! explicit clock with zero leeway, so a token is valid for exactly its TTL.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller identity carried by a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub id: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),
}

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced in `verify` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a token for `identity` issued at `now` (Unix seconds).
    ///
    /// # Errors
    /// Returns [`TokenError::Sign`] if encoding fails.
    pub fn issue(&self, identity: &Identity, now: i64) -> Result<String, TokenError> {
        let claims = AccessClaims {
            id: identity.id,
            username: identity.username.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify signature and expiry at `now` (Unix seconds).
    ///
    /// # Errors
    /// Returns [`TokenError::Invalid`] for a bad signature or malformed token and
    /// [`TokenError::Expired`] once `now` reaches `exp`.
    pub fn verify(&self, token: &str, now: i64) -> Result<Identity, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Invalid)?;
        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(Identity {
            id: data.claims.id,
            username: data.claims.username,
        })
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("keys", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
