//! Auth handlers and both authorization gates.
//!
//! ## Two Credentials
//!
//! A successful login sets two `HttpOnly` cookies:
//!
//! - `quiz_session`: opaque identifier of a server-side session. Only its
//!   SHA-256 hash is stored. The session gate admits page requests when the
//!   session is live and authenticated.
//! - `token`: HS256 JWT with `{id, username, iat, exp}`. The token gate admits
//!   score and feedback requests when the signature checks out and `exp` has
//!   not passed.
//!
//! The gates are independent. Logout destroys the session and clears both
//! cookies, but a copied token stays valid until it expires.

pub(crate) mod login;
mod password;
pub(crate) mod principal;
pub(crate) mod register;
pub(crate) mod session;
mod state;
mod token;
pub(crate) mod types;
mod utils;

pub use principal::{optional_identity, require_token};
pub use session::require_session;
pub use state::{AuthConfig, AuthState};
pub use token::{AccessClaims, Identity, TokenError, TokenSigner};
#[cfg(test)]
pub(crate) use utils::hash_session_token;
