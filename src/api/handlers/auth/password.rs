//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings with a random per-password salt. Hashing is CPU
//! bound, so the async wrappers move it onto the blocking pool.

use anyhow::{anyhow, Context, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use std::sync::OnceLock;

/// Hash a password into a PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| anyhow!("failed to hash password"))
}

/// Check a password against a stored PHC string.
pub(crate) fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|_| anyhow!("invalid stored password hash"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub(crate) async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")?
}

pub(crate) async fn verify_password_blocking(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .context("password verification task failed")?
}

/// Spend the same work as a real verification when the username is unknown,
/// so response timing does not reveal which usernames exist.
pub(crate) async fn burn_verification(password: String) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let _ = tokio::task::spawn_blocking(move || {
        let dummy = DUMMY_HASH.get_or_init(|| hash_password("bananaquiz-dummy-password").ok());
        if let Some(hash) = dummy {
            let _ = verify_password(&password, hash);
        }
    })
    .await;
}
