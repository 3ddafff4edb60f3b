//! Persistence seams for users, sessions, scores and feedback.
//!
//! Handlers only see these traits. The server wires in [`PgStore`]; tests use
//! an in-memory implementation.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{future::Future, pin::Pin};
use utoipa::ToSchema;

mod postgres;
pub use postgres::{apply_schema, PgStore};

#[cfg(test)]
pub(crate) mod memory;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of inserting a new user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Conflict,
}

/// Stored credentials for a single user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Live (non-expired) session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRecord {
    pub authenticated: bool,
}

/// Best score of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub username: String,
    pub level: i64,
    pub high_score: i64,
}

/// One feedback submission as read back by its author.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub feedback: Option<String>,
    pub rating: Option<i32>,
}

/// Username / password-hash pairs.
pub trait CredentialStore: Send + Sync {
    /// Insert a user; a duplicate username yields [`InsertOutcome::Conflict`].
    fn insert_user<'a>(
        &'a self,
        username: &'a str,
        password_hash: &'a str,
    ) -> BoxFuture<'a, Result<InsertOutcome>>;

    fn find_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<Option<UserRecord>>>;

    /// Cheap liveness check used by `/health`.
    fn ping(&self) -> BoxFuture<'_, Result<()>>;
}

/// Server-side sessions keyed by the hash of the cookie value.
///
/// Expired sessions behave exactly like missing ones.
pub trait SessionStore: Send + Sync {
    fn create<'a>(
        &'a self,
        session_hash: &'a [u8],
        authenticated: bool,
        ttl_seconds: i64,
    ) -> BoxFuture<'a, Result<()>>;

    fn lookup<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<Option<SessionRecord>>>;

    /// Flag a live session as authenticated. Returns `false` when no live
    /// session matches.
    fn mark_authenticated<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<bool>>;

    fn destroy<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<()>>;
}

/// Append-only score log.
pub trait ScoreLedger: Send + Sync {
    fn insert_score<'a>(&'a self, username: &'a str, level: i64, score: i64)
        -> BoxFuture<'a, Result<()>>;

    /// Best row per player, highest score first, then highest level, then
    /// username.
    fn leaderboard(&self) -> BoxFuture<'_, Result<Vec<LeaderboardRow>>>;
}

/// Append-only feedback log.
pub trait FeedbackLedger: Send + Sync {
    fn insert_feedback<'a>(
        &'a self,
        username: &'a str,
        feedback: Option<&'a str>,
        rating: Option<i32>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Every submission of `username`, in insertion order.
    fn feedback_for<'a>(&'a self, username: &'a str)
        -> BoxFuture<'a, Result<Vec<FeedbackRecord>>>;
}
