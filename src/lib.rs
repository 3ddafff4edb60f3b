//! # Bananaquiz (Quiz Game Backend)
//!
//! `bananaquiz` serves the quiz game front-end and its small JSON API: account
//! registration and login, a passthrough to the external banana question API,
//! score submission with a leaderboard, and player feedback.
//!
//! ## Two Authorization Paths
//!
//! A successful login hands the client two independent credentials:
//!
//! - **Session cookie** (`quiz_session`): references a server-side session row
//!   with an `authenticated` flag. It gates the HTML pages (`/game`,
//!   `/leaderboard`, ...) and expires one hour after creation.
//! - **Access token** (`token`): an HS256 JWT carrying `{id, username}` that
//!   gates score and feedback endpoints. It is stateless and expires after 24
//!   hours.
//!
//! The paths never consult each other. Logging out destroys the session and
//! clears the token cookie, but a copied token stays valid until it expires.
//!
//! ## Ledgers
//!
//! Scores and feedback are append-only. The leaderboard computes each player's
//! best row at read time instead of keeping a running maximum.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
