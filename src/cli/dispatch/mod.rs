//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, quiz, ARG_DSN, ARG_PORT, ARG_PUBLIC_DIR};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let public_dir = matches
        .get_one::<String>(ARG_PUBLIC_DIR)
        .map_or_else(|| PathBuf::from("public"), PathBuf::from);

    let auth_opts = auth::Options::parse(matches)?;
    let quiz_opts = quiz::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        public_dir,
        jwt_secret: auth_opts.jwt_secret,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        cookie_secure: auth_opts.cookie_secure,
        quiz_api_url: quiz_opts.url,
        quiz_timeout_seconds: quiz_opts.timeout_seconds,
    }))
}
