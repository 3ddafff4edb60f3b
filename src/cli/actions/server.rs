use crate::api::{
    self,
    handlers::{auth::AuthConfig, quiz::QuizConfig},
};
use anyhow::Result;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub public_dir: PathBuf,
    pub jwt_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub token_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub quiz_api_url: String,
    pub quiz_timeout_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the schema cannot be applied, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        port = args.port,
        public_dir = %args.public_dir.display(),
        quiz_api_url = %args.quiz_api_url,
        "Starting server"
    );

    let auth_config = AuthConfig::new(args.jwt_secret)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_cookie_secure(args.cookie_secure);

    let quiz_config = QuizConfig::new(args.quiz_api_url)
        .with_timeout(Duration::from_secs(args.quiz_timeout_seconds));

    api::new(
        args.port,
        &args.dsn,
        auth_config,
        quiz_config,
        args.public_dir,
    )
    .await
}
