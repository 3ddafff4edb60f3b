use anyhow::bail;
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[derive(Debug, Clone)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub token_ttl_seconds: i64,
    pub cookie_secure: bool,
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the signing secret is missing or a TTL is not positive.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let jwt_secret = match matches.get_one::<String>(ARG_JWT_SECRET) {
            Some(value) if !value.trim().is_empty() => SecretString::from(value.clone()),
            _ => bail!("missing required argument: --{ARG_JWT_SECRET}"),
        };

        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(3600);
        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(86_400);

        if session_ttl_seconds <= 0 {
            bail!("--{ARG_SESSION_TTL_SECONDS} must be greater than zero");
        }
        if token_ttl_seconds <= 0 {
            bail!("--{ARG_TOKEN_TTL_SECONDS} must be greater than zero");
        }

        Ok(Self {
            jwt_secret,
            session_ttl_seconds,
            token_ttl_seconds,
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign and verify access tokens")
                .env("QUIZ_JWT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session lifetime in seconds, fixed from creation")
                .env("QUIZ_SESSION_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Access token lifetime in seconds")
                .env("QUIZ_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark session and token cookies as Secure (HTTPS only)")
                .env("QUIZ_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}
