use clap::{Arg, ArgMatches, Command};

pub const ARG_QUIZ_API_URL: &str = "quiz-api-url";
pub const ARG_QUIZ_TIMEOUT_SECONDS: &str = "quiz-timeout-seconds";

pub const DEFAULT_QUIZ_API_URL: &str = "https://marcconrad.com/uob/banana/api.php";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse upstream quiz API arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL is not absolute or the timeout is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let url = matches
            .get_one::<String>(ARG_QUIZ_API_URL)
            .cloned()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_QUIZ_API_URL.to_string());

        url::Url::parse(&url)
            .map_err(|err| anyhow::anyhow!("invalid --{ARG_QUIZ_API_URL} {url}: {err}"))?;

        let timeout_seconds = matches
            .get_one::<u64>(ARG_QUIZ_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(5);
        if timeout_seconds == 0 {
            anyhow::bail!("--{ARG_QUIZ_TIMEOUT_SECONDS} must be greater than zero");
        }

        Ok(Self {
            url,
            timeout_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_QUIZ_API_URL)
                .long(ARG_QUIZ_API_URL)
                .help("Upstream quiz question API")
                .env("QUIZ_API_URL")
                .default_value(DEFAULT_QUIZ_API_URL),
        )
        .arg(
            Arg::new(ARG_QUIZ_TIMEOUT_SECONDS)
                .long(ARG_QUIZ_TIMEOUT_SECONDS)
                .help("Timeout in seconds for the upstream quiz API call")
                .env("QUIZ_API_TIMEOUT_SECONDS")
                .default_value("5")
                .value_parser(clap::value_parser!(u64)),
        )
}
