//! Passthrough to the external banana question API.

use anyhow::{anyhow, Context, Result};
use axum::{extract::Extension, Json};
use reqwest::Client;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{info_span, instrument, Instrument};

use crate::api::error::{ApiError, MessageResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct QuizConfig {
    url: String,
    timeout: Duration,
}

impl QuizConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// HTTP client bound to the configured question endpoint.
#[derive(Debug)]
pub struct QuizProxy {
    client: Client,
    url: String,
}

impl QuizProxy {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &QuizConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build quiz HTTP client")?;
        Ok(Self {
            client,
            url: config.url().to_string(),
        })
    }

    /// Fetch one question and return the upstream JSON untouched.
    ///
    /// # Errors
    /// Transport failures, timeouts, non-success statuses and non-JSON bodies.
    pub async fn fetch_question(&self) -> Result<Value> {
        let span = info_span!("quiz.fetch", http.method = "GET", url = %self.url);
        async {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .context("quiz request failed")?;
            let status = response.status();
            if !status.is_success() {
                return Err(anyhow!("quiz API answered {status}"));
            }
            response
                .json::<Value>()
                .await
                .context("quiz API returned invalid JSON")
        }
        .instrument(span)
        .await
    }
}

#[utoipa::path(
    get,
    path = "/quiz",
    responses(
        (status = 200, description = "Question as returned by the upstream API", content_type = "application/json"),
        (status = 500, description = "Upstream unreachable, slow or malformed", body = MessageResponse)
    ),
    tag = "quiz"
)]
#[instrument(skip_all)]
pub async fn quiz(Extension(proxy): Extension<Arc<QuizProxy>>) -> Result<Json<Value>, ApiError> {
    proxy
        .fetch_question()
        .await
        .map(Json)
        .map_err(ApiError::Upstream)
}
