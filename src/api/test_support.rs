//! Router-level test harness backed by the in-memory store.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use secrecy::SecretString;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tempfile::TempDir;
use tower::ServiceExt;

use super::{
    app,
    handlers::{
        auth::{AuthConfig, AuthState},
        quiz::{QuizConfig, QuizProxy},
    },
    storage::memory::MemoryStore,
    Services,
};

pub(crate) const PAGES: &[&str] = &[
    "login.html",
    "register.html",
    "index.html",
    "leaderboard.html",
    "about.html",
    "feedback.html",
    "allfeedbacks.html",
    "scoreboard.html",
];

pub(crate) struct TestApp {
    pub(crate) store: Arc<MemoryStore>,
    router: Router,
    _public_dir: TempDir,
}

impl TestApp {
    pub(crate) fn new() -> Result<Self> {
        Self::with_quiz_url("http://127.0.0.1:9/api.php")
    }

    pub(crate) fn with_quiz_url(quiz_url: &str) -> Result<Self> {
        let public_dir = tempfile::tempdir()?;
        for page in PAGES {
            std::fs::write(public_dir.path().join(page), format!("<h1>{page}</h1>"))?;
        }
        std::fs::write(public_dir.path().join("style.css"), "body {}")?;

        let store = Arc::new(MemoryStore::default());
        let auth = Arc::new(AuthState::new(
            AuthConfig::new(SecretString::from("test-secret".to_string())),
            store.clone(),
            store.clone(),
        ));
        let quiz_config =
            QuizConfig::new(quiz_url).with_timeout(Duration::from_millis(500));
        let services = Services {
            auth,
            scores: store.clone(),
            feedback: store.clone(),
            quiz: Arc::new(QuizProxy::new(&quiz_config)?),
        };
        let router = app(&services, public_dir.path());

        Ok(Self {
            store,
            router,
            _public_dir: public_dir,
        })
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        cookies: Option<&str>,
    ) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookies) = cookies {
            builder = builder.header(COOKIE, cookies);
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        Ok(self.router.clone().oneshot(request).await?)
    }

    /// Post an HTML-form style body such as `username=alice&password=pw1`.
    pub(crate) async fn post_form(
        &self,
        path: &str,
        body: &str,
        cookies: Option<&str>,
    ) -> Result<Response> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookies) = cookies {
            builder = builder.header(COOKIE, cookies);
        }
        let request = builder.body(Body::from(body.to_string()))?;
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub(crate) async fn get(&self, path: &str, cookies: Option<&str>) -> Result<Response> {
        self.send(Method::GET, path, None, cookies).await
    }

    pub(crate) async fn post(
        &self,
        path: &str,
        body: Value,
        cookies: Option<&str>,
    ) -> Result<Response> {
        self.send(Method::POST, path, Some(body), cookies).await
    }

    pub(crate) async fn register(&self, username: &str, password: &str) -> Result<Response> {
        self.post(
            "/register",
            serde_json::json!({"username": username, "password": password}),
            None,
        )
        .await
    }

    /// Register and log in, returning the cookies to send back.
    pub(crate) async fn sign_in(&self, username: &str, password: &str) -> Result<String> {
        let registered = self.register(username, password).await?;
        anyhow::ensure!(registered.status() == StatusCode::OK, "register failed");
        let response = self
            .post(
                "/login",
                serde_json::json!({"username": username, "password": password}),
                None,
            )
            .await?;
        anyhow::ensure!(response.status() == StatusCode::OK, "login failed");
        Ok(cookie_header(&response))
    }
}

/// `name=value` pairs of every `Set-Cookie` header, ready for a `Cookie` header.
pub(crate) fn cookie_header(response: &Response) -> String {
    set_cookies(response)
        .iter()
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub(crate) async fn body_json(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    serde_json::from_slice(&bytes).context("response body is not JSON")
}

pub(crate) async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub(crate) async fn message(response: Response) -> Result<String> {
    let json = body_json(response).await?;
    json["message"]
        .as_str()
        .map(str::to_string)
        .context("response has no message")
}
