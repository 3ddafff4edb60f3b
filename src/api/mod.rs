use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{path::Path, path::PathBuf, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;

pub(crate) mod error;
pub mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;
pub mod storage;

pub use error::{ApiError, MessageResponse};
pub use openapi::openapi;

use handlers::{
    auth::{AuthConfig, AuthState},
    pages,
    quiz::{QuizConfig, QuizProxy},
};
use storage::{FeedbackLedger, PgStore, ScoreLedger};

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Shared state handed to handlers through `Extension` layers.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<AuthState>,
    pub scores: Arc<dyn ScoreLedger>,
    pub feedback: Arc<dyn FeedbackLedger>,
    pub quiz: Arc<QuizProxy>,
}

/// Full application: documented API routes, HTML pages and static assets.
pub fn app(services: &Services, public_dir: &Path) -> Router {
    let (router, _openapi) = router().split_for_parts();
    router.merge(pages::router(public_dir)).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(services.auth.clone()))
            .layer(Extension(services.scores.clone()))
            .layer(Extension(services.feedback.clone()))
            .layer(Extension(services.quiz.clone())),
    )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: &str,
    auth_config: AuthConfig,
    quiz_config: QuizConfig,
    public_dir: PathBuf,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    storage::apply_schema(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let services = Services {
        auth: Arc::new(AuthState::new(auth_config, store.clone(), store.clone())),
        scores: store.clone(),
        feedback: store,
        quiz: Arc::new(QuizProxy::new(&quiz_config)?),
    };

    if !public_dir.is_dir() {
        warn!(
            public_dir = %public_dir.display(),
            "Public directory not found, pages will answer 404"
        );
    }

    let app = app(&services, &public_dir);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
pub(crate) mod test_support;
