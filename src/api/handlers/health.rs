use crate::GIT_COMMIT_HASH;
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::auth::AuthState;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database is reachable", body = Health),
        (status = 503, description = "Database is unreachable", body = Health)
    ),
    tag = "health"
)]
pub async fn health(
    method: Method,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let database = auth_state.users().ping().await;
    if let Err(err) = &database {
        error!("Failed to ping database: {err:#}");
    }

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database.is_ok() { "ok" } else { "error" }.to_string(),
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    match format!("{}:{}:{}", health.name, health.version, short_hash).parse::<HeaderValue>() {
        Ok(x_app) => {
            debug!("X-App header: {:?}", x_app);
            headers.insert("X-App", x_app);
        }
        Err(err) => error!("Failed to parse X-App header: {}", err),
    }

    let status = if database.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, body)
}
