//! Score submission and the leaderboard.

use axum::{
    extract::Extension,
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{
    auth::{optional_identity, require_token, AuthState},
    payload::{lenient, Payload},
};
use crate::api::{
    error::{ApiError, MessageResponse},
    storage::{LeaderboardRow, ScoreLedger},
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ScoreSubmission {
    #[serde(deserialize_with = "lenient::integer")]
    pub level: i64,
    #[serde(deserialize_with = "lenient::integer")]
    pub score: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub level: i64,
    pub high_score: i64,
    /// Present (and `true`) only on the caller's own row.
    #[serde(
        rename = "isCurrentUser",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_current_user: bool,
}

fn annotate(rows: Vec<LeaderboardRow>, caller: Option<&str>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .map(|row| LeaderboardEntry {
            is_current_user: caller == Some(row.username.as_str()),
            username: row.username,
            level: row.level,
            high_score: row.high_score,
        })
        .collect()
}

#[utoipa::path(
    post,
    path = "/submit-score",
    request_body(content(
        (ScoreSubmission = "application/json"),
        (ScoreSubmission = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 200, description = "Score appended", body = MessageResponse),
        (status = 400, description = "Malformed body", body = MessageResponse),
        (status = 401, description = "No token", body = MessageResponse),
        (status = 403, description = "Invalid or expired token", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    ),
    tag = "scores"
)]
#[instrument(skip_all)]
pub async fn submit_score(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(scores): Extension<Arc<dyn ScoreLedger>>,
    payload: Result<Payload<ScoreSubmission>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = require_token(&headers, &auth_state)?;
    let Payload(submission) = payload?;

    scores
        .insert_score(&identity.username, submission.level, submission.score)
        .await
        .map_err(ApiError::Store)?;

    debug!(
        username = %identity.username,
        level = submission.level,
        score = submission.score,
        "Score saved"
    );
    Ok(Json(MessageResponse::new("Score saved successfully!")))
}

#[utoipa::path(
    get,
    path = "/scoreboard-list",
    responses(
        (status = 200, description = "Best row per player, best first", body = [LeaderboardEntry]),
        (status = 500, description = "Store failure", body = MessageResponse)
    ),
    tag = "scores"
)]
#[instrument(skip_all)]
pub async fn scoreboard_list(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(scores): Extension<Arc<dyn ScoreLedger>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let caller = optional_identity(&headers, &auth_state);
    let rows = scores.leaderboard().await.map_err(ApiError::Store)?;
    Ok(Json(annotate(
        rows,
        caller.as_ref().map(|identity| identity.username.as_str()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(username: &str, level: i64, high_score: i64) -> LeaderboardRow {
        LeaderboardRow {
            username: username.to_string(),
            level,
            high_score,
        }
    }

    #[test]
    fn only_callers_rows_are_flagged() {
        let entries = annotate(vec![row("bob", 2, 20), row("alice", 1, 10)], Some("alice"));
        assert!(!entries[0].is_current_user);
        assert!(entries[1].is_current_user);
    }

    #[test]
    fn anonymous_caller_flags_nothing() {
        let entries = annotate(vec![row("alice", 1, 10)], None);
        assert!(entries.iter().all(|entry| !entry.is_current_user));
    }

    #[test]
    fn flag_is_omitted_unless_set() -> anyhow::Result<()> {
        let entries = annotate(vec![row("bob", 2, 20), row("alice", 1, 10)], Some("alice"));
        assert_eq!(
            serde_json::to_value(&entries)?,
            json!([
                {"username": "bob", "level": 2, "high_score": 20},
                {"username": "alice", "level": 1, "high_score": 10, "isCurrentUser": true}
            ])
        );
        Ok(())
    }
}
