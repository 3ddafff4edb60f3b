//! Player feedback: free text and/or a rating.

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
    auth::{require_token, AuthState},
    payload::{lenient, Payload},
};
use crate::api::{
    error::{ApiError, MessageResponse},
    storage::{FeedbackLedger, FeedbackRecord},
};

pub(crate) const FEEDBACK_REQUIRED: &str = "Either feedback or rating is required.";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct FeedbackSubmission {
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    pub rating: Option<i32>,
}

impl FeedbackSubmission {
    /// Empty text and a zero rating count as not given.
    fn normalized(self) -> (Option<String>, Option<i32>) {
        (
            self.feedback.filter(|text| !text.is_empty()),
            self.rating.filter(|rating| *rating != 0),
        )
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FeedbackList {
    pub feedback: Vec<FeedbackRecord>,
}

#[utoipa::path(
    post,
    path = "/submit-feedback",
    request_body(content(
        (FeedbackSubmission = "application/json"),
        (FeedbackSubmission = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 200, description = "Feedback appended", body = MessageResponse),
        (status = 400, description = "Neither feedback nor rating given", body = MessageResponse),
        (status = 401, description = "No token", body = MessageResponse),
        (status = 403, description = "Invalid or expired token", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    ),
    tag = "feedback"
)]
#[instrument(skip_all)]
pub async fn submit_feedback(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(ledger): Extension<Arc<dyn FeedbackLedger>>,
    payload: Result<Payload<FeedbackSubmission>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = require_token(&headers, &auth_state)?;
    let Payload(submission) = payload?;

    let (feedback, rating) = submission.normalized();
    if feedback.is_none() && rating.is_none() {
        return Err(ApiError::Validation(FEEDBACK_REQUIRED.to_string()));
    }

    ledger
        .insert_feedback(&identity.username, feedback.as_deref(), rating)
        .await
        .map_err(ApiError::Store)?;

    debug!(username = %identity.username, "Feedback stored");
    Ok(Json(MessageResponse::new("Feedback submitted successfully!")))
}

#[utoipa::path(
    get,
    path = "/get-feedback",
    responses(
        (status = 200, description = "Caller's submissions in insertion order", body = FeedbackList),
        (status = 401, description = "No token", body = MessageResponse),
        (status = 403, description = "Invalid or expired token", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    ),
    tag = "feedback"
)]
#[instrument(skip_all)]
pub async fn get_feedback(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(ledger): Extension<Arc<dyn FeedbackLedger>>,
) -> Result<Json<FeedbackList>, ApiError> {
    let identity = require_token(&headers, &auth_state)?;
    let feedback = ledger
        .feedback_for(&identity.username)
        .await
        .map_err(ApiError::Store)?;
    Ok(Json(FeedbackList { feedback }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_and_zero_rating_are_absent() {
        let submission = FeedbackSubmission {
            feedback: Some(String::new()),
            rating: Some(0),
        };
        assert_eq!(submission.normalized(), (None, None));
    }

    #[test]
    fn given_fields_survive_normalization() {
        let submission = FeedbackSubmission {
            feedback: Some("ok".to_string()),
            rating: None,
        };
        assert_eq!(submission.normalized(), (Some("ok".to_string()), None));

        let submission = FeedbackSubmission {
            feedback: None,
            rating: Some(4),
        };
        assert_eq!(submission.normalized(), (None, Some(4)));
    }

    #[test]
    fn missing_fields_deserialize_as_none() -> anyhow::Result<()> {
        let submission: FeedbackSubmission = serde_json::from_str(r#"{"rating": null}"#)?;
        assert!(submission.feedback.is_none());
        assert!(submission.rating.is_none());
        Ok(())
    }
}
