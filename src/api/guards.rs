use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Attempt, Quiz, Submission};
use crate::services::invitations::normalize_email;

pub(crate) const USER_ID_HEADER: &str = "x-user-id";
pub(crate) const USER_EMAIL_HEADER: &str = "x-user-email";

/// Identity forwarded by the authentication gateway.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser {
    pub(crate) id: String,
    pub(crate) email: String,
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, USER_ID_HEADER)
            .ok_or(ApiError::Unauthorized("Missing authenticated user"))?;
        let email = header_value(parts, USER_EMAIL_HEADER)
            .ok_or(ApiError::Unauthorized("Missing authenticated user"))?;

        Ok(CurrentUser { id: id.to_string(), email: normalize_email(email) })
    }
}

pub(crate) async fn load_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    state
        .store()
        .load_quiz(quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))
}

pub(crate) async fn require_quiz_owner(
    state: &AppState,
    user: &CurrentUser,
    quiz_id: &str,
) -> Result<Quiz, ApiError> {
    let quiz = load_quiz(state, quiz_id).await?;
    if quiz.teacher_id != user.id {
        return Err(ApiError::Forbidden("Only the quiz owner can do this"));
    }
    Ok(quiz)
}

pub(crate) async fn require_attempt_owner(
    state: &AppState,
    user: &CurrentUser,
    attempt_id: &str,
) -> Result<Attempt, ApiError> {
    let attempt = state
        .store()
        .find_attempt(attempt_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;
    if attempt.student_id != user.id {
        return Err(ApiError::Forbidden("Attempt belongs to another student"));
    }
    Ok(attempt)
}

pub(crate) async fn load_submission(
    state: &AppState,
    submission_id: &str,
) -> Result<Submission, ApiError> {
    state
        .store()
        .find_submission(submission_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))
}
