use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::repositories::StoreError;
use crate::services::WorkflowError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn status_and_detail(self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.to_string()),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Unprocessable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::NotFound(format!("{entity} '{id}' not found")),
            StoreError::Database(err) => ApiError::internal(err, "Storage operation failed"),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Store(err) => err.into(),
            WorkflowError::QuizNotFound(_) => ApiError::NotFound("Quiz not found".to_string()),
            WorkflowError::AttemptNotFound(_) => {
                ApiError::NotFound("Attempt not found".to_string())
            }
            WorkflowError::SubmissionNotFound(_) => {
                ApiError::NotFound("Submission not found".to_string())
            }
            WorkflowError::InvitationNotFound => {
                ApiError::NotFound("Invitation not found".to_string())
            }
            err @ (WorkflowError::AttemptClosed(_)
            | WorkflowError::InvitationLocked { .. }
            | WorkflowError::RevisionConflict { .. }
            | WorkflowError::ScoringConflict { .. }) => ApiError::Conflict(err.to_string()),
            err @ WorkflowError::InvalidTarget { .. } => ApiError::Unprocessable(err.to_string()),
        }
    }
}
