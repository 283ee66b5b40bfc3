use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{load_quiz, require_attempt_owner, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::schemas::attempt::{
    AttemptResponse, SaveAnswersRequest, SaveAnswersResponse, StartAttemptResponse, StartKind,
    SubmitAttemptRequest,
};
use crate::schemas::submission::StudentResultResponse;
use crate::services::attempt_gate::AttemptDecision;
use crate::services::attempt_timing::remaining_seconds;
use crate::services::attempts::{self, StartOutcome};
use crate::services::submission_lifecycle::student_result_now;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:attempt_id/answers", put(save_answers))
        .route("/:attempt_id/submit", post(submit))
}

/// Mounted under `/quizzes/:quiz_id/attempts`.
pub(crate) async fn start(
    Path(quiz_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<StartAttemptResponse>), ApiError> {
    let quiz = load_quiz(&state, &quiz_id).await?;
    let now = primitive_now_utc();

    let (status, kind, attempt) =
        match attempts::start_attempt(&state, &quiz, &user.id, &user.email, now).await? {
            StartOutcome::Started(attempt) => (StatusCode::CREATED, StartKind::Started, attempt),
            StartOutcome::Resumed(attempt) => (StatusCode::OK, StartKind::Resumed, attempt),
            StartOutcome::Blocked(AttemptDecision::MaxAttemptsReached { used, max })
            | StartOutcome::Blocked(AttemptDecision::Allowed { used, max }) => {
                return Err(ApiError::Conflict(format!(
                    "Maximum attempts reached ({used} of {max})"
                )));
            }
        };

    Ok((
        status,
        Json(StartAttemptResponse {
            outcome: kind,
            attempt: AttemptResponse::from_attempt(&quiz, attempt, now),
        }),
    ))
}

async fn save_answers(
    Path(attempt_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SaveAnswersRequest>,
) -> Result<Json<SaveAnswersResponse>, ApiError> {
    let attempt = require_attempt_owner(&state, &user, &attempt_id).await?;

    attempts::save_draft(&state, &attempt, &payload.answers).await?;

    Ok(Json(SaveAnswersResponse {
        remaining_seconds: remaining_seconds(attempt.expires_at, primitive_now_utc()),
        attempt_id: attempt.id,
        saved: true,
    }))
}

async fn submit(
    Path(attempt_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<(StatusCode, Json<StudentResultResponse>), ApiError> {
    let attempt = require_attempt_owner(&state, &user, &attempt_id).await?;

    let outcome =
        attempts::submit_attempt(&state, &attempt, payload.answers, primitive_now_utc()).await?;
    let quiz = load_quiz(&state, &outcome.submission.quiz_id).await?;
    let submission = outcome.submission;

    let status = if outcome.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(StudentResultResponse {
            result: student_result_now(&quiz, &submission),
            submission_id: submission.id,
            quiz_id: submission.quiz_id,
            status: submission.status,
            submitted_at: format_primitive(submission.submitted_at),
        }),
    ))
}
