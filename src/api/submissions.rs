use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{load_quiz, load_submission, require_quiz_owner, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::schemas::submission::{
    GradeRequest, GradingViewResponse, StudentResultResponse, SubmissionResponse,
};
use crate::services::review;
use crate::services::submission_lifecycle::student_result_now;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:submission_id/result", get(get_result))
        .route("/:submission_id/grading", get(get_grading))
        .route("/:submission_id/grade", post(grade))
}

async fn get_result(
    Path(submission_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StudentResultResponse>, ApiError> {
    let submission = load_submission(&state, &submission_id).await?;
    let quiz = load_quiz(&state, &submission.quiz_id).await?;

    if submission.student_id != user.id && quiz.teacher_id != user.id {
        return Err(ApiError::Forbidden("Access denied"));
    }

    Ok(Json(StudentResultResponse {
        result: student_result_now(&quiz, &submission),
        submission_id: submission.id,
        quiz_id: submission.quiz_id,
        status: submission.status,
        submitted_at: format_primitive(submission.submitted_at),
    }))
}

async fn get_grading(
    Path(submission_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<GradingViewResponse>, ApiError> {
    let submission = load_submission(&state, &submission_id).await?;
    let quiz = require_quiz_owner(&state, &user, &submission.quiz_id).await?;

    let view = review::grading_view(&quiz, &submission);
    Ok(Json(GradingViewResponse {
        submission_id: submission.id,
        status: submission.status,
        score: submission.score,
        materialized: view.materialized,
        seed: view.seed,
        record: view.record,
    }))
}

async fn grade(
    Path(submission_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = load_submission(&state, &submission_id).await?;
    let quiz = require_quiz_owner(&state, &user, &submission.quiz_id).await?;

    let graded = review::grade_submission(
        &state,
        &quiz,
        &submission,
        &payload.overrides,
        primitive_now_utc(),
    )
    .await?;

    Ok(Json(graded.into()))
}
