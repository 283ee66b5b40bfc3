use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{load_quiz, require_quiz_owner, CurrentUser};
use crate::api::{attempts, invitations};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::SubmissionStatus;
use crate::schemas::invitation::InvitationResponse;
use crate::schemas::quiz::{
    QuizPointsResponse, RedistributeRequest, RosterEntryResponse, RosterResponse,
};
use crate::services::score_aggregator::max_score;
use crate::services::{invitations as invitation_service, progress, quiz_points};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:quiz_id/attempts", post(attempts::start))
        .route("/:quiz_id/accept", post(accept_invitation))
        .route("/:quiz_id/total-score", put(redistribute))
        .route("/:quiz_id/submissions", get(roster))
        .route("/:quiz_id/invitations", post(invitations::invite).get(invitations::list))
        .route("/:quiz_id/invitations/:invitation_id", delete(invitations::remove))
}

async fn accept_invitation(
    Path(quiz_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let quiz = load_quiz(&state, &quiz_id).await?;
    let invitation =
        invitation_service::accept(&state, &quiz.id, &user.email, primitive_now_utc()).await?;
    Ok(Json(invitation.into()))
}

async fn redistribute(
    Path(quiz_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<RedistributeRequest>,
) -> Result<Json<QuizPointsResponse>, ApiError> {
    let quiz = require_quiz_owner(&state, &user, &quiz_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = quiz_points::redistribute_total(
        &state,
        &quiz,
        payload.target_total,
        payload.expected_revision,
    )
    .await?;

    Ok(Json(QuizPointsResponse::from(&updated)))
}

async fn roster(
    Path(quiz_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<RosterResponse>, ApiError> {
    let quiz = require_quiz_owner(&state, &user, &quiz_id).await?;
    let submissions = state.store().list_submissions(&quiz.id).await?;

    let pending_review = submissions
        .iter()
        .filter(|submission| submission.status == SubmissionStatus::PendingReview)
        .count();
    let students = progress::roster(&quiz, &submissions)
        .into_iter()
        .map(RosterEntryResponse::from)
        .collect();

    Ok(Json(RosterResponse {
        quiz_id: quiz.id.clone(),
        max_score: max_score(&quiz),
        pending_review,
        students,
    }))
}
