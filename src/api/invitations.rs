use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_quiz_owner, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::invitation::{InvitationResponse, InviteRequest, InviteResultResponse};
use crate::services::invitations::{self, Invitee};

pub(crate) async fn invite(
    Path(quiz_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<InviteRequest>,
) -> Result<Json<Vec<InviteResultResponse>>, ApiError> {
    let quiz = require_quiz_owner(&state, &user, &quiz_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let invitees = payload
        .invitees
        .into_iter()
        .map(|invitee| Invitee { email: invitee.email, name: invitee.name })
        .collect();
    let results = invitations::invite(&state, &quiz, invitees, primitive_now_utc()).await?;

    Ok(Json(
        results
            .into_iter()
            .map(|result| InviteResultResponse {
                created: result.created,
                invitation: result.invitation.into(),
            })
            .collect(),
    ))
}

pub(crate) async fn list(
    Path(quiz_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    let quiz = require_quiz_owner(&state, &user, &quiz_id).await?;
    let invitations = state.store().list_invitations(&quiz.id).await?;
    Ok(Json(invitations.into_iter().map(InvitationResponse::from).collect()))
}

pub(crate) async fn remove(
    Path((quiz_id, invitation_id)): Path<(String, String)>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let quiz = require_quiz_owner(&state, &user, &quiz_id).await?;
    invitations::remove(&state, &quiz.id, &invitation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
