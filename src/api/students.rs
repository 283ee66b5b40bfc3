use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::schemas::invitation::StudentHistoryResponse;
use crate::services::progress;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:email/history", get(history))
}

/// Only the caller's own quizzes are reported.
async fn history(
    Path(email): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StudentHistoryResponse>, ApiError> {
    let history = progress::student_history(&state, &user.id, &email).await?;
    Ok(Json(history.into()))
}
