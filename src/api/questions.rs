use axum::{routing::post, Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::schemas::question::{
    QuestionIssueResponse, QuestionReport, ValidateQuestionsRequest, ValidateQuestionsResponse,
};
use crate::services::question_model::validate_question;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/validate", post(validate))
}

async fn validate(
    _user: CurrentUser,
    Json(payload): Json<ValidateQuestionsRequest>,
) -> Result<Json<ValidateQuestionsResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let questions: Vec<QuestionReport> = payload
        .questions
        .iter()
        .map(|question| {
            let issues: Vec<QuestionIssueResponse> =
                validate_question(question).into_iter().map(QuestionIssueResponse::from).collect();
            QuestionReport { question_id: question.id.clone(), valid: issues.is_empty(), issues }
        })
        .collect();

    Ok(Json(ValidateQuestionsResponse {
        valid: questions.iter().all(|report| report.valid),
        questions,
    }))
}
