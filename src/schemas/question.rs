use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::Question;
use crate::services::question_model::QuestionIssue;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ValidateQuestionsRequest {
    #[validate(length(min = 1, message = "questions must not be empty"))]
    pub(crate) questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionReport {
    pub(crate) question_id: String,
    pub(crate) valid: bool,
    pub(crate) issues: Vec<QuestionIssueResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionIssueResponse {
    #[serde(flatten)]
    pub(crate) issue: QuestionIssue,
    pub(crate) message: String,
}

impl From<QuestionIssue> for QuestionIssueResponse {
    fn from(issue: QuestionIssue) -> Self {
        Self { message: issue.to_string(), issue }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidateQuestionsResponse {
    pub(crate) valid: bool,
    pub(crate) questions: Vec<QuestionReport>,
}
