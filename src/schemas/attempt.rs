use serde::{Deserialize, Serialize};

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{AnswerSheet, Attempt, Quiz};
use crate::db::types::{AttemptStatus, QuestionType};
use crate::services::attempt_timing::remaining_seconds;

/// A question as presented to a student: no answer key.
#[derive(Debug, Serialize)]
pub(crate) struct PresentedQuestion {
    pub(crate) id: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) text: String,
    pub(crate) options: Vec<String>,
    pub(crate) points: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) started_at: String,
    pub(crate) expires_at: String,
    pub(crate) remaining_seconds: i64,
    pub(crate) status: AttemptStatus,
    pub(crate) questions: Vec<PresentedQuestion>,
    pub(crate) draft_answers: AnswerSheet,
}

impl AttemptResponse {
    pub(crate) fn from_attempt(
        quiz: &Quiz,
        attempt: Attempt,
        now: time::PrimitiveDateTime,
    ) -> Self {
        let questions = attempt
            .question_order
            .iter()
            .filter_map(|id| quiz.question(id))
            .map(|question| PresentedQuestion {
                id: question.id.clone(),
                question_type: question.question_type,
                text: question.text.clone(),
                options: question.options.clone(),
                points: question.points,
            })
            .collect();

        Self {
            remaining_seconds: remaining_seconds(attempt.expires_at, now),
            started_at: format_primitive(attempt.started_at),
            expires_at: format_primitive(attempt.expires_at),
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            status: attempt.status,
            questions,
            draft_answers: attempt.draft_answers,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum StartKind {
    Started,
    Resumed,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartAttemptResponse {
    pub(crate) outcome: StartKind,
    pub(crate) attempt: AttemptResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveAnswersRequest {
    pub(crate) answers: AnswerSheet,
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveAnswersResponse {
    pub(crate) attempt_id: String,
    pub(crate) saved: bool,
    pub(crate) remaining_seconds: i64,
}

/// Missing `answers` submits the saved draft.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmitAttemptRequest {
    #[serde(default)]
    pub(crate) answers: Option<AnswerSheet>,
}
