use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::Quiz;
use crate::db::types::SubmissionStatus;
use crate::services::progress::RosterEntry;
use crate::services::score_aggregator::max_score;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RedistributeRequest {
    #[validate(range(min = 1, message = "target_total must be at least 1"))]
    pub(crate) target_total: i32,
    /// Revision the caller last saw; stale values are rejected.
    #[serde(default)]
    pub(crate) expected_revision: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionPoints {
    pub(crate) id: String,
    pub(crate) points: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizPointsResponse {
    pub(crate) quiz_id: String,
    pub(crate) revision: i64,
    pub(crate) total_points: i64,
    pub(crate) questions: Vec<QuestionPoints>,
}

impl From<&Quiz> for QuizPointsResponse {
    fn from(quiz: &Quiz) -> Self {
        Self {
            quiz_id: quiz.id.clone(),
            revision: quiz.revision,
            total_points: max_score(quiz),
            questions: quiz
                .questions
                .iter()
                .map(|question| QuestionPoints { id: question.id.clone(), points: question.points })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterEntryResponse {
    pub(crate) student_id: String,
    pub(crate) student_email: String,
    pub(crate) attempts: u32,
    pub(crate) best_score: i64,
    pub(crate) best_percentage: i64,
    pub(crate) max_score: i64,
    pub(crate) latest_submission_id: String,
    pub(crate) latest_status: SubmissionStatus,
    pub(crate) latest_submitted_at: String,
}

impl From<RosterEntry> for RosterEntryResponse {
    fn from(entry: RosterEntry) -> Self {
        Self {
            student_id: entry.student_id,
            student_email: entry.student_email,
            attempts: entry.attempts,
            best_score: entry.best_score,
            best_percentage: entry.best_percentage,
            max_score: entry.max_score,
            latest_submission_id: entry.latest_submission_id,
            latest_status: entry.latest_status,
            latest_submitted_at: format_primitive(entry.latest_submitted_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterResponse {
    pub(crate) quiz_id: String,
    pub(crate) max_score: i64,
    pub(crate) pending_review: usize,
    pub(crate) students: Vec<RosterEntryResponse>,
}
