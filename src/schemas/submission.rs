use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub(crate) use crate::core::time::{format_optional, format_primitive};
use crate::db::models::{AnswerSheet, GradingLine, Submission};
use crate::db::types::SubmissionStatus;
use crate::services::submission_lifecycle::StudentResult;

/// Teacher-facing view of a submission.
#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) attempt_id: String,
    pub(crate) student_id: String,
    pub(crate) student_email: String,
    pub(crate) quiz_revision: i64,
    pub(crate) answers: AnswerSheet,
    pub(crate) score: i64,
    pub(crate) status: SubmissionStatus,
    pub(crate) grading_details: Option<Vec<GradingLine>>,
    pub(crate) submitted_at: String,
    pub(crate) graded_at: Option<String>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            quiz_id: submission.quiz_id,
            attempt_id: submission.attempt_id,
            student_id: submission.student_id,
            student_email: submission.student_email,
            quiz_revision: submission.quiz_revision,
            answers: submission.answers,
            score: submission.score,
            status: submission.status,
            grading_details: submission.grading_details,
            submitted_at: format_primitive(submission.submitted_at),
            graded_at: format_optional(submission.graded_at),
        }
    }
}

/// Student-facing view; scores stay hidden while the submission is pending review.
#[derive(Debug, Serialize)]
pub(crate) struct StudentResultResponse {
    pub(crate) submission_id: String,
    pub(crate) quiz_id: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) submitted_at: String,
    pub(crate) result: StudentResult,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradingViewResponse {
    pub(crate) submission_id: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) score: i64,
    pub(crate) materialized: bool,
    pub(crate) seed: BTreeMap<String, i32>,
    pub(crate) record: Vec<GradingLine>,
}

/// Per-question points; clamped to each question's maximum, unknown ids ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct GradeRequest {
    #[serde(default)]
    pub(crate) overrides: BTreeMap<String, i32>,
}
