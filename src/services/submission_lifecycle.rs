use serde::Serialize;

use crate::db::models::{Quiz, Submission};
use crate::db::types::{GradingMode, SubmissionStatus};
use crate::services::score_aggregator::max_score;

/// Status a fresh submission lands in.
pub(crate) fn initial_status(quiz: &Quiz) -> SubmissionStatus {
    let needs_review = quiz.has_essay()
        || quiz.settings.grading_mode == GradingMode::Manual
        || !quiz.settings.show_results_immediately;

    if needs_review {
        SubmissionStatus::PendingReview
    } else {
        SubmissionStatus::Graded
    }
}

/// Manual grading is the only transition and always lands on `Graded`.
pub(crate) fn after_manual_grading(_current: SubmissionStatus) -> SubmissionStatus {
    SubmissionStatus::Graded
}

/// What a student is allowed to see about their own submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub(crate) enum StudentResult {
    Graded { score: i64, max_score: i64, percentage: i64, passed: bool },
    Pending,
}

pub(crate) fn student_result(quiz: &Quiz, submission: &Submission, max: i64) -> StudentResult {
    match submission.status {
        SubmissionStatus::PendingReview => StudentResult::Pending,
        SubmissionStatus::Graded => StudentResult::Graded {
            score: submission.score,
            max_score: max,
            percentage: percentage(submission.score, max),
            passed: passed(submission.score, max, quiz.settings.passing_score),
        },
    }
}

/// Result view against the quiz's current point configuration.
pub(crate) fn student_result_now(quiz: &Quiz, submission: &Submission) -> StudentResult {
    student_result(quiz, submission, max_score(quiz))
}

pub(crate) fn passed(score: i64, max: i64, passing_score: u32) -> bool {
    score * 100 >= i64::from(passing_score) * max
}

pub(crate) fn percentage(score: i64, max: i64) -> i64 {
    if max <= 0 {
        return 0;
    }
    ((score as f64 / max as f64) * 100.0).round() as i64
}
