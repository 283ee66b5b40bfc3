use std::collections::BTreeMap;

use crate::db::models::{GradingDetail, GradingLine, Quiz, Submission};
use crate::db::types::SubmissionStatus;
use crate::services::score_aggregator::score_sheet;
use crate::services::submission_lifecycle::after_manual_grading;

/// Teacher-supplied points per question id.
pub(crate) type Overrides = BTreeMap<String, i32>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reconciled {
    pub(crate) grading_details: Vec<GradingLine>,
    pub(crate) score: i64,
    pub(crate) status: SubmissionStatus,
}

/// Rebuilds the full grading record from `overrides`.
///
/// Every quiz question gets a line in quiz order; questions without an override get zero,
/// values are clamped to `[0, points]` and ids the quiz does not know are dropped.
pub(crate) fn reconcile(quiz: &Quiz, current: SubmissionStatus, overrides: &Overrides) -> Reconciled {
    let grading_details: Vec<GradingLine> = quiz
        .questions
        .iter()
        .map(|question| {
            let max_points = question.points.max(0);
            let awarded = overrides.get(&question.id).copied().unwrap_or(0).clamp(0, max_points);
            GradingLine {
                question_id: question.id.clone(),
                detail: GradingDetail { points_awarded: awarded, max_points },
            }
        })
        .collect();
    let score = grading_details.iter().map(|line| i64::from(line.detail.points_awarded)).sum();

    Reconciled { grading_details, score, status: after_manual_grading(current) }
}

/// The per-question record of a submission, materialized or replayed from its answers.
pub(crate) fn grading_record(quiz: &Quiz, submission: &Submission) -> Vec<GradingLine> {
    if let Some(details) = &submission.grading_details {
        return details.clone();
    }

    let sheet = score_sheet(quiz, &submission.answers);
    quiz.questions
        .iter()
        .zip(sheet.lines)
        .map(|(question, (question_id, verdict))| GradingLine {
            question_id,
            detail: GradingDetail { points_awarded: verdict.points, max_points: question.points },
        })
        .collect()
}

/// Starting values for the teacher's override form.
pub(crate) fn grading_seed(quiz: &Quiz, submission: &Submission) -> Overrides {
    grading_record(quiz, submission)
        .into_iter()
        .map(|line| (line.question_id, line.detail.points_awarded))
        .collect()
}

pub(crate) fn record_max_score(record: &[GradingLine]) -> i64 {
    record.iter().map(|line| i64::from(line.detail.max_points)).sum()
}
