use time::PrimitiveDateTime;

use crate::core::state::AppState;
use crate::db::models::{GradingLine, Quiz, Submission};
use crate::repositories::GradingUpdate;
use crate::services::manual_grading::{grading_record, grading_seed, reconcile, Overrides};
use crate::services::WorkflowError;

/// What the teacher's grading form starts from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradingView {
    pub(crate) seed: Overrides,
    pub(crate) record: Vec<GradingLine>,
    pub(crate) materialized: bool,
}

pub(crate) fn grading_view(quiz: &Quiz, submission: &Submission) -> GradingView {
    GradingView {
        seed: grading_seed(quiz, submission),
        record: grading_record(quiz, submission),
        materialized: submission.grading_details.is_some(),
    }
}

/// Reconciles `overrides` and replaces the stored grade in one write.
pub(crate) async fn grade_submission(
    state: &AppState,
    quiz: &Quiz,
    submission: &Submission,
    overrides: &Overrides,
    now: PrimitiveDateTime,
) -> Result<Submission, WorkflowError> {
    let reconciled = reconcile(quiz, submission.status, overrides);
    let ignored = overrides.keys().filter(|id| quiz.question(id).is_none()).count();

    let update = GradingUpdate {
        score: reconciled.score,
        status: reconciled.status,
        grading_details: reconciled.grading_details,
        graded_at: now,
    };
    state.store().save_grading(&submission.id, &update).await?;

    tracing::info!(
        quiz_id = %quiz.id,
        submission_id = %submission.id,
        previous_score = submission.score,
        score = update.score,
        ignored_overrides = ignored,
        "Submission graded manually"
    );
    metrics::counter!("manual_gradings_total").increment(1);

    Ok(Submission {
        score: update.score,
        status: update.status,
        grading_details: Some(update.grading_details),
        graded_at: Some(now),
        ..submission.clone()
    })
}
