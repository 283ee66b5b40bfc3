use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{AnswerSheet, Attempt, Submission};
use crate::db::types::SubmissionStatus;
use crate::repositories::RecordOutcome;
use crate::services::notifications;
use crate::services::score_aggregator::score_sheet;
use crate::services::submission_lifecycle::initial_status;
use crate::services::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FinalizeMode {
    ManualSubmit,
    AutoDeadline,
}

impl FinalizeMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::ManualSubmit => "manual_submit",
            Self::AutoDeadline => "auto_deadline",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FinalizeOutcome {
    pub(crate) submission: Submission,
    /// `false` when the attempt had already been finalized and the existing submission is returned.
    pub(crate) created: bool,
}

/// Scores `answers` against the current quiz and records the submission atomically.
///
/// When point redistribution commits between scoring and recording, the quiz is reloaded
/// and the answers rescored, up to the configured retry limit.
pub(crate) async fn finalize_attempt(
    state: &AppState,
    attempt: &Attempt,
    answers: AnswerSheet,
    mode: FinalizeMode,
    submitted_at: PrimitiveDateTime,
) -> Result<FinalizeOutcome, WorkflowError> {
    let tries = state.settings().grading().record_retry_limit.max(1);
    let submission_id = Uuid::new_v4().to_string();

    for round in 1..=tries {
        let quiz = state
            .store()
            .load_quiz(&attempt.quiz_id)
            .await?
            .ok_or_else(|| WorkflowError::QuizNotFound(attempt.quiz_id.clone()))?;

        let sheet = score_sheet(&quiz, &answers);
        let status = initial_status(&quiz);
        let submission = Submission {
            id: submission_id.clone(),
            quiz_id: quiz.id.clone(),
            attempt_id: attempt.id.clone(),
            student_id: attempt.student_id.clone(),
            student_email: attempt.student_email.clone(),
            quiz_revision: quiz.revision,
            answers: answers.clone(),
            score: sheet.total,
            status,
            grading_details: None,
            submitted_at,
            graded_at: (status == SubmissionStatus::Graded).then_some(submitted_at),
        };

        match state.store().record_submission(&submission).await? {
            RecordOutcome::Recorded(submission) => {
                tracing::info!(
                    quiz_id = %submission.quiz_id,
                    submission_id = %submission.id,
                    attempt_id = %submission.attempt_id,
                    score = submission.score,
                    status = ?submission.status,
                    mode = mode.as_str(),
                    "Submission recorded"
                );
                let status_label = match submission.status {
                    SubmissionStatus::Graded => "graded",
                    SubmissionStatus::PendingReview => "pending_review",
                };
                metrics::counter!("submissions_recorded_total", "status" => status_label)
                    .increment(1);

                state.notifier().notify(notifications::quiz_submission(
                    &quiz,
                    &submission,
                    primitive_now_utc(),
                ));

                return Ok(FinalizeOutcome { submission, created: true });
            }
            RecordOutcome::AttemptClosed(Some(existing)) => {
                tracing::debug!(
                    attempt_id = %attempt.id,
                    submission_id = %existing.id,
                    "Attempt already finalized"
                );
                return Ok(FinalizeOutcome { submission: existing, created: false });
            }
            RecordOutcome::AttemptClosed(None) => {
                return Err(WorkflowError::AttemptClosed(attempt.id.clone()));
            }
            RecordOutcome::StaleRevision { current } => {
                tracing::warn!(
                    quiz_id = %quiz.id,
                    attempt_id = %attempt.id,
                    scored_revision = quiz.revision,
                    current_revision = current,
                    round,
                    "Quiz points changed while scoring; rescoring"
                );
            }
        }
    }

    Err(WorkflowError::ScoringConflict { tries })
}
