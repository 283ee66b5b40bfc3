pub(crate) mod attempt_gate;
pub(crate) mod attempt_timing;
pub(crate) mod attempts;
pub(crate) mod invitation_lifecycle;
pub(crate) mod invitations;
pub(crate) mod manual_grading;
pub(crate) mod notifications;
pub(crate) mod progress;
pub(crate) mod question_model;
pub(crate) mod quiz_points;
pub(crate) mod review;
pub(crate) mod score_aggregator;
pub(crate) mod scoring;
pub(crate) mod submission_finalize;
pub(crate) mod submission_lifecycle;

use thiserror::Error;

use crate::db::types::InvitationStatus;
use crate::repositories::StoreError;

#[derive(Debug, Error)]
pub(crate) enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("quiz '{0}' not found")]
    QuizNotFound(String),
    #[error("attempt '{0}' not found")]
    AttemptNotFound(String),
    #[error("submission '{0}' not found")]
    SubmissionNotFound(String),
    #[error("invitation not found")]
    InvitationNotFound,
    #[error("attempt '{0}' is already closed")]
    AttemptClosed(String),
    #[error("invitation can no longer be removed (status {status:?})")]
    InvitationLocked { status: InvitationStatus },
    #[error("quiz revision {expected} is no longer current")]
    RevisionConflict { expected: i64 },
    #[error("quiz points kept changing while recording the submission ({tries} tries)")]
    ScoringConflict { tries: u32 },
    #[error("target total {target} cannot be split over {questions} questions")]
    InvalidTarget { target: i32, questions: usize },
}
