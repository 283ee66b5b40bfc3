pub(crate) mod attempts;
pub(crate) mod health;
pub(crate) mod invitations;
pub(crate) mod notifications;
pub(crate) mod pg_store;
pub(crate) mod quizzes;
pub(crate) mod submissions;

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::db::models::{
    AnswerSheet, Attempt, GradingLine, Invitation, Notification, Quiz, Submission,
};
use crate::db::types::SubmissionStatus;

pub(crate) use pg_store::PgStore;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
}

pub(crate) type StoreResult<T> = Result<T, StoreError>;

/// Result of atomically recording a submission.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RecordOutcome {
    Recorded(Submission),
    /// The quiz's points changed after scoring; nothing was written.
    StaleRevision { current: i64 },
    /// The attempt was closed by someone else; carries whatever closed it.
    AttemptClosed(Option<Submission>),
}

/// Replacement of a submission's grade by manual reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradingUpdate {
    pub(crate) score: i64,
    pub(crate) status: SubmissionStatus,
    pub(crate) grading_details: Vec<GradingLine>,
    pub(crate) graded_at: PrimitiveDateTime,
}

/// Durable storage for quizzes, attempts, submissions and invitations.
///
/// Each method is one transaction: callers never observe a partially applied operation.
#[async_trait]
pub(crate) trait AssessmentStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn load_quiz(&self, quiz_id: &str) -> StoreResult<Option<Quiz>>;

    /// Rewrites question points when `expected_revision` is still current.
    /// Returns the new revision, or `None` when the quiz moved on.
    async fn save_question_points(
        &self,
        quiz_id: &str,
        expected_revision: i64,
        points: &[(String, i32)],
    ) -> StoreResult<Option<i64>>;

    /// Recorded submissions for the pair; this is the attempt count.
    async fn count_submissions(&self, quiz_id: &str, student_id: &str) -> StoreResult<u32>;

    async fn find_active_attempt(
        &self,
        quiz_id: &str,
        student_id: &str,
    ) -> StoreResult<Option<Attempt>>;

    async fn find_attempt(&self, attempt_id: &str) -> StoreResult<Option<Attempt>>;

    async fn create_attempt(&self, attempt: &Attempt) -> StoreResult<()>;

    /// Replaces the draft of an active attempt. `false` once the attempt is closed.
    async fn save_draft_answers(&self, attempt_id: &str, answers: &AnswerSheet)
        -> StoreResult<bool>;

    async fn list_expired_attempts(
        &self,
        now: PrimitiveDateTime,
        limit: i64,
    ) -> StoreResult<Vec<Attempt>>;

    /// Inserts the submission, closes its attempt and completes the matching invitation.
    async fn record_submission(&self, submission: &Submission) -> StoreResult<RecordOutcome>;

    async fn find_submission(&self, submission_id: &str) -> StoreResult<Option<Submission>>;

    async fn find_submission_for_attempt(&self, attempt_id: &str)
        -> StoreResult<Option<Submission>>;

    async fn list_submissions(&self, quiz_id: &str) -> StoreResult<Vec<Submission>>;

    async fn list_submissions_by_email(&self, email: &str) -> StoreResult<Vec<Submission>>;

    async fn save_grading(&self, submission_id: &str, update: &GradingUpdate) -> StoreResult<()>;

    async fn find_invitation(&self, quiz_id: &str, email: &str)
        -> StoreResult<Option<Invitation>>;

    async fn find_invitation_by_id(
        &self,
        quiz_id: &str,
        invitation_id: &str,
    ) -> StoreResult<Option<Invitation>>;

    async fn list_invitations(&self, quiz_id: &str) -> StoreResult<Vec<Invitation>>;

    async fn list_invitations_by_email(&self, email: &str) -> StoreResult<Vec<Invitation>>;

    /// Inserts unless `(quiz_id, email)` already exists. `true` when a row was created.
    async fn insert_invitation(&self, invitation: &Invitation) -> StoreResult<bool>;

    /// Pending to accepted; `false` when the invitation was not pending.
    async fn accept_invitation(
        &self,
        quiz_id: &str,
        email: &str,
        now: PrimitiveDateTime,
    ) -> StoreResult<bool>;

    /// Deletes only while pending; `false` otherwise.
    async fn delete_pending_invitation(
        &self,
        quiz_id: &str,
        invitation_id: &str,
    ) -> StoreResult<bool>;

    async fn save_notification(&self, notification: &Notification) -> StoreResult<()>;
}
