use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::time::primitive_now_utc;
use crate::db::models::{AnswerSheet, Attempt, Invitation, Notification, Quiz, Submission};
use crate::services::invitation_lifecycle;
use crate::services::invitations::normalize_email;

use super::{
    attempts, health, invitations, notifications, quizzes, submissions, AssessmentStore,
    GradingUpdate, RecordOutcome, StoreError, StoreResult,
};

/// PostgreSQL-backed [`AssessmentStore`].
#[derive(Clone)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        health::ping(&self.pool).await?;
        Ok(())
    }

    async fn load_quiz(&self, quiz_id: &str) -> StoreResult<Option<Quiz>> {
        Ok(quizzes::load(&self.pool, quiz_id).await?)
    }

    async fn save_question_points(
        &self,
        quiz_id: &str,
        expected_revision: i64,
        points: &[(String, i32)],
    ) -> StoreResult<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let revision = quizzes::lock_revision(&mut *tx, quiz_id).await?.ok_or_else(|| {
            StoreError::NotFound { entity: "quiz", id: quiz_id.to_string() }
        })?;
        if revision != expected_revision {
            tx.rollback().await?;
            return Ok(None);
        }

        let next = quizzes::save_points(&mut tx, quiz_id, points, primitive_now_utc()).await?;
        tx.commit().await?;

        Ok(Some(next))
    }

    async fn count_submissions(&self, quiz_id: &str, student_id: &str) -> StoreResult<u32> {
        let count = submissions::count_by_quiz_and_student(&self.pool, quiz_id, student_id).await?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn find_active_attempt(
        &self,
        quiz_id: &str,
        student_id: &str,
    ) -> StoreResult<Option<Attempt>> {
        Ok(attempts::find_active(&self.pool, quiz_id, student_id).await?)
    }

    async fn find_attempt(&self, attempt_id: &str) -> StoreResult<Option<Attempt>> {
        Ok(attempts::find_by_id(&self.pool, attempt_id).await?)
    }

    async fn create_attempt(&self, attempt: &Attempt) -> StoreResult<()> {
        attempts::create(&self.pool, attempt).await?;
        Ok(())
    }

    async fn save_draft_answers(
        &self,
        attempt_id: &str,
        answers: &AnswerSheet,
    ) -> StoreResult<bool> {
        Ok(attempts::save_draft(&self.pool, attempt_id, answers, primitive_now_utc()).await?)
    }

    async fn list_expired_attempts(
        &self,
        now: PrimitiveDateTime,
        limit: i64,
    ) -> StoreResult<Vec<Attempt>> {
        Ok(attempts::list_expired(&self.pool, now, limit).await?)
    }

    async fn record_submission(&self, submission: &Submission) -> StoreResult<RecordOutcome> {
        let now = primitive_now_utc();
        let mut tx = self.pool.begin().await?;

        let revision =
            quizzes::share_revision(&mut *tx, &submission.quiz_id).await?.ok_or_else(|| {
                StoreError::NotFound { entity: "quiz", id: submission.quiz_id.clone() }
            })?;
        if revision != submission.quiz_revision {
            tx.rollback().await?;
            return Ok(RecordOutcome::StaleRevision { current: revision });
        }

        if !attempts::close(&mut *tx, &submission.attempt_id, now).await? {
            tx.rollback().await?;
            let existing = submissions::find_by_attempt(&self.pool, &submission.attempt_id).await?;
            return Ok(RecordOutcome::AttemptClosed(existing));
        }

        submissions::insert(&mut *tx, submission).await?;
        let email = normalize_email(&submission.student_email);
        if let Some(invitation) =
            invitations::find_by_email(&mut *tx, &submission.quiz_id, &email).await?
        {
            let next = invitation_lifecycle::complete(invitation.status);
            if next != invitation.status {
                invitations::set_status(&mut *tx, &invitation.id, next, now).await?;
            }
        }
        tx.commit().await?;

        Ok(RecordOutcome::Recorded(submission.clone()))
    }

    async fn find_submission(&self, submission_id: &str) -> StoreResult<Option<Submission>> {
        Ok(submissions::find_by_id(&self.pool, submission_id).await?)
    }

    async fn find_submission_for_attempt(
        &self,
        attempt_id: &str,
    ) -> StoreResult<Option<Submission>> {
        Ok(submissions::find_by_attempt(&self.pool, attempt_id).await?)
    }

    async fn list_submissions(&self, quiz_id: &str) -> StoreResult<Vec<Submission>> {
        Ok(submissions::list_by_quiz(&self.pool, quiz_id).await?)
    }

    async fn list_submissions_by_email(&self, email: &str) -> StoreResult<Vec<Submission>> {
        Ok(submissions::list_by_email(&self.pool, email).await?)
    }

    async fn save_grading(&self, submission_id: &str, update: &GradingUpdate) -> StoreResult<()> {
        if !submissions::save_grading(&self.pool, submission_id, update).await? {
            return Err(StoreError::NotFound {
                entity: "submission",
                id: submission_id.to_string(),
            });
        }
        Ok(())
    }

    async fn find_invitation(
        &self,
        quiz_id: &str,
        email: &str,
    ) -> StoreResult<Option<Invitation>> {
        Ok(invitations::find_by_email(&self.pool, quiz_id, email).await?)
    }

    async fn find_invitation_by_id(
        &self,
        quiz_id: &str,
        invitation_id: &str,
    ) -> StoreResult<Option<Invitation>> {
        Ok(invitations::find_by_id(&self.pool, quiz_id, invitation_id).await?)
    }

    async fn list_invitations(&self, quiz_id: &str) -> StoreResult<Vec<Invitation>> {
        Ok(invitations::list_by_quiz(&self.pool, quiz_id).await?)
    }

    async fn list_invitations_by_email(&self, email: &str) -> StoreResult<Vec<Invitation>> {
        Ok(invitations::list_by_email(&self.pool, email).await?)
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> StoreResult<bool> {
        Ok(invitations::insert_if_absent(&self.pool, invitation).await?)
    }

    async fn accept_invitation(
        &self,
        quiz_id: &str,
        email: &str,
        now: PrimitiveDateTime,
    ) -> StoreResult<bool> {
        Ok(invitations::accept_if_pending(&self.pool, quiz_id, email, now).await?)
    }

    async fn delete_pending_invitation(
        &self,
        quiz_id: &str,
        invitation_id: &str,
    ) -> StoreResult<bool> {
        Ok(invitations::delete_if_pending(&self.pool, quiz_id, invitation_id).await?)
    }

    async fn save_notification(&self, notification: &Notification) -> StoreResult<()> {
        notifications::insert(&self.pool, notification).await?;
        Ok(())
    }
}
