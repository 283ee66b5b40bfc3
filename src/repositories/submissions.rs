use sqlx::types::Json;
use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::{AnswerSheet, GradingLine, Submission};
use crate::db::types::SubmissionStatus;

use super::GradingUpdate;

const COLUMNS: &str = "\
    id, quiz_id, attempt_id, student_id, student_email, quiz_revision, \
    answers, score, status, grading_details, submitted_at, graded_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SubmissionRow {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) attempt_id: String,
    pub(crate) student_id: String,
    pub(crate) student_email: String,
    pub(crate) quiz_revision: i64,
    pub(crate) answers: Json<AnswerSheet>,
    pub(crate) score: i64,
    pub(crate) status: SubmissionStatus,
    pub(crate) grading_details: Option<Json<Vec<GradingLine>>>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            attempt_id: row.attempt_id,
            student_id: row.student_id,
            student_email: row.student_email,
            quiz_revision: row.quiz_revision,
            answers: row.answers.0,
            score: row.score,
            status: row.status,
            grading_details: row.grading_details.map(|details| details.0),
            submitted_at: row.submitted_at,
            graded_at: row.graded_at,
        }
    }
}

pub(crate) async fn insert(
    executor: impl PgExecutor<'_>,
    submission: &Submission,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO submissions (
            id, quiz_id, attempt_id, student_id, student_email, quiz_revision,
            answers, score, status, grading_details, submitted_at, graded_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
    )
    .bind(&submission.id)
    .bind(&submission.quiz_id)
    .bind(&submission.attempt_id)
    .bind(&submission.student_id)
    .bind(&submission.student_email)
    .bind(submission.quiz_revision)
    .bind(Json(&submission.answers))
    .bind(submission.score)
    .bind(submission.status)
    .bind(submission.grading_details.as_ref().map(Json))
    .bind(submission.submitted_at)
    .bind(submission.graded_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn find_by_id(
    executor: impl PgExecutor<'_>,
    submission_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    let row = sqlx::query_as::<_, SubmissionRow>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE id = $1"
    ))
    .bind(submission_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Submission::from))
}

pub(crate) async fn find_by_attempt(
    executor: impl PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    let row = sqlx::query_as::<_, SubmissionRow>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE attempt_id = $1"
    ))
    .bind(attempt_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Submission::from))
}

pub(crate) async fn count_by_quiz_and_student(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    student_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE quiz_id = $1 AND student_id = $2")
        .bind(quiz_id)
        .bind(student_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_by_quiz(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE quiz_id = $1 ORDER BY submitted_at DESC, id"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Submission::from).collect())
}

pub(crate) async fn list_by_email(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE lower(student_email) = lower($1)
         ORDER BY submitted_at DESC, id"
    ))
    .bind(email)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Submission::from).collect())
}

/// Score, status and details change together.
pub(crate) async fn save_grading(
    executor: impl PgExecutor<'_>,
    submission_id: &str,
    update: &GradingUpdate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE submissions
         SET score = $1,
             status = $2,
             grading_details = $3,
             graded_at = $4
         WHERE id = $5",
    )
    .bind(update.score)
    .bind(update.status)
    .bind(Json(&update.grading_details))
    .bind(update.graded_at)
    .bind(submission_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
