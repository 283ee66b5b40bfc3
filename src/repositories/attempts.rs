use sqlx::types::Json;
use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::{AnswerSheet, Attempt};
use crate::db::types::AttemptStatus;

const COLUMNS: &str = "\
    id, quiz_id, student_id, student_email, started_at, expires_at, \
    status, question_order, draft_answers";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AttemptRow {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) student_id: String,
    pub(crate) student_email: String,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) status: AttemptStatus,
    pub(crate) question_order: Json<Vec<String>>,
    pub(crate) draft_answers: Json<AnswerSheet>,
}

impl From<AttemptRow> for Attempt {
    fn from(row: AttemptRow) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            student_id: row.student_id,
            student_email: row.student_email,
            started_at: row.started_at,
            expires_at: row.expires_at,
            status: row.status,
            question_order: row.question_order.0,
            draft_answers: row.draft_answers.0,
        }
    }
}

pub(crate) async fn find_by_id(
    executor: impl PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    let row = sqlx::query_as::<_, AttemptRow>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE id = $1"
    ))
    .bind(attempt_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Attempt::from))
}

pub(crate) async fn find_active(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    student_id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    let row = sqlx::query_as::<_, AttemptRow>(&format!(
        "SELECT {COLUMNS} FROM attempts
         WHERE quiz_id = $1 AND student_id = $2 AND status = $3
         ORDER BY started_at DESC
         LIMIT 1"
    ))
    .bind(quiz_id)
    .bind(student_id)
    .bind(AttemptStatus::Active)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Attempt::from))
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    attempt: &Attempt,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO attempts (
            id, quiz_id, student_id, student_email, started_at, expires_at,
            status, question_order, draft_answers, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$5)",
    )
    .bind(&attempt.id)
    .bind(&attempt.quiz_id)
    .bind(&attempt.student_id)
    .bind(&attempt.student_email)
    .bind(attempt.started_at)
    .bind(attempt.expires_at)
    .bind(attempt.status)
    .bind(Json(&attempt.question_order))
    .bind(Json(&attempt.draft_answers))
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn save_draft(
    executor: impl PgExecutor<'_>,
    attempt_id: &str,
    answers: &AnswerSheet,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE attempts
         SET draft_answers = $1,
             updated_at = $2
         WHERE id = $3 AND status = $4",
    )
    .bind(Json(answers))
    .bind(now)
    .bind(attempt_id)
    .bind(AttemptStatus::Active)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_expired(
    executor: impl PgExecutor<'_>,
    now: PrimitiveDateTime,
    limit: i64,
) -> Result<Vec<Attempt>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AttemptRow>(&format!(
        "SELECT {COLUMNS} FROM attempts
         WHERE status = $1 AND expires_at <= $2
         ORDER BY expires_at
         LIMIT $3"
    ))
    .bind(AttemptStatus::Active)
    .bind(now)
    .bind(limit.clamp(1, 1000))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Attempt::from).collect())
}

/// Closes an active attempt. `false` when it was already closed.
pub(crate) async fn close(
    executor: impl PgExecutor<'_>,
    attempt_id: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE attempts
         SET status = $1,
             updated_at = $2
         WHERE id = $3 AND status = $4",
    )
    .bind(AttemptStatus::Submitted)
    .bind(now)
    .bind(attempt_id)
    .bind(AttemptStatus::Active)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
