use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use time::PrimitiveDateTime;

use crate::db::models::{Question, Quiz, QuizSettings};
use crate::db::types::QuestionType;

const QUIZ_COLUMNS: &str = "id, teacher_id, title, settings, revision";

const QUESTION_COLUMNS: &str = "id, question_type, text, options, correct_answer, points";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuizRow {
    pub(crate) id: String,
    pub(crate) teacher_id: String,
    pub(crate) title: String,
    pub(crate) settings: Json<QuizSettings>,
    pub(crate) revision: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionRow {
    pub(crate) id: String,
    pub(crate) question_type: QuestionType,
    pub(crate) text: String,
    pub(crate) options: Json<Vec<String>>,
    pub(crate) correct_answer: Option<String>,
    pub(crate) points: i32,
}

impl QuestionRow {
    fn into_model(self) -> Question {
        Question {
            id: self.id,
            question_type: self.question_type,
            text: self.text,
            options: self.options.0,
            correct_answer: self.correct_answer,
            points: self.points,
        }
    }
}

pub(crate) async fn find_by_id(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Option<QuizRow>, sqlx::Error> {
    sqlx::query_as::<_, QuizRow>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_questions(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Vec<QuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRow>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY position, id"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

/// Quiz row and its questions read from one snapshot.
pub(crate) async fn load(pool: &PgPool, quiz_id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ").execute(&mut *tx).await?;

    let Some(row) = find_by_id(&mut *tx, quiz_id).await? else {
        tx.rollback().await?;
        return Ok(None);
    };
    let questions = list_questions(&mut *tx, quiz_id).await?;
    tx.commit().await?;

    Ok(Some(Quiz {
        id: row.id,
        teacher_id: row.teacher_id,
        title: row.title,
        settings: row.settings.0,
        revision: row.revision,
        questions: questions.into_iter().map(QuestionRow::into_model).collect(),
    }))
}

/// Current revision under a share lock, so point edits wait for the caller's transaction.
pub(crate) async fn share_revision(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT revision FROM quizzes WHERE id = $1 FOR SHARE")
        .bind(quiz_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn lock_revision(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT revision FROM quizzes WHERE id = $1 FOR UPDATE")
        .bind(quiz_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn save_points(
    tx: &mut Transaction<'_, Postgres>,
    quiz_id: &str,
    points: &[(String, i32)],
    now: PrimitiveDateTime,
) -> Result<i64, sqlx::Error> {
    for (question_id, value) in points {
        sqlx::query("UPDATE questions SET points = $1 WHERE quiz_id = $2 AND id = $3")
            .bind(value)
            .bind(quiz_id)
            .bind(question_id)
            .execute(&mut **tx)
            .await?;
    }

    sqlx::query_scalar(
        "UPDATE quizzes
         SET revision = revision + 1,
             updated_at = $1
         WHERE id = $2
         RETURNING revision",
    )
    .bind(now)
    .bind(quiz_id)
    .fetch_one(&mut **tx)
    .await
}
