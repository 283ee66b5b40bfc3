use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::Invitation;
use crate::db::types::InvitationStatus;

const COLUMNS: &str = "id, quiz_id, email, name, status, invited_at, updated_at";

pub(crate) async fn find_by_email(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    email: &str,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {COLUMNS} FROM invitations WHERE quiz_id = $1 AND email = $2"
    ))
    .bind(quiz_id)
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    invitation_id: &str,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {COLUMNS} FROM invitations WHERE quiz_id = $1 AND id = $2"
    ))
    .bind(quiz_id)
    .bind(invitation_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_quiz(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Vec<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {COLUMNS} FROM invitations WHERE quiz_id = $1 ORDER BY invited_at DESC, id"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_email(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<Vec<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {COLUMNS} FROM invitations WHERE email = $1 ORDER BY invited_at DESC, id"
    ))
    .bind(email)
    .fetch_all(executor)
    .await
}

pub(crate) async fn insert_if_absent(
    executor: impl PgExecutor<'_>,
    invitation: &Invitation,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO invitations (id, quiz_id, email, name, status, invited_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         ON CONFLICT (quiz_id, email) DO NOTHING",
    )
    .bind(&invitation.id)
    .bind(&invitation.quiz_id)
    .bind(&invitation.email)
    .bind(&invitation.name)
    .bind(invitation.status)
    .bind(invitation.invited_at)
    .bind(invitation.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn accept_if_pending(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    email: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE invitations
         SET status = $1,
             updated_at = $2
         WHERE quiz_id = $3 AND email = $4 AND status = $5",
    )
    .bind(InvitationStatus::Accepted)
    .bind(now)
    .bind(quiz_id)
    .bind(email)
    .bind(InvitationStatus::Pending)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn set_status(
    executor: impl PgExecutor<'_>,
    invitation_id: &str,
    status: InvitationStatus,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE invitations
         SET status = $1,
             updated_at = $2
         WHERE id = $3",
    )
    .bind(status)
    .bind(now)
    .bind(invitation_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_if_pending(
    executor: impl PgExecutor<'_>,
    quiz_id: &str,
    invitation_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM invitations WHERE quiz_id = $1 AND id = $2 AND status = $3",
    )
    .bind(quiz_id)
    .bind(invitation_id)
    .bind(InvitationStatus::Pending)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
