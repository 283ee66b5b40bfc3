use sqlx::PgExecutor;

use crate::db::models::Notification;

pub(crate) async fn insert(
    executor: impl PgExecutor<'_>,
    notification: &Notification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notifications (id, recipient, kind, title, message, quiz_id, created_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)",
    )
    .bind(&notification.id)
    .bind(&notification.recipient)
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.quiz_id)
    .bind(notification.created_at)
    .execute(executor)
    .await?;

    Ok(())
}
