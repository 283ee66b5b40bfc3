use std::sync::Arc;

use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Invitation, Notification, Quiz, Submission};
use crate::db::types::NotificationKind;
use crate::repositories::AssessmentStore;

/// Fire-and-forget delivery. Implementations must not block the caller or report failures.
pub(crate) trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Persists notifications on a background task.
pub(crate) struct StoreNotifier {
    store: Arc<dyn AssessmentStore>,
}

impl StoreNotifier {
    pub(crate) fn new(store: Arc<dyn AssessmentStore>) -> Self {
        Self { store }
    }
}

impl Notifier for StoreNotifier {
    fn notify(&self, notification: Notification) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.save_notification(&notification).await {
                tracing::warn!(
                    error = %err,
                    recipient = %notification.recipient,
                    kind = ?notification.kind,
                    "Failed to store notification"
                );
            }
        });
    }
}

pub(crate) fn quiz_invite(quiz: &Quiz, invitation: &Invitation, now: PrimitiveDateTime) -> Notification {
    Notification {
        id: Uuid::new_v4().to_string(),
        recipient: invitation.email.clone(),
        kind: NotificationKind::QuizInvite,
        title: "New quiz invitation".to_string(),
        message: format!("You have been invited to take \"{}\".", quiz.title),
        quiz_id: Some(quiz.id.clone()),
        created_at: now,
    }
}

pub(crate) fn quiz_submission(
    quiz: &Quiz,
    submission: &Submission,
    now: PrimitiveDateTime,
) -> Notification {
    Notification {
        id: Uuid::new_v4().to_string(),
        recipient: quiz.teacher_id.clone(),
        kind: NotificationKind::QuizSubmission,
        title: "New quiz submission".to_string(),
        message: format!("{} submitted \"{}\".", submission.student_email, quiz.title),
        quiz_id: Some(quiz.id.clone()),
        created_at: now,
    }
}
