use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::db::models::{Invitation, Quiz};
use crate::db::types::InvitationStatus;
use crate::services::invitation_lifecycle;
use crate::services::notifications;
use crate::services::WorkflowError;

#[derive(Debug, Clone)]
pub(crate) struct Invitee {
    pub(crate) email: String,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InviteResult {
    pub(crate) invitation: Invitation,
    pub(crate) created: bool,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates pending invitations. Existing ones are returned untouched.
pub(crate) async fn invite(
    state: &AppState,
    quiz: &Quiz,
    invitees: Vec<Invitee>,
    now: PrimitiveDateTime,
) -> Result<Vec<InviteResult>, WorkflowError> {
    let mut results: Vec<InviteResult> = Vec::with_capacity(invitees.len());

    for invitee in invitees {
        let email = normalize_email(&invitee.email);
        if email.is_empty() || results.iter().any(|result| result.invitation.email == email) {
            continue;
        }

        let invitation = Invitation {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz.id.clone(),
            email: email.clone(),
            name: invitee.name.map(|name| name.trim().to_string()).filter(|name| !name.is_empty()),
            status: InvitationStatus::Pending,
            invited_at: now,
            updated_at: now,
        };

        if state.store().insert_invitation(&invitation).await? {
            state.notifier().notify(notifications::quiz_invite(quiz, &invitation, now));
            results.push(InviteResult { invitation, created: true });
            continue;
        }

        let existing = state
            .store()
            .find_invitation(&quiz.id, &email)
            .await?
            .ok_or(WorkflowError::InvitationNotFound)?;
        results.push(InviteResult { invitation: existing, created: false });
    }

    let created = results.iter().filter(|result| result.created).count();
    tracing::info!(quiz_id = %quiz.id, created, total = results.len(), "Invitations processed");

    Ok(results)
}

/// Pending to accepted. Repeating it, or accepting a completed invitation, changes nothing.
pub(crate) async fn accept(
    state: &AppState,
    quiz_id: &str,
    email: &str,
    now: PrimitiveDateTime,
) -> Result<Invitation, WorkflowError> {
    let email = normalize_email(email);
    let mut invitation = state
        .store()
        .find_invitation(quiz_id, &email)
        .await?
        .ok_or(WorkflowError::InvitationNotFound)?;

    let next = invitation_lifecycle::accept(invitation.status);
    if next != invitation.status && state.store().accept_invitation(quiz_id, &email, now).await? {
        invitation.status = next;
        invitation.updated_at = now;
        tracing::info!(quiz_id, invitation_id = %invitation.id, "Invitation accepted");
    }

    Ok(invitation)
}

/// Acceptance triggered by a student opening the quiz. Uninvited students are fine.
pub(crate) async fn accept_for_student(
    state: &AppState,
    quiz_id: &str,
    email: &str,
    now: PrimitiveDateTime,
) -> Result<(), WorkflowError> {
    match accept(state, quiz_id, email, now).await {
        Ok(_) | Err(WorkflowError::InvitationNotFound) => Ok(()),
        Err(err) => Err(err),
    }
}

pub(crate) async fn remove(
    state: &AppState,
    quiz_id: &str,
    invitation_id: &str,
) -> Result<(), WorkflowError> {
    let invitation = state
        .store()
        .find_invitation_by_id(quiz_id, invitation_id)
        .await?
        .ok_or(WorkflowError::InvitationNotFound)?;

    if !invitation_lifecycle::can_remove(invitation.status) {
        return Err(WorkflowError::InvitationLocked { status: invitation.status });
    }

    if !state.store().delete_pending_invitation(quiz_id, invitation_id).await? {
        let current = state
            .store()
            .find_invitation_by_id(quiz_id, invitation_id)
            .await?
            .ok_or(WorkflowError::InvitationNotFound)?;
        return Err(WorkflowError::InvitationLocked { status: current.status });
    }

    tracing::info!(quiz_id, invitation_id, "Invitation removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::NotificationKind;
    use crate::test_support::{self, sample_invitation, sample_quiz};

    fn invitee(email: &str) -> Invitee {
        Invitee { email: email.to_string(), name: Some(" Ann ".to_string()) }
    }

    #[tokio::test]
    async fn invite_normalizes_and_keeps_existing_records() {
        let ctx = test_support::setup().await;
        let quiz = sample_quiz("quiz-1", "teacher-1");
        ctx.store.put_quiz(quiz.clone());
        ctx.store.put_invitation(sample_invitation("quiz-1", "bob@example.com", InvitationStatus::Completed));

        let results = invite(
            &ctx.state,
            &quiz,
            vec![invitee("  Ann@Example.COM "), invitee("ann@example.com"), invitee("bob@example.com")],
            test_support::fixed_now(),
        )
        .await
        .expect("invite");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].invitation.email, "ann@example.com");
        assert_eq!(results[0].invitation.name.as_deref(), Some("Ann"));
        assert!(results[0].created);
        assert!(!results[1].created);
        assert_eq!(results[1].invitation.status, InvitationStatus::Completed);

        let sent = ctx.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::QuizInvite);
        assert_eq!(sent[0].recipient, "ann@example.com");
    }

    #[tokio::test]
    async fn accept_is_monotonic() {
        let ctx = test_support::setup().await;
        ctx.store.put_quiz(sample_quiz("quiz-1", "teacher-1"));
        ctx.store.put_invitation(sample_invitation("quiz-1", "ann@example.com", InvitationStatus::Pending));
        ctx.store.put_invitation(sample_invitation("quiz-1", "bob@example.com", InvitationStatus::Completed));
        let now = test_support::fixed_now();

        let accepted = accept(&ctx.state, "quiz-1", "ANN@example.com", now).await.unwrap();
        assert_eq!(accepted.status, InvitationStatus::Accepted);
        let again = accept(&ctx.state, "quiz-1", "ann@example.com", now).await.unwrap();
        assert_eq!(again.status, InvitationStatus::Accepted);

        let completed = accept(&ctx.state, "quiz-1", "bob@example.com", now).await.unwrap();
        assert_eq!(completed.status, InvitationStatus::Completed);
        assert_eq!(
            ctx.store.invitation_status("quiz-1", "bob@example.com"),
            Some(InvitationStatus::Completed)
        );

        let missing = accept(&ctx.state, "quiz-1", "eve@example.com", now).await.unwrap_err();
        assert!(matches!(missing, WorkflowError::InvitationNotFound));
    }

    #[tokio::test]
    async fn only_pending_invitations_are_removed() {
        let ctx = test_support::setup().await;
        ctx.store.put_quiz(sample_quiz("quiz-1", "teacher-1"));
        let pending = sample_invitation("quiz-1", "ann@example.com", InvitationStatus::Pending);
        let accepted = sample_invitation("quiz-1", "bob@example.com", InvitationStatus::Accepted);
        ctx.store.put_invitation(pending.clone());
        ctx.store.put_invitation(accepted.clone());

        remove(&ctx.state, "quiz-1", &pending.id).await.expect("remove pending");
        assert_eq!(ctx.store.invitation_status("quiz-1", "ann@example.com"), None);

        let err = remove(&ctx.state, "quiz-1", &accepted.id).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvitationLocked { status: InvitationStatus::Accepted }
        ));

        let err = remove(&ctx.state, "quiz-1", "missing").await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvitationNotFound));
    }
}
