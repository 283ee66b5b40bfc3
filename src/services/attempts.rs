use rand::seq::SliceRandom;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::db::models::{Answer, AnswerSheet, Attempt, Quiz, Submission};
use crate::db::types::{AttemptStatus, QuestionType};
use crate::services::attempt_gate::{self, AttemptDecision};
use crate::services::attempt_timing::{compute_expiration, is_past_deadline};
use crate::services::invitations::accept_for_student;
use crate::services::submission_finalize::{finalize_attempt, FinalizeMode, FinalizeOutcome};
use crate::services::WorkflowError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StartOutcome {
    Started(Attempt),
    Resumed(Attempt),
    /// No attempt and no submission was created.
    Blocked(AttemptDecision),
}

/// Presentation order of the questions. Scoring always uses quiz order.
pub(crate) fn question_order(quiz: &Quiz) -> Vec<String> {
    let mut order: Vec<String> = quiz.questions.iter().map(|question| question.id.clone()).collect();
    if quiz.settings.shuffle_questions {
        order.shuffle(&mut rand::thread_rng());
    }
    order
}

/// ORDERING questions start from the sequence the student is asked to rearrange.
pub(crate) fn initial_draft(quiz: &Quiz) -> AnswerSheet {
    quiz.questions
        .iter()
        .filter(|question| question.question_type == QuestionType::Ordering)
        .map(|question| (question.id.clone(), Answer::Sequence(question.options.clone())))
        .collect()
}

pub(crate) async fn start_attempt(
    state: &AppState,
    quiz: &Quiz,
    student_id: &str,
    student_email: &str,
    now: PrimitiveDateTime,
) -> Result<StartOutcome, WorkflowError> {
    let grace = state.settings().grading().submit_grace_seconds;

    if let Some(active) = state.store().find_active_attempt(&quiz.id, student_id).await? {
        if !is_past_deadline(active.expires_at, grace, now) {
            accept_for_student(state, &quiz.id, student_email, now).await?;
            return Ok(StartOutcome::Resumed(active));
        }

        let expires_at = active.expires_at;
        let draft = active.draft_answers.clone();
        finalize_attempt(state, &active, draft, FinalizeMode::AutoDeadline, expires_at).await?;
    }

    let used = state.store().count_submissions(&quiz.id, student_id).await?;
    let decision = attempt_gate::decide(used, quiz.settings.max_attempts);
    if let AttemptDecision::MaxAttemptsReached { used, max } = decision {
        tracing::info!(quiz_id = %quiz.id, student_id, used, max, "Attempt blocked by limit");
        metrics::counter!("attempts_blocked_total").increment(1);
        return Ok(StartOutcome::Blocked(decision));
    }

    let attempt = Attempt {
        id: Uuid::new_v4().to_string(),
        quiz_id: quiz.id.clone(),
        student_id: student_id.to_string(),
        student_email: student_email.to_string(),
        started_at: now,
        expires_at: compute_expiration(now, quiz.settings.time_limit_minutes),
        status: AttemptStatus::Active,
        question_order: question_order(quiz),
        draft_answers: initial_draft(quiz),
    };
    state.store().create_attempt(&attempt).await?;
    accept_for_student(state, &quiz.id, student_email, now).await?;

    tracing::info!(
        quiz_id = %quiz.id,
        attempt_id = %attempt.id,
        student_id,
        attempt_number = used + 1,
        "Attempt started"
    );

    Ok(StartOutcome::Started(attempt))
}

pub(crate) async fn save_draft(
    state: &AppState,
    attempt: &Attempt,
    answers: &AnswerSheet,
) -> Result<(), WorkflowError> {
    if attempt.status != AttemptStatus::Active
        || !state.store().save_draft_answers(&attempt.id, answers).await?
    {
        return Err(WorkflowError::AttemptClosed(attempt.id.clone()));
    }
    Ok(())
}

/// Finalizes an attempt with the posted answers, or with its draft once the deadline
/// and grace window have passed. Closed attempts return their existing submission.
pub(crate) async fn submit_attempt(
    state: &AppState,
    attempt: &Attempt,
    posted: Option<AnswerSheet>,
    now: PrimitiveDateTime,
) -> Result<FinalizeOutcome, WorkflowError> {
    if attempt.status == AttemptStatus::Submitted {
        return existing_submission(state, attempt)
            .await
            .map(|submission| FinalizeOutcome { submission, created: false });
    }

    let grace = state.settings().grading().submit_grace_seconds;
    if is_past_deadline(attempt.expires_at, grace, now) {
        tracing::info!(
            attempt_id = %attempt.id,
            expires_at = %attempt.expires_at,
            "Late submit; finalizing saved draft"
        );
        return finalize_attempt(
            state,
            attempt,
            attempt.draft_answers.clone(),
            FinalizeMode::AutoDeadline,
            attempt.expires_at,
        )
        .await;
    }

    let answers = posted.unwrap_or_else(|| attempt.draft_answers.clone());
    finalize_attempt(state, attempt, answers, FinalizeMode::ManualSubmit, now).await
}

async fn existing_submission(
    state: &AppState,
    attempt: &Attempt,
) -> Result<Submission, WorkflowError> {
    state
        .store()
        .find_submission_for_attempt(&attempt.id)
        .await?
        .ok_or_else(|| WorkflowError::AttemptClosed(attempt.id.clone()))
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::db::models::QuizSettings;
    use crate::db::types::{InvitationStatus, SubmissionStatus};
    use crate::test_support::{self, sample_invitation, sample_quiz};

    #[tokio::test]
    async fn start_creates_attempt_with_seeded_ordering_draft() {
        let ctx = test_support::setup().await;
        let quiz = sample_quiz("quiz-1", "teacher-1");
        ctx.store.put_quiz(quiz.clone());
        ctx.store.put_invitation(sample_invitation("quiz-1", "ann@example.com", InvitationStatus::Pending));
        let now = test_support::fixed_now();

        let outcome = start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now)
            .await
            .expect("start");

        let StartOutcome::Started(attempt) = outcome else {
            panic!("expected a new attempt, got {outcome:?}");
        };
        assert_eq!(attempt.expires_at, now + Duration::minutes(10));
        assert_eq!(attempt.question_order.len(), quiz.questions.len());
        assert_eq!(
            attempt.draft_answers.get("q-order"),
            Some(&Answer::Sequence(vec![
                "Prophase".into(),
                "Metaphase".into(),
                "Anaphase".into()
            ]))
        );
        assert_eq!(
            ctx.store.invitation_status("quiz-1", "ann@example.com"),
            Some(InvitationStatus::Accepted)
        );
    }

    #[tokio::test]
    async fn start_resumes_active_attempt() {
        let ctx = test_support::setup().await;
        let quiz = sample_quiz("quiz-1", "teacher-1");
        ctx.store.put_quiz(quiz.clone());
        let now = test_support::fixed_now();

        let StartOutcome::Started(first) =
            start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now).await.unwrap()
        else {
            panic!("expected start");
        };
        let again = start_attempt(
            &ctx.state,
            &quiz,
            "student-1",
            "ann@example.com",
            now + Duration::minutes(2),
        )
        .await
        .unwrap();

        assert_eq!(again, StartOutcome::Resumed(first));
    }

    #[tokio::test]
    async fn fourth_attempt_is_blocked_without_creating_anything() {
        let ctx = test_support::setup().await;
        let quiz = sample_quiz("quiz-1", "teacher-1");
        ctx.store.put_quiz(quiz.clone());
        let mut now = test_support::fixed_now();

        for _ in 0..3 {
            let StartOutcome::Started(attempt) =
                start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now)
                    .await
                    .unwrap()
            else {
                panic!("expected start");
            };
            submit_attempt(&ctx.state, &attempt, Some(AnswerSheet::new()), now).await.unwrap();
            now += Duration::minutes(1);
        }

        let blocked = start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now)
            .await
            .unwrap();
        assert_eq!(
            blocked,
            StartOutcome::Blocked(AttemptDecision::MaxAttemptsReached { used: 3, max: 3 })
        );
        assert_eq!(ctx.store.submission_count(), 3);
        assert_eq!(ctx.store.attempt_count(), 3);
    }

    #[tokio::test]
    async fn late_submit_keeps_the_draft() {
        let ctx = test_support::setup().await;
        let quiz = sample_quiz("quiz-1", "teacher-1");
        ctx.store.put_quiz(quiz.clone());
        let now = test_support::fixed_now();

        let StartOutcome::Started(attempt) =
            start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now).await.unwrap()
        else {
            panic!("expected start");
        };

        let mut draft = attempt.draft_answers.clone();
        draft.insert("q-short".into(), Answer::Text("mitochondria".into()));
        save_draft(&ctx.state, &attempt, &draft).await.expect("save draft");
        let attempt = ctx.store.attempt(&attempt.id).expect("attempt");

        let mut posted = AnswerSheet::new();
        posted.insert("q-num".into(), Answer::Text("3".into()));
        let late = attempt.expires_at + Duration::minutes(5);
        let outcome = submit_attempt(&ctx.state, &attempt, Some(posted), late).await.unwrap();

        assert_eq!(outcome.submission.submitted_at, attempt.expires_at);
        // draft: q-short (2) + q-order seeded in the correct order (3)
        assert_eq!(outcome.submission.score, 5);
    }

    #[tokio::test]
    async fn submit_inside_grace_keeps_posted_answers() {
        let ctx = test_support::setup().await;
        let quiz = sample_quiz("quiz-1", "teacher-1");
        ctx.store.put_quiz(quiz.clone());
        let now = test_support::fixed_now();

        let StartOutcome::Started(attempt) =
            start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now).await.unwrap()
        else {
            panic!("expected start");
        };

        let mut posted = AnswerSheet::new();
        posted.insert("q-num".into(), Answer::Number(3.0));
        let within_grace = attempt.expires_at + Duration::seconds(20);
        let outcome =
            submit_attempt(&ctx.state, &attempt, Some(posted), within_grace).await.unwrap();

        assert_eq!(outcome.submission.score, 3);
        assert_eq!(outcome.submission.submitted_at, within_grace);
    }

    #[tokio::test]
    async fn saving_a_closed_attempt_is_rejected() {
        let ctx = test_support::setup().await;
        let quiz = sample_quiz("quiz-1", "teacher-1");
        ctx.store.put_quiz(quiz.clone());
        let now = test_support::fixed_now();

        let StartOutcome::Started(attempt) =
            start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now).await.unwrap()
        else {
            panic!("expected start");
        };
        submit_attempt(&ctx.state, &attempt, None, now).await.unwrap();

        let err = save_draft(&ctx.state, &attempt, &AnswerSheet::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::AttemptClosed(_)));

        let closed = ctx.store.attempt(&attempt.id).expect("attempt");
        let again = submit_attempt(&ctx.state, &closed, None, now).await.unwrap();
        assert!(!again.created);
    }

    #[tokio::test]
    async fn manual_quizzes_land_in_review() {
        let ctx = test_support::setup().await;
        let mut quiz = sample_quiz("quiz-1", "teacher-1");
        quiz.settings = QuizSettings {
            grading_mode: crate::db::types::GradingMode::Manual,
            ..QuizSettings::default()
        };
        ctx.store.put_quiz(quiz.clone());
        let now = test_support::fixed_now();

        let StartOutcome::Started(attempt) =
            start_attempt(&ctx.state, &quiz, "student-1", "ann@example.com", now).await.unwrap()
        else {
            panic!("expected start");
        };
        let outcome = submit_attempt(&ctx.state, &attempt, None, now).await.unwrap();

        assert_eq!(outcome.submission.status, SubmissionStatus::PendingReview);
        assert_eq!(outcome.submission.graded_at, None);
    }

    #[test]
    fn question_order_is_a_permutation() {
        let quiz = sample_quiz("quiz-1", "teacher-1");
        let mut order = question_order(&quiz);
        order.sort();
        let mut ids: Vec<String> = quiz.questions.iter().map(|q| q.id.clone()).collect();
        ids.sort();
        assert_eq!(order, ids);

        let mut fixed = quiz.clone();
        fixed.settings.shuffle_questions = false;
        let in_order: Vec<String> = fixed.questions.iter().map(|q| q.id.clone()).collect();
        assert_eq!(question_order(&fixed), in_order);
    }
}
