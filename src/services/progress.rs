use std::collections::BTreeMap;

use time::PrimitiveDateTime;

use crate::core::state::AppState;
use crate::db::models::{Invitation, Quiz, Submission};
use crate::db::types::{InvitationStatus, SubmissionStatus};
use crate::services::invitations::normalize_email;
use crate::services::manual_grading::record_max_score;
use crate::services::score_aggregator::max_score;
use crate::services::submission_lifecycle::percentage;
use crate::services::WorkflowError;

/// One student's standing on a quiz, across all their attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RosterEntry {
    pub(crate) student_id: String,
    pub(crate) student_email: String,
    pub(crate) attempts: u32,
    pub(crate) best_score: i64,
    pub(crate) best_percentage: i64,
    pub(crate) max_score: i64,
    pub(crate) latest_submission_id: String,
    pub(crate) latest_status: SubmissionStatus,
    pub(crate) latest_submitted_at: PrimitiveDateTime,
}

/// Groups submissions per student, most recent activity first.
pub(crate) fn roster(quiz: &Quiz, submissions: &[Submission]) -> Vec<RosterEntry> {
    let max = max_score(quiz);
    let mut grouped: BTreeMap<&str, RosterEntry> = BTreeMap::new();

    for submission in submissions.iter().filter(|submission| submission.quiz_id == quiz.id) {
        let entry = grouped.entry(submission.student_id.as_str()).or_insert_with(|| RosterEntry {
            student_id: submission.student_id.clone(),
            student_email: submission.student_email.clone(),
            attempts: 0,
            best_score: submission.score,
            best_percentage: 0,
            max_score: max,
            latest_submission_id: submission.id.clone(),
            latest_status: submission.status,
            latest_submitted_at: submission.submitted_at,
        });

        entry.attempts += 1;
        entry.best_score = entry.best_score.max(submission.score);
        if submission.submitted_at > entry.latest_submitted_at {
            entry.latest_submission_id = submission.id.clone();
            entry.latest_status = submission.status;
            entry.latest_submitted_at = submission.submitted_at;
        }
    }

    let mut entries: Vec<RosterEntry> = grouped
        .into_values()
        .map(|mut entry| {
            entry.best_percentage = percentage(entry.best_score, entry.max_score);
            entry
        })
        .collect();
    entries.sort_by(|a, b| {
        b.latest_submitted_at
            .cmp(&a.latest_submitted_at)
            .then_with(|| a.student_email.cmp(&b.student_email))
    });
    entries
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistoryResult {
    pub(crate) submission_id: String,
    pub(crate) score: i64,
    pub(crate) max_score: i64,
    pub(crate) percentage: i64,
    pub(crate) status: SubmissionStatus,
    pub(crate) submitted_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistoryItem {
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) invitation_status: InvitationStatus,
    pub(crate) invited_at: PrimitiveDateTime,
    pub(crate) result: Option<HistoryResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HistoryStats {
    pub(crate) total_invited: usize,
    pub(crate) total_completed: usize,
    pub(crate) average_percentage: i64,
    pub(crate) completion_rate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StudentHistory {
    pub(crate) email: String,
    pub(crate) items: Vec<HistoryItem>,
    pub(crate) stats: HistoryStats,
}

pub(crate) fn history_item(
    quiz: &Quiz,
    invitation: &Invitation,
    submissions: &[Submission],
) -> HistoryItem {
    let latest = submissions
        .iter()
        .filter(|submission| submission.quiz_id == quiz.id)
        .max_by_key(|submission| submission.submitted_at);

    let result = latest.filter(|_| invitation.status == InvitationStatus::Completed).map(|latest| {
        let max = match &latest.grading_details {
            Some(details) => record_max_score(details),
            None => max_score(quiz),
        };
        HistoryResult {
            submission_id: latest.id.clone(),
            score: latest.score,
            max_score: max,
            percentage: percentage(latest.score, max),
            status: latest.status,
            submitted_at: latest.submitted_at,
        }
    });

    HistoryItem {
        quiz_id: quiz.id.clone(),
        quiz_title: quiz.title.clone(),
        invitation_status: invitation.status,
        invited_at: invitation.invited_at,
        result,
    }
}

pub(crate) fn history_stats(items: &[HistoryItem]) -> HistoryStats {
    let total_invited = items.len();
    let completed: Vec<&HistoryItem> = items
        .iter()
        .filter(|item| item.invitation_status == InvitationStatus::Completed)
        .collect();

    let percentages: Vec<f64> = completed
        .iter()
        .filter_map(|item| item.result.as_ref())
        .filter(|result| result.max_score > 0)
        .map(|result| result.score as f64 / result.max_score as f64 * 100.0)
        .collect();
    let average_percentage = if percentages.is_empty() {
        0
    } else {
        (percentages.iter().sum::<f64>() / percentages.len() as f64).round() as i64
    };
    let completion_rate = if total_invited == 0 {
        0
    } else {
        (completed.len() as f64 / total_invited as f64 * 100.0).round() as i64
    };

    HistoryStats { total_invited, total_completed: completed.len(), average_percentage, completion_rate }
}

/// A student's invitations to the teacher's quizzes, with their latest results.
pub(crate) async fn student_history(
    state: &AppState,
    teacher_id: &str,
    email: &str,
) -> Result<StudentHistory, WorkflowError> {
    let email = normalize_email(email);
    let invitations = state.store().list_invitations_by_email(&email).await?;
    let submissions = state.store().list_submissions_by_email(&email).await?;

    let mut items = Vec::with_capacity(invitations.len());
    for invitation in &invitations {
        let Some(quiz) = state.store().load_quiz(&invitation.quiz_id).await? else {
            continue;
        };
        if quiz.teacher_id != teacher_id {
            continue;
        }
        items.push(history_item(&quiz, invitation, &submissions));
    }

    let stats = history_stats(&items);
    Ok(StudentHistory { email, items, stats })
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::db::models::{GradingDetail, GradingLine};
    use crate::test_support::{self, sample_invitation, sample_quiz, sample_submission};

    #[test]
    fn roster_groups_attempts_per_student() {
        let quiz = sample_quiz("quiz-1", "teacher-1");
        let mut first = sample_submission(&quiz, "student-1", SubmissionStatus::Graded);
        first.score = 8;
        let mut second = sample_submission(&quiz, "student-1", SubmissionStatus::Graded);
        second.score = 5;
        second.submitted_at += Duration::hours(1);
        let mut other = sample_submission(&quiz, "student-2", SubmissionStatus::PendingReview);
        other.student_email = "bob@example.com".into();
        other.submitted_at += Duration::minutes(5);

        let entries = roster(&quiz, &[first.clone(), second.clone(), other]);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].student_id, "student-1");
        assert_eq!(entries[0].attempts, 2);
        assert_eq!(entries[0].best_score, 8);
        assert_eq!(entries[0].best_percentage, 80);
        assert_eq!(entries[0].latest_submission_id, second.id);
        assert_eq!(entries[1].student_id, "student-2");
        assert_eq!(entries[1].latest_status, SubmissionStatus::PendingReview);
    }

    #[test]
    fn history_prefers_materialized_max_score() {
        let quiz = sample_quiz("quiz-1", "teacher-1");
        let invitation = sample_invitation("quiz-1", "ann@example.com", InvitationStatus::Completed);
        let mut submission = sample_submission(&quiz, "student-1", SubmissionStatus::Graded);
        submission.score = 3;
        submission.grading_details = Some(vec![GradingLine {
            question_id: "q-short".into(),
            detail: GradingDetail { points_awarded: 3, max_points: 4 },
        }]);

        let item = history_item(&quiz, &invitation, &[submission]);
        let result = item.result.expect("result");
        assert_eq!(result.max_score, 4);
        assert_eq!(result.percentage, 75);
    }

    #[test]
    fn history_hides_results_until_completed() {
        let quiz = sample_quiz("quiz-1", "teacher-1");
        let invitation = sample_invitation("quiz-1", "ann@example.com", InvitationStatus::Accepted);
        let submission = sample_submission(&quiz, "student-1", SubmissionStatus::Graded);

        assert_eq!(history_item(&quiz, &invitation, &[submission]).result, None);
    }

    #[test]
    fn stats_average_completed_items() {
        let item = |status: InvitationStatus, score: i64, max: i64| HistoryItem {
            quiz_id: "q".into(),
            quiz_title: "Quiz".into(),
            invitation_status: status,
            invited_at: test_support::fixed_now(),
            result: (status == InvitationStatus::Completed).then(|| HistoryResult {
                submission_id: "s".into(),
                score,
                max_score: max,
                percentage: percentage(score, max),
                status: SubmissionStatus::Graded,
                submitted_at: test_support::fixed_now(),
            }),
        };
        let items = vec![
            item(InvitationStatus::Completed, 5, 10),
            item(InvitationStatus::Completed, 10, 10),
            item(InvitationStatus::Pending, 0, 0),
        ];

        assert_eq!(
            history_stats(&items),
            HistoryStats {
                total_invited: 3,
                total_completed: 2,
                average_percentage: 75,
                completion_rate: 67
            }
        );
        assert_eq!(
            history_stats(&[]),
            HistoryStats {
                total_invited: 0,
                total_completed: 0,
                average_percentage: 0,
                completion_rate: 0
            }
        );
    }

    #[tokio::test]
    async fn history_only_lists_the_teachers_quizzes() {
        let ctx = test_support::setup().await;
        ctx.store.put_quiz(sample_quiz("quiz-1", "teacher-1"));
        ctx.store.put_quiz(sample_quiz("quiz-2", "teacher-2"));
        ctx.store.put_invitation(sample_invitation("quiz-1", "ann@example.com", InvitationStatus::Pending));
        ctx.store.put_invitation(sample_invitation("quiz-2", "ann@example.com", InvitationStatus::Pending));

        let history = student_history(&ctx.state, "teacher-1", " Ann@Example.com").await.unwrap();
        assert_eq!(history.email, "ann@example.com");
        assert_eq!(history.items.len(), 1);
        assert_eq!(history.items[0].quiz_id, "quiz-1");
        assert_eq!(history.stats.completion_rate, 0);
    }
}
