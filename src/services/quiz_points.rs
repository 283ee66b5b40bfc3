use crate::core::state::AppState;
use crate::db::models::Quiz;
use crate::services::score_aggregator::{max_score, redistribute};
use crate::services::WorkflowError;

/// Spreads `target` over the quiz's questions and stores it as a new revision.
///
/// Stored submissions keep the score and revision they were recorded with.
pub(crate) async fn redistribute_total(
    state: &AppState,
    quiz: &Quiz,
    target: i32,
    expected_revision: Option<i64>,
) -> Result<Quiz, WorkflowError> {
    if quiz.questions.is_empty() {
        return Ok(quiz.clone());
    }

    if usize::try_from(target).map_or(true, |target| target < quiz.questions.len()) {
        return Err(WorkflowError::InvalidTarget { target, questions: quiz.questions.len() });
    }

    let Some(points) = redistribute(quiz.questions.len(), target) else {
        return Ok(quiz.clone());
    };

    let expected = expected_revision.unwrap_or(quiz.revision);
    if expected != quiz.revision {
        return Err(WorkflowError::RevisionConflict { expected });
    }

    if quiz.questions.iter().map(|question| question.points).eq(points.iter().copied()) {
        tracing::debug!(quiz_id = %quiz.id, target, "Quiz points already match target");
        return Ok(quiz.clone());
    }

    let assignments: Vec<(String, i32)> = quiz
        .questions
        .iter()
        .zip(points.iter().copied())
        .map(|(question, value)| (question.id.clone(), value))
        .collect();

    let revision = state
        .store()
        .save_question_points(&quiz.id, expected, &assignments)
        .await?
        .ok_or(WorkflowError::RevisionConflict { expected })?;

    let mut updated = quiz.clone();
    for (question, value) in updated.questions.iter_mut().zip(points) {
        question.points = value;
    }
    updated.revision = revision;

    tracing::info!(
        quiz_id = %quiz.id,
        previous_total = max_score(quiz),
        target,
        revision,
        "Quiz points redistributed"
    );
    metrics::counter!("point_redistributions_total").increment(1);

    Ok(updated)
}
