use crate::db::models::{AnswerSheet, Quiz};
use crate::services::scoring::{score_question, QuestionVerdict};

/// Per-question verdicts in quiz order plus their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreSheet {
    pub(crate) lines: Vec<(String, QuestionVerdict)>,
    pub(crate) total: i64,
}

pub(crate) fn score_sheet(quiz: &Quiz, answers: &AnswerSheet) -> ScoreSheet {
    let lines: Vec<(String, QuestionVerdict)> = quiz
        .questions
        .iter()
        .map(|question| (question.id.clone(), score_question(question, answers.get(&question.id))))
        .collect();
    let total = lines.iter().map(|(_, verdict)| i64::from(verdict.points)).sum();

    ScoreSheet { lines, total }
}

pub(crate) fn max_score(quiz: &Quiz) -> i64 {
    quiz.questions.iter().map(|question| i64::from(question.points)).sum()
}

/// Splits `target` over `count` questions: the first `target % count` get one extra point.
/// Returns `None` when there is nothing to distribute over.
pub(crate) fn redistribute(count: usize, target: i32) -> Option<Vec<i32>> {
    let count_i32 = i32::try_from(count).ok().filter(|count| *count > 0)?;
    let base = target / count_i32;
    let remainder = (target % count_i32) as usize;

    Some((0..count).map(|index| if index < remainder { base + 1 } else { base }).collect())
}
