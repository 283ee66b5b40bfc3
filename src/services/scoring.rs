use serde::Serialize;

use crate::db::models::{Answer, Question};
use crate::services::question_model::{decode_pairing_key, normalize_text, ScoringRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
    ManualReview,
    /// The stored answer key could not be used; scored as zero.
    DataError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct QuestionVerdict {
    pub(crate) points: i32,
    pub(crate) outcome: Outcome,
}

impl QuestionVerdict {
    fn zero(outcome: Outcome) -> Self {
        Self { points: 0, outcome }
    }
}

/// Scores one answer, all-or-nothing. Never fails: unusable keys degrade to zero.
pub(crate) fn score_question(question: &Question, answer: Option<&Answer>) -> QuestionVerdict {
    let rule = ScoringRule::for_question(question);
    if rule == ScoringRule::ManualReview {
        return QuestionVerdict::zero(Outcome::ManualReview);
    }

    let Some(answer) = answer.filter(|answer| !answer.is_blank()) else {
        return QuestionVerdict::zero(Outcome::Unanswered);
    };

    let Some(key) = question.correct_answer.as_deref() else {
        report_data_error(question, "missing answer key");
        return QuestionVerdict::zero(Outcome::DataError);
    };

    let matched = match rule {
        ScoringRule::Choice | ScoringRule::ChoiceSet | ScoringRule::FreeText => {
            answer.as_text(",").is_some_and(|text| normalize_text(&text) == normalize_text(key))
        }
        ScoringRule::Numeric => {
            let Ok(expected) = key.trim().parse::<f64>() else {
                report_data_error(question, "numeric answer key does not parse");
                return QuestionVerdict::zero(Outcome::DataError);
            };
            submitted_number(answer).is_some_and(|value| value == expected)
        }
        ScoringRule::Sequence => match answer {
            Answer::Sequence(items) => items.join(", ") == key,
            Answer::Text(joined) => joined == key,
            _ => false,
        },
        ScoringRule::Pairing => {
            let expected = match decode_pairing_key(key) {
                Ok(expected) => expected,
                Err(err) => {
                    report_data_error(question, &err.to_string());
                    return QuestionVerdict::zero(Outcome::DataError);
                }
            };
            match answer {
                Answer::Pairs(submitted) => {
                    submitted.len() == expected.len()
                        && expected.iter().all(|(item, target)| submitted.get(item) == Some(target))
                }
                _ => false,
            }
        }
        ScoringRule::ManualReview => false,
    };

    if matched {
        QuestionVerdict { points: question.points.max(0), outcome: Outcome::Correct }
    } else {
        QuestionVerdict::zero(Outcome::Incorrect)
    }
}

fn submitted_number(answer: &Answer) -> Option<f64> {
    match answer {
        Answer::Number(value) => Some(*value),
        Answer::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn report_data_error(question: &Question, error: &str) {
    tracing::warn!(
        question_id = %question.id,
        question_type = question.question_type.as_str(),
        error,
        "Unusable answer key; scoring question as zero"
    );
    metrics::counter!("scoring_data_errors_total").increment(1);
}
