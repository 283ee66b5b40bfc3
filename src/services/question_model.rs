use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::db::models::Question;
use crate::db::types::QuestionType;

/// How a question's answer is compared against its key. Exactly one per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScoringRule {
    /// One option picked from `options`, compared case-insensitively.
    Choice,
    /// Free text compared case-insensitively.
    FreeText,
    /// Selection joined with `,` and compared as one case-folded string.
    ChoiceSet,
    Numeric,
    /// The submitted sequence joined by `", "`, compared verbatim.
    Sequence,
    /// Item to match mapping, all-or-nothing.
    Pairing,
    ManualReview,
}

impl ScoringRule {
    pub(crate) fn for_question(question: &Question) -> Self {
        match question.question_type {
            QuestionType::TrueFalse | QuestionType::SingleChoice => Self::Choice,
            QuestionType::ShortAnswer | QuestionType::FillBlank => Self::FreeText,
            QuestionType::MultipleChoice => Self::ChoiceSet,
            QuestionType::Numerical => Self::Numeric,
            QuestionType::Ordering => Self::Sequence,
            QuestionType::Matching => Self::Pairing,
            QuestionType::Essay => Self::ManualReview,
            QuestionType::Graphical if question.options.is_empty() => Self::FreeText,
            QuestionType::Graphical => Self::Choice,
        }
    }
}

/// Splits flattened MATCHING options into `(item, match)` pairs. A trailing odd entry is dropped.
pub(crate) fn matching_pairs(options: &[String]) -> Vec<(&str, &str)> {
    options.chunks_exact(2).map(|pair| (pair[0].as_str(), pair[1].as_str())).collect()
}

pub(crate) fn decode_pairing_key(raw: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    serde_json::from_str(raw)
}

pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub(crate) enum QuestionIssue {
    #[error("points must be positive, got {points}")]
    NonPositivePoints { points: i32 },
    #[error("question has no correct answer")]
    MissingAnswerKey,
    #[error("question has no options to choose from")]
    MissingOptions,
    #[error("correct answer '{key}' is not one of the options")]
    KeyNotInOptions { key: String },
    #[error("correct order is not a permutation of the options")]
    OrderingNotPermutation,
    #[error("matching options must come in item/match pairs, got {len} entries")]
    OddMatchingOptions { len: usize },
    #[error("matching answer key is not a valid mapping: {error}")]
    UndecodableMatchingKey { error: String },
    #[error("matching answer key references unknown item '{item}'")]
    UnknownMatchingItem { item: String },
    #[error("numeric answer key '{key}' does not parse")]
    UnparsableNumericKey { key: String },
}

/// Reports shape problems without rejecting the question.
pub(crate) fn validate_question(question: &Question) -> Vec<QuestionIssue> {
    let mut issues = Vec::new();
    if question.points <= 0 {
        issues.push(QuestionIssue::NonPositivePoints { points: question.points });
    }

    let rule = ScoringRule::for_question(question);
    if rule == ScoringRule::ManualReview {
        return issues;
    }

    let Some(key) = question.correct_answer.as_deref().filter(|key| !key.trim().is_empty()) else {
        issues.push(QuestionIssue::MissingAnswerKey);
        return issues;
    };

    match rule {
        ScoringRule::Choice => check_choice(question, key, &mut issues),
        ScoringRule::ChoiceSet => check_choice_set(question, key, &mut issues),
        ScoringRule::Numeric => {
            if key.trim().parse::<f64>().is_err() {
                issues.push(QuestionIssue::UnparsableNumericKey { key: key.to_string() });
            }
        }
        ScoringRule::Sequence => check_sequence(question, key, &mut issues),
        ScoringRule::Pairing => check_pairing(question, key, &mut issues),
        ScoringRule::FreeText | ScoringRule::ManualReview => {}
    }

    issues
}

fn check_choice(question: &Question, key: &str, issues: &mut Vec<QuestionIssue>) {
    if question.options.is_empty() {
        let boolean_key = matches!(normalize_text(key).as_str(), "true" | "false");
        if !(question.question_type == QuestionType::TrueFalse && boolean_key) {
            issues.push(QuestionIssue::MissingOptions);
        }
        return;
    }

    let wanted = normalize_text(key);
    if !question.options.iter().any(|option| normalize_text(option) == wanted) {
        issues.push(QuestionIssue::KeyNotInOptions { key: key.to_string() });
    }
}

fn check_choice_set(question: &Question, key: &str, issues: &mut Vec<QuestionIssue>) {
    if question.options.is_empty() {
        issues.push(QuestionIssue::MissingOptions);
        return;
    }

    let options: Vec<String> = question.options.iter().map(|option| normalize_text(option)).collect();
    for part in key.split(',') {
        if !options.contains(&normalize_text(part)) {
            issues.push(QuestionIssue::KeyNotInOptions { key: part.trim().to_string() });
        }
    }
}

fn check_sequence(question: &Question, key: &str, issues: &mut Vec<QuestionIssue>) {
    if question.options.is_empty() {
        issues.push(QuestionIssue::MissingOptions);
        return;
    }

    let mut expected: Vec<&str> = key.split(',').map(str::trim).collect();
    let mut offered: Vec<&str> = question.options.iter().map(|option| option.trim()).collect();
    expected.sort_unstable();
    offered.sort_unstable();
    if expected != offered {
        issues.push(QuestionIssue::OrderingNotPermutation);
    }
}

fn check_pairing(question: &Question, key: &str, issues: &mut Vec<QuestionIssue>) {
    if question.options.len() % 2 != 0 {
        issues.push(QuestionIssue::OddMatchingOptions { len: question.options.len() });
    }

    let mapping = match decode_pairing_key(key) {
        Ok(mapping) => mapping,
        Err(err) => {
            issues.push(QuestionIssue::UndecodableMatchingKey { error: err.to_string() });
            return;
        }
    };

    let pairs = matching_pairs(&question.options);
    if pairs.is_empty() {
        return;
    }

    for item in mapping.keys() {
        if !pairs.iter().any(|(known, _)| known == item) {
            issues.push(QuestionIssue::UnknownMatchingItem { item: item.clone() });
        }
    }
}
