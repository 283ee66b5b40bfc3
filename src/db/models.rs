use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{
    AttemptStatus, GradingMode, InvitationStatus, NotificationKind, QuestionType, SubmissionStatus,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Question {
    pub(crate) id: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    #[serde(default)]
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default, deserialize_with = "answer_key")]
    pub(crate) correct_answer: Option<String>,
    pub(crate) points: i32,
}

/// Generated content sometimes carries keys as arrays or objects; they are stored JSON-encoded.
fn answer_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(value)) => Some(value),
        Some(serde_json::Value::Number(value)) => Some(value.to_string()),
        Some(serde_json::Value::Bool(value)) => Some(value.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct QuizSettings {
    #[serde(default = "default_time_limit")]
    pub(crate) time_limit_minutes: u32,
    #[serde(default = "default_max_attempts")]
    pub(crate) max_attempts: u32,
    #[serde(default)]
    pub(crate) grading_mode: GradingMode,
    #[serde(default = "default_true")]
    pub(crate) show_results_immediately: bool,
    #[serde(default = "default_true")]
    pub(crate) shuffle_questions: bool,
    #[serde(default = "default_passing_score")]
    pub(crate) passing_score: u32,
}

fn default_time_limit() -> u32 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_passing_score() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_minutes: default_time_limit(),
            max_attempts: default_max_attempts(),
            grading_mode: GradingMode::Auto,
            show_results_immediately: true,
            shuffle_questions: true,
            passing_score: default_passing_score(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Quiz {
    pub(crate) id: String,
    pub(crate) teacher_id: String,
    pub(crate) title: String,
    pub(crate) settings: QuizSettings,
    /// Bumped on every point change; submissions remember the revision they were scored against.
    pub(crate) revision: i64,
    pub(crate) questions: Vec<Question>,
}

impl Quiz {
    pub(crate) fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == question_id)
    }

    pub(crate) fn has_essay(&self) -> bool {
        self.questions.iter().any(|question| question.question_type == QuestionType::Essay)
    }
}

/// A submitted answer in whatever shape the client sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum Answer {
    Blank,
    Flag(bool),
    Number(f64),
    Text(String),
    Sequence(Vec<String>),
    Pairs(BTreeMap<String, String>),
}

impl Answer {
    pub(crate) fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(value) => value.is_empty(),
            Self::Sequence(items) => items.is_empty(),
            Self::Pairs(pairs) => pairs.is_empty(),
            Self::Flag(_) | Self::Number(_) => false,
        }
    }

    /// Scalar rendering used by the text and choice rules. Pairs have none.
    pub(crate) fn as_text(&self, separator: &str) -> Option<String> {
        match self {
            Self::Blank | Self::Pairs(_) => None,
            Self::Flag(value) => Some(value.to_string()),
            Self::Number(value) => Some(value.to_string()),
            Self::Text(value) => Some(value.clone()),
            Self::Sequence(items) => Some(items.join(separator)),
        }
    }
}

pub(crate) type AnswerSheet = BTreeMap<String, Answer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GradingDetail {
    pub(crate) points_awarded: i32,
    pub(crate) max_points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GradingLine {
    pub(crate) question_id: String,
    #[serde(flatten)]
    pub(crate) detail: GradingDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Attempt {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) student_id: String,
    pub(crate) student_email: String,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) status: AttemptStatus,
    pub(crate) question_order: Vec<String>,
    pub(crate) draft_answers: AnswerSheet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) attempt_id: String,
    pub(crate) student_id: String,
    pub(crate) student_email: String,
    pub(crate) quiz_revision: i64,
    pub(crate) answers: AnswerSheet,
    pub(crate) score: i64,
    pub(crate) status: SubmissionStatus,
    pub(crate) grading_details: Option<Vec<GradingLine>>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub(crate) struct Invitation {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) email: String,
    pub(crate) name: Option<String>,
    pub(crate) status: InvitationStatus,
    pub(crate) invited_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: String,
    /// User id for teachers, email for invited students.
    pub(crate) recipient: String,
    pub(crate) kind: NotificationKind,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) quiz_id: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}
