use serde::Serialize;

/// Outcome of asking whether a student may start another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum AttemptDecision {
    Allowed { used: u32, max: u32 },
    /// Terminal until the quiz's `max_attempts` is raised.
    MaxAttemptsReached { used: u32, max: u32 },
}

pub(crate) fn can_attempt(attempts_used: u32, max_attempts: u32) -> bool {
    attempts_used < max_attempts
}

pub(crate) fn decide(attempts_used: u32, max_attempts: u32) -> AttemptDecision {
    if can_attempt(attempts_used, max_attempts) {
        AttemptDecision::Allowed { used: attempts_used, max: max_attempts }
    } else {
        AttemptDecision::MaxAttemptsReached { used: attempts_used, max: max_attempts }
    }
}
