use anyhow::{Context, Result};
use time::PrimitiveDateTime;

use crate::core::state::AppState;
use crate::services::attempt_timing::sweep_cutoff;
use crate::services::submission_finalize::{finalize_attempt, FinalizeMode};

const SWEEP_BATCH_SIZE: i64 = 200;

/// Finalizes active attempts whose deadline and grace window have both passed.
///
/// Each attempt is recorded from its saved draft with `submitted_at = expires_at`.
/// Failures are logged and the attempt stays active for the next sweep.
pub(crate) async fn finalize_expired_attempts(
    state: &AppState,
    now: PrimitiveDateTime,
) -> Result<usize> {
    let cutoff = sweep_cutoff(now, state.settings().grading().submit_grace_seconds);
    let attempts = state
        .store()
        .list_expired_attempts(cutoff, SWEEP_BATCH_SIZE)
        .await
        .context("Failed to fetch expired attempts")?;

    let mut finalized = 0;
    for attempt in &attempts {
        match finalize_attempt(
            state,
            attempt,
            attempt.draft_answers.clone(),
            FinalizeMode::AutoDeadline,
            attempt.expires_at,
        )
        .await
        {
            Ok(outcome) if outcome.created => finalized += 1,
            Ok(_) => {}
            Err(err) => tracing::error!(
                attempt_id = %attempt.id,
                quiz_id = %attempt.quiz_id,
                error = %err,
                "Failed to auto-submit expired attempt"
            ),
        }
    }

    if !attempts.is_empty() {
        tracing::info!(expired = attempts.len(), finalized, "Auto-submitted expired attempts");
    }
    metrics::counter!("attempts_auto_submitted_total").increment(finalized as u64);

    Ok(finalized)
}
