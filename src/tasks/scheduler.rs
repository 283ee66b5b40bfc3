use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::core::shutdown::shutdown_channel;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::tasks::deadlines;

pub(crate) async fn run(state: AppState) -> Result<()> {
    let shutdown = shutdown_channel();

    let sweeper = tokio::spawn(deadline_sweep_loop(state, shutdown));
    if let Err(err) = sweeper.await {
        tracing::error!(error = %err, "Background task join failed");
    }

    Ok(())
}

async fn deadline_sweep_loop(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let period = Duration::from_secs(state.settings().grading().deadline_sweep_interval_seconds);
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_seconds = period.as_secs(), "Deadline sweeper started");
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                if let Err(err) = deadlines::finalize_expired_attempts(&state, primitive_now_utc()).await {
                    tracing::error!(error = %err, "finalize_expired_attempts failed");
                }
            }
        }
    }
    tracing::info!("Deadline sweeper stopped");
}
