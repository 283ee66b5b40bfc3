use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    describe();
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

fn describe() {
    metrics::describe_counter!(
        "submissions_recorded_total",
        "Submissions persisted, labelled by their initial status"
    );
    metrics::describe_counter!(
        "attempts_blocked_total",
        "Attempt starts refused because the attempt limit was reached"
    );
    metrics::describe_counter!(
        "scoring_data_errors_total",
        "Questions scored as zero because their stored answer key could not be used"
    );
    metrics::describe_counter!("manual_gradings_total", "Manual grading reconciliations saved");
    metrics::describe_counter!("point_redistributions_total", "Quiz total-score redistributions");
    metrics::describe_counter!(
        "attempts_auto_submitted_total",
        "Attempts finalized by the deadline sweeper"
    );
}
