pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;
pub(crate) mod tasks;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::repositories::{AssessmentStore, PgStore};
use crate::services::notifications::StoreNotifier;

async fn build_state() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await.context("Failed to connect to PostgreSQL")?;
    db::run_migrations(&db_pool).await.context("Failed to apply migrations")?;

    let store: Arc<dyn AssessmentStore> = Arc::new(PgStore::new(db_pool));
    let notifier = Arc::new(StoreNotifier::new(store.clone()));

    Ok(AppState::new(settings, store, notifier))
}

pub async fn run() -> anyhow::Result<()> {
    let state = build_state().await?;

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Qura grading API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}

pub async fn run_worker() -> anyhow::Result<()> {
    let state = build_state().await?;

    tracing::info!(
        environment = %state.settings().runtime().environment.as_str(),
        "Qura grading worker started"
    );

    tasks::scheduler::run(state).await
}
