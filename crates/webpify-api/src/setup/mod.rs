//! Application setup and initialization.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use webpify_core::Config;

use crate::state::AppState;

/// Initialize the application: storage directories, service graph, routes.
/// The background sweep loop is started separately via
/// `state.lifecycle.clone().start()`.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate()?;

    let state = AppState::from_config(config).await?;
    let router = routes::build_router(state.clone());

    tracing::info!(
        storage_root = %state.config.storage_root.display(),
        max_file_mb = state.config.max_file_size_bytes / 1024 / 1024,
        max_batch_files = state.config.max_batch_files,
        sweep_interval_secs = state.config.sweep_interval.as_secs(),
        "Application initialized"
    );

    Ok((state, router))
}
