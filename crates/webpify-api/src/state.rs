//! Application state shared by all handlers.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use webpify_core::Config;
use webpify_processing::{BatchOrchestrator, ConversionWorker, UploadIntake, UploadValidator};
use webpify_storage::{DiskStore, LifecycleConfig, StorageLifecycle};

pub struct AppState {
    pub config: Config,
    pub store: Arc<DiskStore>,
    pub lifecycle: Arc<StorageLifecycle>,
    pub intake: UploadIntake,
    pub converter: ConversionWorker,
    pub orchestrator: BatchOrchestrator,
    pub started_at: Instant,
}

impl AppState {
    /// Build the full service graph from configuration. Does not start the
    /// background sweep loop; callers do that explicitly so tests can drive
    /// sweeps manually.
    pub async fn from_config(config: Config) -> Result<Arc<Self>, anyhow::Error> {
        let store = Arc::new(
            DiskStore::new(&config.storage_root)
                .await
                .context("Failed to initialize storage directories")?,
        );

        let lifecycle = Arc::new(StorageLifecycle::new(
            store.clone(),
            LifecycleConfig {
                sweep_interval: config.sweep_interval,
                staging_ttl: config.staging_ttl,
                converted_ttl: config.converted_ttl,
                batch_ttl: config.batch_ttl,
                forced_ttl: config.forced_sweep_ttl,
            },
        ));

        let validator = UploadValidator::new(
            config.max_file_size_bytes,
            config.allowed_content_types.clone(),
            config.max_batch_files,
        );

        Ok(Arc::new(AppState {
            store: store.clone(),
            lifecycle,
            intake: UploadIntake::new(store, validator),
            converter: ConversionWorker::new(),
            orchestrator: BatchOrchestrator::new(config.max_concurrent_conversions),
            started_at: Instant::now(),
            config,
        }))
    }
}
