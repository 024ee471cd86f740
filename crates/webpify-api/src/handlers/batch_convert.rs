//! Batch conversion endpoint: many images in, one zip archive out.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::Multipart, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use webpify_core::models::{BatchResult, StorageRole};
use webpify_core::AppError;
use webpify_processing::{build_archive, BatchEntry};
use webpify_storage::keys;
use webpify_storage::local::remove_entry;

use crate::error::{ErrorBody, HttpAppError};
use crate::handlers::parse_conversion_form;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchConvertData {
    #[serde(flatten)]
    pub result: BatchResult,
    pub zip_filename: String,
    pub zip_size: u64,
    pub download_url: String,
    pub quality: u8,
    pub timestamp: DateTime<Utc>,
}

/// Convert up to the configured maximum of images in one request.
///
/// Structural limits (file count) reject the request before any conversion
/// starts; everything after that is per-item: a file that fails validation
/// or conversion becomes an error entry in the results while the rest of the
/// batch proceeds. Successful outputs are packaged into a single zip.
#[utoipa::path(
    post,
    path = "/api/batch-convert",
    tag = "convert",
    responses(
        (status = 200, description = "Batch processed", body = BatchConvertData),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn batch_convert(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BatchConvertData>>, HttpAppError> {
    let form = parse_conversion_form(multipart, "images").await?;
    state
        .intake
        .validator()
        .validate_batch_count(form.files.len())
        .map_err(HttpAppError::from)?;

    tracing::info!(
        files = form.files.len(),
        quality = form.request.quality(),
        "Processing batch conversion"
    );

    // Stage every file up front; intake failures ride along as failed items
    let mut entries = Vec::with_capacity(form.files.len());
    for file in &form.files {
        let staged = state.intake.stage(file).await;
        entries.push(BatchEntry {
            original_filename: file.original_name.clone(),
            staged,
        });
    }

    let batch_id = keys::batch_id();
    let working_dir = state.store.role_dir(StorageRole::BatchOutput).join(&batch_id);
    tokio::fs::create_dir_all(&working_dir).await.map_err(|e| {
        HttpAppError(AppError::Storage(format!(
            "Failed to create batch working directory: {}",
            e
        )))
    })?;

    let result = state
        .orchestrator
        .run_batch(entries, &form.request, &working_dir, batch_id)
        .await;

    let members: Vec<PathBuf> = result
        .results
        .iter()
        .filter_map(|item| item.converted_filename.as_deref())
        .map(|filename| working_dir.join(filename))
        .collect();

    let archive_name = keys::archive_key();
    let dest = state
        .store
        .entry_path(StorageRole::BatchOutput, &archive_name)?;

    let archive = match build_archive(members, dest).await {
        Ok(archive) => archive,
        Err(e) => {
            if let Err(cleanup_err) = remove_entry(&working_dir).await {
                tracing::warn!(
                    error = %cleanup_err,
                    path = %working_dir.display(),
                    "Failed to remove batch working directory after archive error"
                );
            }
            return Err(e.into());
        }
    };

    // The archive exists; the intermediate outputs can go shortly
    state
        .lifecycle
        .schedule_removal(working_dir, state.config.batch_dir_grace);

    let message = format!(
        "Successfully converted {} out of {} images",
        result.successful_conversions, result.total_files
    );
    let data = BatchConvertData {
        quality: form.request.quality(),
        download_url: format!("/api/download-batch/{}", archive.filename),
        zip_filename: archive.filename,
        zip_size: archive.size_bytes,
        timestamp: Utc::now(),
        result,
    };

    Ok(Json(ApiResponse::with_message(message, data)))
}
