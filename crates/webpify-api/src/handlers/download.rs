//! Download endpoints for converted files and batch archives.
//!
//! Filename validation happens before any filesystem access; a successful
//! send schedules removal of the artifact after a short grace period.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;
use webpify_core::models::StorageRole;
use webpify_core::AppError;

use crate::error::{ErrorBody, HttpAppError};
use crate::state::AppState;
use crate::validation::validate_download_filename;

/// Download one converted WebP image.
#[utoipa::path(
    get,
    path = "/api/download/{filename}",
    tag = "download",
    params(
        ("filename" = String, Path, description = "Converted output filename")
    ),
    responses(
        (status = 200, description = "WebP image", content_type = "image/webp"),
        (status = 400, description = "Invalid filename", body = ErrorBody),
        (status = 404, description = "File not found or expired", body = ErrorBody)
    )
)]
pub async fn download_converted(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_download(
        &state,
        StorageRole::SingleOutput,
        &filename,
        ".webp",
        "image/webp",
        state.config.download_grace,
    )
    .await
}

/// Download one batch archive.
#[utoipa::path(
    get,
    path = "/api/download-batch/{filename}",
    tag = "download",
    params(
        ("filename" = String, Path, description = "Batch archive filename")
    ),
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip"),
        (status = 400, description = "Invalid filename", body = ErrorBody),
        (status = 404, description = "File not found or expired", body = ErrorBody)
    )
)]
pub async fn download_batch(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_download(
        &state,
        StorageRole::BatchOutput,
        &filename,
        ".zip",
        "application/zip",
        state.config.batch_download_grace,
    )
    .await
}

async fn serve_download(
    state: &AppState,
    role: StorageRole,
    filename: &str,
    required_ext: &str,
    content_type: &str,
    grace: Duration,
) -> Result<Response, HttpAppError> {
    validate_download_filename(filename, required_ext).map_err(HttpAppError::from)?;

    let (file, len) = state.store.open(role, filename).await?;
    let path = state.store.entry_path(role, filename)?;

    tracing::info!(file = %filename, size_bytes = len, "Serving download");

    let stream = ReaderStream::new(file);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))?;

    // One-shot reclamation once the client has had its grace period
    state.lifecycle.schedule_removal(path, grace);

    Ok(response)
}
