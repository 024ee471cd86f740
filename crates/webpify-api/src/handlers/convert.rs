//! Single-image conversion endpoint.

use std::sync::Arc;

use axum::{extract::Multipart, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use webpify_core::models::{ImageDimensions, StorageRole};
use webpify_storage::keys;
use webpify_storage::local::remove_entry;

use crate::error::{ErrorBody, HttpAppError};
use crate::handlers::parse_conversion_form;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertData {
    pub original_filename: String,
    pub original_size: u64,
    pub original_dimensions: ImageDimensions,
    pub converted_size: u64,
    pub compression_ratio: f64,
    pub quality: u8,
    pub filename: String,
    pub download_url: String,
    pub timestamp: DateTime<Utc>,
}

/// Convert one uploaded image to WebP.
///
/// The staged upload is deleted as soon as the conversion succeeds; on
/// failure it is removed here, since a failed single-mode request has no
/// retry path.
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "convert",
    responses(
        (status = 200, description = "Image converted successfully", body = ConvertData),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ConvertData>>, HttpAppError> {
    let form = parse_conversion_form(multipart, "image").await?;
    state
        .intake
        .validator()
        .validate_single_count(form.files.len())
        .map_err(HttpAppError::from)?;

    let file = &form.files[0];
    tracing::info!(
        file = %file.original_name,
        size_bytes = file.data.len(),
        quality = form.request.quality(),
        "Processing single conversion"
    );

    let source = state.intake.stage(file).await?;

    let output_name = keys::converted_output_key();
    let dest = state
        .store
        .entry_path(StorageRole::SingleOutput, &output_name)?;

    let asset = match state.converter.convert(&source, &form.request, &dest).await {
        Ok(asset) => asset,
        Err(e) => {
            // Abandon the staged upload; nothing will retry it
            if let Err(cleanup_err) = remove_entry(&source.path).await {
                tracing::warn!(
                    error = %cleanup_err,
                    path = %source.path.display(),
                    "Failed to remove staged upload after conversion error"
                );
            }
            return Err(e.into());
        }
    };

    let data = ConvertData {
        original_filename: source.original_name,
        original_size: source.size_bytes,
        original_dimensions: asset.original_dimensions,
        converted_size: asset.size_bytes,
        compression_ratio: asset.compression_ratio,
        quality: asset.quality,
        download_url: format!("/api/download/{}", asset.filename),
        filename: asset.filename,
        timestamp: Utc::now(),
    };

    Ok(Json(ApiResponse::with_message(
        "Image converted successfully",
        data,
    )))
}
