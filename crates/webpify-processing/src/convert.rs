//! The conversion worker: one staged file in, one WebP output out.

use std::path::Path;

use chrono::Utc;
use webpify_core::models::{compression_ratio, ConversionRequest, ConvertedAsset, SourceAsset};
use webpify_storage::local::{persist_file, remove_entry};

use crate::codec::{CodecError, WebpCodec};

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    Decode(#[from] CodecError),

    #[error("Failed to read staged upload: {0}")]
    Read(String),

    #[error("Failed to write converted output: {0}")]
    Write(String),

    #[error("Conversion failed: {0}")]
    Internal(String),
}

/// Converts one staged upload into one WebP output.
///
/// On success the staged input is deleted immediately, freeing staging
/// without waiting for the overall request to finish. On failure the input
/// is left in place; the caller decides between retry and abandonment.
#[derive(Debug, Default, Clone)]
pub struct ConversionWorker;

impl ConversionWorker {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(skip(self, source, request), fields(input = %source.original_name))]
    pub async fn convert(
        &self,
        source: &SourceAsset,
        request: &ConversionRequest,
        dest: &Path,
    ) -> Result<ConvertedAsset, ConversionError> {
        let data = tokio::fs::read(&source.path)
            .await
            .map_err(|e| ConversionError::Read(format!("{}: {}", source.path.display(), e)))?;

        // Decode/resize/encode are CPU-bound; keep them off the async runtime.
        let request = *request;
        let (webp_data, original_dimensions) =
            tokio::task::spawn_blocking(move || -> Result<_, ConversionError> {
                let img = WebpCodec::decode(&data)?;
                let original_dimensions = WebpCodec::dimensions(&img);
                let img = if request.wants_resize() {
                    WebpCodec::fit_within(&img, request.target_width, request.target_height)
                } else {
                    img
                };
                let webp_data = WebpCodec::encode_webp(&img, request.quality());
                Ok((webp_data, original_dimensions))
            })
            .await
            .map_err(|e| ConversionError::Internal(format!("conversion task failed: {}", e)))??;

        persist_file(dest, &webp_data)
            .await
            .map_err(|e| ConversionError::Write(e.to_string()))?;

        let size_bytes = webp_data.len() as u64;
        let ratio = compression_ratio(source.size_bytes, size_bytes);

        // Free staging eagerly; the output is already durable.
        if let Err(e) = remove_entry(&source.path).await {
            tracing::warn!(
                error = %e,
                path = %source.path.display(),
                "Failed to remove staged upload after conversion"
            );
        }

        let filename = dest
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        tracing::info!(
            input = %source.original_name,
            output = %filename,
            original_bytes = source.size_bytes,
            converted_bytes = size_bytes,
            compression_ratio = ratio,
            quality = request.quality(),
            "Conversion completed"
        );

        Ok(ConvertedAsset {
            filename,
            path: dest.to_path_buf(),
            size_bytes,
            original_dimensions,
            quality: request.quality(),
            compression_ratio: ratio,
            created_at: Utc::now(),
        })
    }
}
