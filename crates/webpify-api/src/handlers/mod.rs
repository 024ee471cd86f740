//! Route handlers and shared multipart intake parsing.

pub mod batch_convert;
pub mod cleanup;
pub mod convert;
pub mod download;
pub mod health;
pub mod storage;

use axum::extract::Multipart;
use webpify_core::models::ConversionRequest;
use webpify_core::AppError;
use webpify_processing::IncomingFile;

use crate::error::HttpAppError;

/// Everything a conversion request carries: the uploaded files plus the
/// shared conversion settings. Settings fields may arrive before or after
/// the file parts, so the whole form is read before anything is staged.
pub struct ConversionForm {
    pub files: Vec<IncomingFile>,
    pub request: ConversionRequest,
}

/// Read a multipart conversion form. File parts are accepted from the field
/// named `file_field` ("image" for single mode, "images" for batch);
/// `quality`, `width` and `height` arrive as text fields. Unknown fields are
/// ignored.
pub async fn parse_conversion_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<ConversionForm, HttpAppError> {
    let mut files = Vec::new();
    let mut quality: Option<i64> = None;
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpAppError(AppError::Validation(format!("Invalid multipart payload: {}", e)))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let original_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unnamed".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field.bytes().await.map_err(|e| {
                HttpAppError(AppError::Validation(format!(
                    "Failed to read uploaded file '{}': {}",
                    original_name, e
                )))
            })?;
            files.push(IncomingFile {
                original_name,
                content_type,
                data,
            });
            continue;
        }

        let text = field.text().await.unwrap_or_default();
        match name.as_str() {
            // Non-numeric values fall back to the defaults
            "quality" => quality = text.trim().parse::<i64>().ok(),
            "width" => width = text.trim().parse::<u32>().ok().filter(|&w| w > 0),
            "height" => height = text.trim().parse::<u32>().ok().filter(|&h| h > 0),
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
            }
        }
    }

    Ok(ConversionForm {
        files,
        request: ConversionRequest::new(quality, width, height),
    })
}
