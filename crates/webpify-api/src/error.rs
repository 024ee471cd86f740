//! HTTP error response conversion
//!
//! Every failure leaving the API is rendered as the uniform envelope
//! `{"success": false, "error": ..., "code": ...}`. Handlers return
//! `Result<impl IntoResponse, HttpAppError>`; domain errors convert into
//! `HttpAppError` so they render consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use webpify_core::{AppError, LogLevel};
use webpify_processing::archive::ArchiveError;
use webpify_processing::convert::ConversionError;
use webpify_processing::intake::IntakeError;
use webpify_processing::validator::ValidationError;
use webpify_storage::local::StorageError;

/// Failure half of the response envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse.
/// Necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (type from webpify-core).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::Internal(err.to_string()))
    }
}

fn log_error(error: &AppError) {
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = error.error_code(), "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = error.error_code(), "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = error.error_code(), "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorBody {
            success: false,
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
        });

        (status, body).into_response()
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::Validation(err.to_string()))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(name) => AppError::NotFound(format!("File not found: {}", name)),
            StorageError::InvalidName(name) => {
                AppError::Validation(format!("Invalid filename: {}", name))
            }
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<IntakeError> for HttpAppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Validation(e) => e.into(),
            IntakeError::Storage(e) => e.into(),
        }
    }
}

impl From<ConversionError> for HttpAppError {
    fn from(err: ConversionError) -> Self {
        let app = match err {
            // A file we could not decode is the caller's problem
            ConversionError::Decode(_) => AppError::Conversion(err.to_string()),
            ConversionError::Read(_) | ConversionError::Write(_) => {
                AppError::Storage(err.to_string())
            }
            ConversionError::Internal(_) => AppError::Internal(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<ArchiveError> for HttpAppError {
    fn from(err: ArchiveError) -> Self {
        HttpAppError(AppError::Archive(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_400() {
        let err: HttpAppError = ValidationError::NoFiles.into();
        assert_eq!(err.0.http_status_code(), 400);
        assert_eq!(err.0.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let err: HttpAppError = StorageError::NotFound("x.webp".to_string()).into();
        assert_eq!(err.0.http_status_code(), 404);
        assert!(err.0.client_message().contains("x.webp"));
    }

    #[test]
    fn test_decode_failure_maps_to_400() {
        let codec_err = webpify_processing::codec::CodecError::Decode("bad magic".to_string());
        let err: HttpAppError = ConversionError::Decode(codec_err).into();
        assert_eq!(err.0.http_status_code(), 400);
    }

    #[test]
    fn test_archive_failure_maps_to_500_and_hides_details() {
        let err: HttpAppError = ArchiveError::Finalize("disk full".to_string()).into();
        assert_eq!(err.0.http_status_code(), 500);
        assert!(!err.0.client_message().contains("disk full"));
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            success: false,
            error: "File not found".to_string(),
            code: "NOT_FOUND".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json.get("success").unwrap(), false);
        assert_eq!(json.get("error").unwrap(), "File not found");
        assert_eq!(json.get("code").unwrap(), "NOT_FOUND");
    }
}
