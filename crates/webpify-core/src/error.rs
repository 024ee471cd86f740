//! Error types module
//!
//! This module provides the core error type used throughout the Webpify
//! application. All errors are unified under the `AppError` enum, which maps
//! each failure class onto an HTTP status, a machine-readable code, and a log
//! level. Domain crates keep their own `thiserror` enums (validation,
//! storage, conversion, archiving) and are converted into `AppError` at the
//! API boundary.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Static metadata per variant: (http_status, error_code, sensitive, log_level).
/// `client_message` stays per-variant for dynamic content.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (400, "VALIDATION_ERROR", false, LogLevel::Debug),
        AppError::Conversion(_) => (400, "CONVERSION_ERROR", false, LogLevel::Warn),
        AppError::Archive(_) => (500, "ARCHIVE_ERROR", true, LogLevel::Error),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// HTTP status code to return for this error
    pub fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    pub fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    /// Whether internal details should be hidden from clients
    pub fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    /// Client-facing message (may differ from internal error message)
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Conversion(msg) => msg.clone(),
            AppError::Archive(_) => "Failed to package converted files".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
