//! Upload intake validation.

/// Validation errors for incoming uploads
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {filename} is {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("Invalid file type '{content_type}'. Only JPEG, PNG, GIF, BMP, TIFF, and WebP are allowed.")]
    InvalidContentType { content_type: String },

    #[error("Empty file: {0}")]
    EmptyFile(String),

    #[error("No file uploaded")]
    NoFiles,

    #[error("Too many files: {count} exceeds the limit of {max} per batch")]
    TooManyFiles { count: usize, max: usize },

    #[error("Only one file may be uploaded per conversion request")]
    MultipleFilesInSingleMode,
}

/// Upload validator
///
/// Checks declared size and MIME type against the configured limits without
/// touching storage. Structural limits (file counts) are checked separately
/// so batch requests can be rejected before any staging happens.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
    max_batch_files: usize,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        allowed_content_types: Vec<String>,
        max_batch_files: usize,
    ) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
            max_batch_files,
        }
    }

    /// Validate one file's declared size and MIME type.
    pub fn validate_file(
        &self,
        filename: &str,
        content_type: &str,
        size: usize,
    ) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile(filename.to_string()));
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                filename: filename.to_string(),
                size,
                max: self.max_file_size,
            });
        }

        let normalized = content_type.to_lowercase();
        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Whole-request check for batch mode, before any conversion starts.
    pub fn validate_batch_count(&self, count: usize) -> Result<(), ValidationError> {
        if count == 0 {
            return Err(ValidationError::NoFiles);
        }
        if count > self.max_batch_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.max_batch_files,
            });
        }
        Ok(())
    }

    /// Whole-request check for single mode.
    pub fn validate_single_count(&self, count: usize) -> Result<(), ValidationError> {
        match count {
            0 => Err(ValidationError::NoFiles),
            1 => Ok(()),
            _ => Err(ValidationError::MultipleFilesInSingleMode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> UploadValidator {
        UploadValidator::new(
            10 * 1024 * 1024,
            vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
            ],
            20,
        )
    }

    #[test]
    fn test_validate_file_ok() {
        let validator = test_validator();
        assert!(validator.validate_file("a.png", "image/png", 1024).is_ok());
        // Case-insensitive content type
        assert!(validator.validate_file("a.png", "IMAGE/PNG", 1024).is_ok());
    }

    #[test]
    fn test_validate_file_too_large_names_the_file() {
        let validator = test_validator();
        let err = validator
            .validate_file("huge.png", "image/png", 11 * 1024 * 1024)
            .unwrap_err();
        assert!(err.to_string().contains("huge.png"));
    }

    #[test]
    fn test_validate_file_rejects_disallowed_type() {
        let validator = test_validator();
        let result = validator.validate_file("doc.pdf", "application/pdf", 100);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_validate_file_rejects_empty() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file("zero.png", "image/png", 0),
            Err(ValidationError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_validate_batch_count() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_batch_count(0),
            Err(ValidationError::NoFiles)
        ));
        assert!(validator.validate_batch_count(20).is_ok());
        assert!(matches!(
            validator.validate_batch_count(21),
            Err(ValidationError::TooManyFiles { .. })
        ));
    }

    #[test]
    fn test_validate_single_count() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_single_count(0),
            Err(ValidationError::NoFiles)
        ));
        assert!(validator.validate_single_count(1).is_ok());
        assert!(matches!(
            validator.validate_single_count(2),
            Err(ValidationError::MultipleFilesInSingleMode)
        ));
    }
}
