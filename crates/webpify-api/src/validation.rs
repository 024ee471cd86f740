//! Request-level validation helpers.

use webpify_core::AppError;

/// Validate a download filename before any filesystem access.
///
/// This is a security boundary: only `[A-Za-z0-9-_.]` characters and the
/// expected extension are accepted, which rules out path traversal and shell
/// metacharacters.
pub fn validate_download_filename(filename: &str, required_ext: &str) -> Result<(), AppError> {
    let valid_charset = !filename.is_empty()
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if !valid_charset || !filename.ends_with(required_ext) {
        return Err(AppError::Validation("Invalid filename".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_generated_names() {
        assert!(validate_download_filename("converted-1700000000000-42.webp", ".webp").is_ok());
        assert!(
            validate_download_filename("converted-images-1700000000000-42.zip", ".zip").is_ok()
        );
    }

    #[test]
    fn test_rejects_path_traversal() {
        assert!(validate_download_filename("../../etc/passwd.webp", ".webp").is_err());
        assert!(validate_download_filename("..%2Fpasswd.webp", ".webp").is_err());
        assert!(validate_download_filename("a/b.webp", ".webp").is_err());
        assert!(validate_download_filename("a\\b.webp", ".webp").is_err());
    }

    #[test]
    fn test_rejects_shell_metacharacters() {
        assert!(validate_download_filename("x;rm.webp", ".webp").is_err());
        assert!(validate_download_filename("x rm.webp", ".webp").is_err());
        assert!(validate_download_filename("x$(id).webp", ".webp").is_err());
    }

    #[test]
    fn test_rejects_wrong_extension() {
        assert!(validate_download_filename("file.zip", ".webp").is_err());
        assert!(validate_download_filename("file.webp", ".zip").is_err());
        assert!(validate_download_filename("", ".webp").is_err());
    }
}
