//! Collision-free name generation for staged and produced files.
//!
//! Every name carries a millisecond timestamp plus a random suffix, so
//! concurrent requests never contend for the same path.

use std::path::Path;

use chrono::Utc;

fn token() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), rand::random::<u32>())
}

/// Extract a safe, lowercase extension (with leading dot) from an uploaded
/// filename. Anything other than short alphanumeric extensions is dropped.
fn safe_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

/// Name for a staged upload, preserving the original extension.
pub fn staged_upload_key(original_name: &str) -> String {
    format!("upload-{}{}", token(), safe_extension(original_name))
}

/// Name for a single-mode conversion output.
pub fn converted_output_key() -> String {
    format!("converted-{}.webp", token())
}

/// Identifier (and working-directory name) for one batch run.
pub fn batch_id() -> String {
    format!("batch-{}", token())
}

/// Name for a finished batch archive.
pub fn archive_key() -> String {
    format!("converted-images-{}.zip", token())
}

/// Output name for a batch member, derived from its staged (collision-free)
/// filename.
pub fn webp_name_for(staged_name: &str) -> String {
    let stem = Path::new(staged_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(staged_name);
    format!("{}.webp", stem)
}
