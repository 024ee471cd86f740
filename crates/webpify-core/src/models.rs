//! Domain models for the conversion pipeline.
//!
//! Wire-facing structs serialize with camelCase field names to preserve the
//! public API contract; filesystem paths never leave the process.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default WebP quality when the caller supplies none (or garbage).
pub const DEFAULT_QUALITY: u8 = 80;
/// Inclusive quality bounds accepted by the encoder.
pub const MIN_QUALITY: u8 = 10;
pub const MAX_QUALITY: u8 = 100;

/// The three storage roles managed by the lifecycle sweeper.
///
/// Each role is a directory under the storage root with its own retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageRole {
    /// Uploaded-but-not-yet-converted files
    Staging,
    /// Single-request conversion outputs awaiting download
    SingleOutput,
    /// Batch working directories and finished archives
    BatchOutput,
}

impl StorageRole {
    /// Directory name for this role under the storage root.
    pub fn dir_name(self) -> &'static str {
        match self {
            StorageRole::Staging => "uploads",
            StorageRole::SingleOutput => "converted",
            StorageRole::BatchOutput => "batch",
        }
    }

    pub fn all() -> [StorageRole; 3] {
        [
            StorageRole::Staging,
            StorageRole::SingleOutput,
            StorageRole::BatchOutput,
        ]
    }
}

/// Per-role retention configuration for the sweep pass.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub role: StorageRole,
    pub max_age: Duration,
}

/// Native pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// One staged input file, exclusively owned by the conversion that consumes it.
///
/// Created by upload intake once the bytes are fully persisted to the staging
/// role. Deleted by the conversion worker on success, or by the caller on
/// failure/abandonment.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Immutable conversion parameters, shared read-only across a whole batch.
///
/// Quality is clamped to [10, 100] at construction; a missing value defaults
/// to 80. Target dimensions are positive or absent.
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest {
    quality: u8,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
}

impl ConversionRequest {
    pub fn new(quality: Option<i64>, target_width: Option<u32>, target_height: Option<u32>) -> Self {
        let quality = quality
            .map(|q| q.clamp(MIN_QUALITY as i64, MAX_QUALITY as i64) as u8)
            .unwrap_or(DEFAULT_QUALITY);
        Self {
            quality,
            target_width: target_width.filter(|&w| w > 0),
            target_height: target_height.filter(|&h| h > 0),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// True if either target dimension was supplied.
    pub fn wants_resize(&self) -> bool {
        self.target_width.is_some() || self.target_height.is_some()
    }
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// One conversion output produced by the worker.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedAsset {
    pub filename: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size_bytes: u64,
    pub original_dimensions: ImageDimensions,
    pub quality: u8,
    pub compression_ratio: f64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one batch element, in submission order.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub original_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_dimensions: Option<ImageDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn success(original_filename: String, original_size: u64, asset: &ConvertedAsset) -> Self {
        Self {
            original_filename,
            converted_filename: Some(asset.filename.clone()),
            original_size: Some(original_size),
            converted_size: Some(asset.size_bytes),
            compression_ratio: Some(asset.compression_ratio),
            original_dimensions: Some(asset.original_dimensions),
            error: None,
        }
    }

    pub fn failure(original_filename: String, error: String) -> Self {
        Self {
            original_filename,
            converted_filename: None,
            original_size: None,
            converted_size: None,
            compression_ratio: None,
            original_dimensions: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of one batch run. Produced once, after every element has been
/// attempted; item order equals submission order.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub batch_id: String,
    pub total_files: usize,
    pub successful_conversions: usize,
    pub failed_conversions: usize,
    pub total_original_size: u64,
    pub total_converted_size: u64,
    /// Computed from summed bytes across the batch, never an average of
    /// per-item ratios.
    pub overall_compression_ratio: f64,
    pub results: Vec<BatchItemResult>,
}

/// Packaged deliverable for one batch.
#[derive(Debug, Clone)]
pub struct Archive {
    pub filename: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Space saved by conversion, as a percentage of the original size, rounded
/// to 2 decimals. Negative when the WebP output is larger than the source;
/// that is a valid outcome, not an error.
pub fn compression_ratio(original_size: u64, converted_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (original_size as f64 - converted_size as f64) / original_size as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_clamped_to_bounds() {
        assert_eq!(ConversionRequest::new(Some(150), None, None).quality(), 100);
        assert_eq!(ConversionRequest::new(Some(5), None, None).quality(), 10);
        assert_eq!(ConversionRequest::new(Some(-3), None, None).quality(), 10);
        assert_eq!(ConversionRequest::new(Some(55), None, None).quality(), 55);
        assert_eq!(ConversionRequest::new(Some(10), None, None).quality(), 10);
        assert_eq!(ConversionRequest::new(Some(100), None, None).quality(), 100);
    }

    #[test]
    fn test_quality_defaults_when_absent() {
        assert_eq!(ConversionRequest::new(None, None, None).quality(), 80);
        assert_eq!(ConversionRequest::default().quality(), 80);
    }

    #[test]
    fn test_zero_dimensions_treated_as_absent() {
        let request = ConversionRequest::new(None, Some(0), Some(0));
        assert_eq!(request.target_width, None);
        assert_eq!(request.target_height, None);
        assert!(!request.wants_resize());

        let request = ConversionRequest::new(None, Some(200), None);
        assert_eq!(request.target_width, Some(200));
        assert!(request.wants_resize());
    }

    #[test]
    fn test_compression_ratio_rounding() {
        // (1000 - 400) / 1000 * 100 = 60.00
        assert_eq!(compression_ratio(1000, 400), 60.0);
        // (3 - 1) / 3 * 100 = 66.666... -> 66.67
        assert_eq!(compression_ratio(3, 1), 66.67);
    }

    #[test]
    fn test_compression_ratio_negative_is_valid() {
        // WebP larger than source
        assert_eq!(compression_ratio(100, 150), -50.0);
    }

    #[test]
    fn test_compression_ratio_zero_original() {
        assert_eq!(compression_ratio(0, 100), 0.0);
    }

    #[test]
    fn test_batch_item_result_serialization_omits_absent_fields() {
        let item = BatchItemResult::failure("a.png".to_string(), "boom".to_string());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json.get("originalFilename").unwrap(), "a.png");
        assert_eq!(json.get("error").unwrap(), "boom");
        assert!(json.get("convertedFilename").is_none());
        assert!(json.get("compressionRatio").is_none());
    }

    #[test]
    fn test_storage_role_dirs_are_distinct() {
        let dirs: Vec<&str> = StorageRole::all().iter().map(|r| r.dir_name()).collect();
        assert_eq!(dirs, vec!["uploads", "converted", "batch"]);
    }
}
