//! The image codec seam: decode, dimension extraction, fit-inside resize, and
//! WebP encoding.
//!
//! This is the single opaque capability the conversion worker depends on.
//! Encoding uses the encoder's default effort level; only quality is
//! caller-controlled.

use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use webpify_core::models::ImageDimensions;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
}

/// Decode/resize/encode operations for producing WebP output.
pub struct WebpCodec;

impl WebpCodec {
    /// Decode image bytes, sniffing the container format from content.
    pub fn decode(data: &[u8]) -> Result<DynamicImage, CodecError> {
        let cursor = Cursor::new(data);
        image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Native pixel dimensions of a decoded image.
    pub fn dimensions(img: &DynamicImage) -> ImageDimensions {
        let (width, height) = img.dimensions();
        ImageDimensions { width, height }
    }

    /// Resize to fit inside the requested box, preserving aspect ratio and
    /// never enlarging past the source's native size. Absent bounds are
    /// unconstrained.
    pub fn fit_within(
        img: &DynamicImage,
        target_width: Option<u32>,
        target_height: Option<u32>,
    ) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let (new_width, new_height) =
            fit_inside(orig_width, orig_height, target_width, target_height);

        if (new_width, new_height) == (orig_width, orig_height) {
            return img.clone();
        }

        let filter = select_filter(orig_width, orig_height, new_width, new_height);
        img.resize_exact(new_width, new_height, filter)
    }

    /// Encode to lossy WebP at the given quality (already clamped by the
    /// caller). Effort stays at the encoder default.
    pub fn encode_webp(img: &DynamicImage, quality: u8) -> Vec<u8> {
        let (width, height) = img.dimensions();
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(quality as f32);

        webp_data.to_vec()
    }
}

/// Compute output dimensions for a fit-inside resize. The scale factor is
/// capped at 1.0 so output never exceeds the source dimensions.
pub fn fit_inside(
    orig_width: u32,
    orig_height: u32,
    target_width: Option<u32>,
    target_height: Option<u32>,
) -> (u32, u32) {
    if orig_width == 0 || orig_height == 0 {
        return (orig_width, orig_height);
    }

    let width_ratio = target_width
        .map(|w| w as f64 / orig_width as f64)
        .unwrap_or(f64::INFINITY);
    let height_ratio = target_height
        .map(|h| h as f64 / orig_height as f64)
        .unwrap_or(f64::INFINITY);

    let scale = width_ratio.min(height_ratio).min(1.0);
    if scale >= 1.0 {
        return (orig_width, orig_height);
    }

    let new_width = ((orig_width as f64 * scale).round() as u32).max(1);
    let new_height = ((orig_height as f64 * scale).round() as u32).max(1);
    (new_width, new_height)
}

/// Select a downscale filter based on the resize ratio: cheaper filters for
/// aggressive downscales, Lanczos for near-native output.
fn select_filter(
    orig_width: u32,
    orig_height: u32,
    new_width: u32,
    new_height: u32,
) -> image::imageops::FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        image::imageops::FilterType::Triangle
    } else if max_ratio > 1.5 {
        image::imageops::FilterType::CatmullRom
    } else {
        image::imageops::FilterType::Lanczos3
    }
}
