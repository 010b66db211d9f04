//! Source image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) or a base64 data URL
//! and produces a decoded RGBA raster with known natural dimensions.
//! Decode is the only suspension point in the hosting application;
//! everything downstream of a [`SourceImage`] is synchronous.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;

use crate::types::{Dimensions, RgbaImage, TransformError};

/// A decoded source image: immutable RGBA pixels plus natural dimensions.
///
/// Owned exclusively by the pipeline invocation (or edit session) that
/// decoded it, and discarded wholesale when a new source supersedes it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
    dimensions: Dimensions,
}

impl SourceImage {
    /// Decode raw image bytes into a source raster.
    ///
    /// Supports whatever the `image` crate's enabled codecs can decode
    /// (PNG, JPEG, BMP, WebP).
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::EmptyInput`] if `bytes` is empty.
    /// Returns [`TransformError::Decode`] if the format is unrecognized
    /// or the data is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransformError> {
        if bytes.is_empty() {
            return Err(TransformError::EmptyInput);
        }

        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(&decoded))
    }

    /// Decode a base64 data URL of the form `data:<mime>;base64,<payload>`.
    ///
    /// The MIME portion is advisory only — the actual format is sniffed
    /// from the decoded bytes, so a mislabeled data URL still decodes.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidDataUrl`] if the string is not a
    /// base64 data URL or the payload is not valid base64. Decode errors
    /// are as for [`SourceImage::decode`].
    pub fn from_data_url(url: &str) -> Result<Self, TransformError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| TransformError::InvalidDataUrl("missing data: scheme".into()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| TransformError::InvalidDataUrl("missing payload separator".into()))?;
        if !meta.ends_with(";base64") {
            return Err(TransformError::InvalidDataUrl(
                "only base64 data URLs are supported".into(),
            ));
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| TransformError::InvalidDataUrl(format!("invalid base64 payload: {e}")))?;
        Self::decode(&bytes)
    }

    /// Build a source image from an already-decoded raster.
    #[must_use]
    pub fn from_dynamic(decoded: &DynamicImage) -> Self {
        let pixels = decoded.to_rgba8();
        let dimensions = Dimensions::new(pixels.width(), pixels.height());
        Self { pixels, dimensions }
    }

    /// Natural pixel dimensions of the decoded raster.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// The decoded RGBA pixel data.
    #[must_use]
    pub const fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
