//! Serializing the output surface into a downloadable artifact.
//!
//! PNG is lossless; JPEG takes a quality factor in `[0, 1]` (default
//! 0.9) mapped onto the encoder's 1..=100 scale. A zero-area surface
//! produces no artifact at all — encode reads the surface's current
//! pixel dimensions, so the rasterizer must have sized it already.

use image::ImageEncoder;
use serde::{Deserialize, Serialize};

use crate::types::{RgbaImage, TransformError};

/// Default JPEG quality factor when the caller does not specify one.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.9;

/// Output encoding for the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG (RGBA preserved).
    Png,
    /// Lossy JPEG; alpha is dropped at encode time.
    Jpeg {
        /// Quality factor in `[0, 1]`; values outside the range are
        /// clamped at encode time.
        quality: f32,
    },
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl OutputFormat {
    /// JPEG at the default quality factor.
    #[must_use]
    pub const fn jpeg() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// The download filename extension: `png` or `jpg`.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    /// The artifact MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    /// Map the `[0, 1]` quality factor onto the JPEG encoder's
    /// 1..=100 scale. PNG has no quality knob and returns `None`.
    #[must_use]
    pub fn encoder_quality(self) -> Option<u8> {
        match self {
            Self::Png => None,
            Self::Jpeg { quality } => {
                #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let scaled = (quality.clamp(0.0, 1.0) * 100.0).round() as u8;
                Some(scaled.max(1))
            }
        }
    }
}

/// An encoded output artifact: bytes plus the format they were encoded
/// in. Created on demand at download time and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputArtifact {
    /// The encoded image bytes.
    pub bytes: Vec<u8>,
    /// The format the bytes were encoded in.
    pub format: OutputFormat,
}

impl OutputArtifact {
    /// The artifact MIME type (`image/png` or `image/jpeg`).
    #[must_use]
    pub const fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// Serialize the surface into an [`OutputArtifact`] of the requested
/// format.
///
/// # Errors
///
/// Returns [`TransformError::ZeroArea`] if the surface has zero-area
/// dimensions (no partial artifact is produced). Returns
/// [`TransformError::Decode`] if the underlying encoder fails.
pub fn encode(surface: &RgbaImage, format: OutputFormat) -> Result<OutputArtifact, TransformError> {
    let (width, height) = surface.dimensions();
    if width == 0 || height == 0 {
        return Err(TransformError::ZeroArea { width, height });
    }

    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
            encoder.write_image(
                surface.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgba8,
            )?;
        }
        OutputFormat::Jpeg { .. } => {
            // JPEG has no alpha channel; drop it before encoding.
            let rgb = image::DynamicImage::ImageRgba8(surface.clone()).into_rgb8();
            let quality = format.encoder_quality().unwrap_or(100);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality);
            encoder.write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)?;
        }
    }

    Ok(OutputArtifact { bytes, format })
}

/// Generated filename for a downloaded artifact:
/// `edited-image-<timestamp>.<ext>`.
///
/// The timestamp is milliseconds since the Unix epoch, supplied by the
/// caller (the browser clock in the io crate, the system clock in the
/// CLI) so this stays a pure function.
#[must_use]
pub fn download_filename(unix_ms: u64, format: OutputFormat) -> String {
    format!("edited-image-{unix_ms}.{}", format.extension())
}
