//! Shared types for the reframe transform pipeline.

use serde::{Deserialize, Serialize};

use crate::encode::OutputFormat;
use crate::filter::FilterSpec;
use crate::raster::ResampleFilter;

/// Re-export `RgbaImage` so downstream crates can reference decoded
/// raster data without depending on `image` directly.
pub use image::RgbaImage;

/// Image dimensions in pixels.
///
/// Both axes are expected to be at least 1 for any surface that reaches
/// the rasterizer; [`crate::aspect::AspectResolver`] rejects edits that
/// would produce a zero axis, and [`crate::encode::encode`] refuses
/// zero-area surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions from a width/height pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count, useful for zero-area checks.
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Configuration for a single transform invocation.
///
/// This is the recognized option surface of the (excluded) UI layer:
/// target dimensions, aspect lock, filter, resampling quality, and
/// output format. Absent target axes leave the source's natural
/// dimensions untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Requested output width in pixels. `None` keeps the current width.
    pub target_width: Option<u32>,

    /// Requested output height in pixels. `None` keeps the current height.
    pub target_height: Option<u32>,

    /// Whether editing one axis proportionally recomputes the other to
    /// preserve the source's natural width/height ratio.
    pub aspect_locked: bool,

    /// Filter applied during the draw. Exactly one is active at a time.
    pub filter: FilterSpec,

    /// Resampling filter used when the output dimensions differ from
    /// the source's.
    pub resample: ResampleFilter,

    /// Output encoding: lossless PNG or lossy JPEG with quality factor.
    pub format: OutputFormat,
}

impl TransformConfig {
    /// Default aspect-lock state: locked, matching the resize tool's
    /// initial checkbox.
    pub const DEFAULT_ASPECT_LOCKED: bool = true;
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            target_width: None,
            target_height: None,
            aspect_locked: Self::DEFAULT_ASPECT_LOCKED,
            filter: FilterSpec::default(),
            resample: ResampleFilter::default(),
            format: OutputFormat::default(),
        }
    }
}

/// Result of running the one-shot transform pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    /// The encoded output artifact, ready for download.
    pub artifact: crate::encode::OutputArtifact,

    /// Dimensions of the output surface (after aspect resolution).
    pub output: Dimensions,

    /// Natural dimensions of the decoded source image.
    pub natural: Dimensions,
}

/// Errors that can occur during transform processing.
///
/// All errors are terminal for the current invocation: nothing is
/// retried, and no partial artifact is ever produced. Out-of-range
/// dimension edits are not errors at all — they no-op at the resolver.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The input was not a well-formed base64 data URL.
    #[error("malformed data URL: {0}")]
    InvalidDataUrl(String),

    /// An export was requested with no decoded source image.
    #[error("no decoded source image")]
    NoSource,

    /// Encoding was requested for a zero-area surface.
    #[error("cannot encode a zero-area surface ({width}x{height})")]
    ZeroArea {
        /// Surface width at encode time.
        width: u32,
        /// Surface height at encode time.
        height: u32,
    },
}
