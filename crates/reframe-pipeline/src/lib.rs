//! reframe-pipeline: Pure raster image transform pipeline (sans-IO).
//!
//! Turns an uploaded image into a downloadable artifact through:
//! decode -> aspect-ratio resolution -> rasterize (filter applied
//! during the draw) -> re-encode.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. All browser interaction
//! (Blob construction, object-URL lifecycle, download triggering)
//! lives in `reframe-io`.

pub mod aspect;
pub mod encode;
pub mod filter;
pub mod raster;
pub mod session;
pub mod source;
pub mod types;

pub use aspect::{AspectResolver, Axis};
pub use encode::{DEFAULT_JPEG_QUALITY, OutputArtifact, OutputFormat, download_filename};
pub use filter::FilterSpec;
pub use raster::ResampleFilter;
pub use session::{Commit, DecodeTicket, Phase, Session};
pub use source::SourceImage;
pub use types::{Dimensions, ProcessResult, TransformConfig, TransformError};

/// Run the full transform pipeline in one call.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// then produces a [`ProcessResult`] containing the encoded artifact
/// and both the output and natural dimensions.
///
/// # Pipeline steps
///
/// 1. Decode the source image
/// 2. Resolve target dimensions (width edit, then height edit, each
///    honoring the aspect lock against the natural ratio — with both
///    axes set and the lock engaged, the height edit wins, matching
///    one-axis-at-a-time UI semantics)
/// 3. Rasterize into a fresh surface at the resolved dimensions,
///    applying the configured filter during the draw
/// 4. Encode to the requested output format
///
/// Out-of-range target axes (`0`) no-op at the resolver rather than
/// failing; the output falls back to the natural dimensions.
///
/// # Errors
///
/// Returns [`TransformError::EmptyInput`] if `image_bytes` is empty,
/// [`TransformError::Decode`] if the image format is unrecognized, and
/// [`TransformError::ZeroArea`] if the resolved surface has no pixels.
pub fn process(
    image_bytes: &[u8],
    config: &TransformConfig,
) -> Result<ProcessResult, TransformError> {
    // 1. Decode.
    let source = SourceImage::decode(image_bytes)?;
    let natural = source.dimensions();

    // 2. Resolve target dimensions against the natural ratio.
    let resolver = AspectResolver::capture(natural);
    let mut output = natural;
    if let Some(width) = config.target_width {
        output = resolver.resolve(output, Axis::Width, width, config.aspect_locked);
    }
    if let Some(height) = config.target_height {
        output = resolver.resolve(output, Axis::Height, height, config.aspect_locked);
    }

    // 3. Rasterize (filter applied during the draw).
    let surface = raster::rasterize(&source, output, config.filter, config.resample);

    // 4. Re-encode.
    let artifact = encode::encode(&surface, config.format)?;
    Ok(ProcessResult {
        artifact,
        output,
        natural,
    })
}
