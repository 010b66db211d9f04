//! reframe: run the image transform pipeline against files on disk.
//!
//! Decodes an image, applies resize edits (with or without the aspect
//! lock), an optional filter, and re-encodes to PNG or JPEG — the same
//! pipeline the browser tools drive, minus the browser.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin reframe -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use reframe_pipeline::{
    Commit, DEFAULT_JPEG_QUALITY, FilterSpec, OutputArtifact, OutputFormat, ResampleFilter,
    Session, SourceImage, download_filename,
};

/// Resize, filter, and re-encode an image from the command line.
#[derive(Parser)]
#[command(name = "reframe", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Target width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Disable the aspect lock (axis edits no longer recompute the
    /// other axis).
    #[arg(long)]
    no_lock: bool,

    /// Scale both axes by a factor, applied after any width/height
    /// edits and compounding with them.
    #[arg(long)]
    scale: Option<f64>,

    /// Filter applied during the draw.
    #[arg(long, value_enum, default_value_t = Filter::None)]
    filter: Filter,

    /// Resampling filter used when scaling.
    #[arg(long, value_enum, default_value_t = Resample::CatmullRom)]
    resample: Resample,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// JPEG quality factor in [0, 1]. Ignored for PNG.
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: f32,

    /// Output path. Defaults to `edited-image-<timestamp>.<ext>` in the
    /// current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Full transform config as a JSON string.
    ///
    /// When provided, the pipeline runs through the one-shot `process`
    /// entry point and all other transform flags are ignored. The JSON
    /// must be a valid `TransformConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    /// Identity (no filter).
    None,
    /// Luminance-weighted grayscale.
    Grayscale,
    /// Sepia tone.
    Sepia,
    /// Gaussian blur.
    Blur,
    /// Contrast boost.
    Contrast,
    /// Brightness lift.
    Brightness,
}

impl From<Filter> for FilterSpec {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::None => Self::None,
            Filter::Grayscale => Self::Grayscale,
            Filter::Sepia => Self::Sepia,
            Filter::Blur => Self::Blur,
            Filter::Contrast => Self::Contrast,
            Filter::Brightness => Self::Brightness,
        }
    }
}

/// Resampling filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Resample {
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, decent quality).
    Triangle,
    /// Bicubic Catmull-Rom (moderate, good quality).
    CatmullRom,
    /// Gaussian (moderate, smooth).
    Gaussian,
    /// Lanczos with 3 lobes (slowest, sharpest).
    Lanczos3,
}

impl From<Resample> for ResampleFilter {
    fn from(resample: Resample) -> Self {
        match resample {
            Resample::Nearest => Self::Nearest,
            Resample::Triangle => Self::Triangle,
            Resample::CatmullRom => Self::CatmullRom,
            Resample::Gaussian => Self::Gaussian,
            Resample::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Output format selection.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Lossless PNG.
    Png,
    /// Lossy JPEG (see --quality).
    Jpg,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let artifact = match run(&cli, &image_bytes) {
        Ok(artifact) => artifact,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let out_path = cli.out.clone().unwrap_or_else(|| {
        PathBuf::from(download_filename(unix_ms(), artifact.format))
    });

    match std::fs::write(&out_path, &artifact.bytes) {
        Ok(()) => {
            println!(
                "{} ({} bytes, {})",
                out_path.display(),
                artifact.bytes.len(),
                artifact.mime(),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", out_path.display());
            ExitCode::FAILURE
        }
    }
}

/// Run the transform, either via `--config-json` and the one-shot
/// pipeline or via an edit session driven by the individual flags.
fn run(cli: &Cli, image_bytes: &[u8]) -> Result<OutputArtifact, String> {
    if let Some(ref json) = cli.config_json {
        let config = serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --config-json: {e}"))?;
        let result = reframe_pipeline::process(image_bytes, &config)
            .map_err(|e| format!("Pipeline error: {e}"))?;
        eprintln!(
            "{}x{} -> {}x{}",
            result.natural.width, result.natural.height, result.output.width, result.output.height,
        );
        return Ok(result.artifact);
    }

    let source = SourceImage::decode(image_bytes).map_err(|e| format!("Pipeline error: {e}"))?;
    let natural = source.dimensions();

    let mut session = Session::new();
    let ticket = session.begin_decode();
    let _commit = session.commit_decode(ticket, Ok(source));
    debug_assert_eq!(_commit, Commit::Applied);

    session.set_locked(!cli.no_lock);
    session.set_resample(cli.resample.into());
    if let Some(width) = cli.width {
        session.set_width(width);
    }
    if let Some(height) = cli.height {
        session.set_height(height);
    }
    if let Some(factor) = cli.scale {
        session.scale(factor);
    }
    session.set_filter(cli.filter.into());

    let format = match cli.format {
        Format::Png => OutputFormat::Png,
        Format::Jpg => OutputFormat::Jpeg {
            quality: cli.quality,
        },
    };

    let artifact = session
        .export(format)
        .map_err(|e| format!("Pipeline error: {e}"))?;

    if let Some(output) = session.dimensions() {
        eprintln!(
            "{}x{} -> {}x{}",
            natural.width, natural.height, output.width, output.height,
        );
    }
    Ok(artifact)
}

/// Milliseconds since the Unix epoch from the system clock.
fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
