//! Named compositing filters applied wholesale during the draw.
//!
//! Each [`FilterSpec`] variant is the pixel-level equivalent of one of
//! the CSS filter expressions the original canvas tools expose
//! (`grayscale(100%)`, `sepia(100%)`, `blur(5px)`, ...). Exactly one
//! filter is active at a time — selecting a new one replaces, never
//! stacks with, the previous selection. Unknown identifiers fall back
//! to the identity filter rather than failing.

use std::fmt;
use std::str::FromStr;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::RgbaImage;

/// Gaussian sigma used by [`FilterSpec::Blur`], the equivalent of a
/// 5px CSS blur radius.
pub const BLUR_SIGMA: f32 = 2.5;

/// Contrast adjustment (percent) used by [`FilterSpec::Contrast`].
pub const CONTRAST_PERCENT: f32 = 40.0;

/// Per-channel offset used by [`FilterSpec::Brightness`].
pub const BRIGHTNESS_OFFSET: i32 = 40;

/// A named whole-raster filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSpec {
    /// Identity: pixel output is byte-identical to the unfiltered draw.
    #[default]
    None,
    /// Luminance-weighted grayscale conversion.
    Grayscale,
    /// Standard sepia tone matrix.
    Sepia,
    /// Gaussian blur with [`BLUR_SIGMA`].
    Blur,
    /// Contrast boost by [`CONTRAST_PERCENT`].
    Contrast,
    /// Brightness lift by [`BRIGHTNESS_OFFSET`].
    Brightness,
}

impl FilterSpec {
    /// All filters in UI order.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Grayscale,
        Self::Sepia,
        Self::Blur,
        Self::Contrast,
        Self::Brightness,
    ];

    /// Parse a filter identifier, falling back to the identity filter
    /// for anything unrecognized.
    #[must_use]
    pub fn parse(identifier: &str) -> Self {
        Self::from_str(identifier).unwrap_or_default()
    }

    /// The lowercase identifier used in configuration.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Blur => "blur",
            Self::Contrast => "contrast",
            Self::Brightness => "brightness",
        }
    }

    /// Apply the filter to a raster, producing a new raster of the same
    /// dimensions. [`FilterSpec::None`] returns a pixel-exact copy.
    #[must_use = "returns the filtered image"]
    pub fn apply(self, image: &RgbaImage) -> RgbaImage {
        match self {
            Self::None => image.clone(),
            Self::Grayscale => weighted_map(image, GRAYSCALE_MATRIX),
            Self::Sepia => weighted_map(image, SEPIA_MATRIX),
            Self::Blur => gaussian_blur_rgba(image, BLUR_SIGMA),
            Self::Contrast => image::imageops::contrast(image, CONTRAST_PERCENT),
            Self::Brightness => image::imageops::brighten(image, BRIGHTNESS_OFFSET),
        }
    }
}

impl FromStr for FilterSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "grayscale" => Ok(Self::Grayscale),
            "sepia" => Ok(Self::Sepia),
            "blur" => Ok(Self::Blur),
            "contrast" => Ok(Self::Contrast),
            "brightness" => Ok(Self::Brightness),
            other => Err(format!("unknown filter identifier: {other}")),
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Per-output-channel RGB weights. Rows are (r', g', b').
type ColorMatrix = [[f32; 3]; 3];

/// Rec. 709 luminance weights replicated across all three channels,
/// the pixel equivalent of CSS `grayscale(100%)`.
const GRAYSCALE_MATRIX: ColorMatrix = [
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
];

/// The standard sepia tone matrix of CSS `sepia(100%)`.
const SEPIA_MATRIX: ColorMatrix = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Apply a 3x3 color matrix to the RGB channels, preserving alpha.
fn weighted_map(image: &RgbaImage, matrix: ColorMatrix) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
        let channel = |row: [f32; 3]| {
            #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = row[2]
                .mul_add(b, row[0].mul_add(r, row[1] * g))
                .round()
                .clamp(0.0, 255.0) as u8;
            value
        };
        image::Rgba([channel(matrix[0]), channel(matrix[1]), channel(matrix[2]), a])
    })
}

/// Gaussian blur for an RGBA image.
///
/// `imageproc::filter::gaussian_blur_f32` only accepts `GrayImage`, so
/// the image is split into four single-channel planes, each blurred
/// independently, and reassembled. Gaussian blur is linear and
/// per-channel, so this is equivalent to blurring in color space.
/// Non-positive sigma returns the image unchanged (the underlying
/// function panics on `sigma <= 0.0`).
fn gaussian_blur_rgba(image: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma <= 0.0 {
        return image.clone();
    }

    let (w, h) = (image.width(), image.height());

    let channels: [GrayImage; 4] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });

    let blurred: [GrayImage; 4] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], sigma));

    RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
            blurred[3].get_pixel(x, y).0[0],
        ])
    })
}
