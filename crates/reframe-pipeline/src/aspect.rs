//! Aspect-ratio resolution for single-axis edits and percentage scaling.
//!
//! The ratio is captured **once**, from the last unlocked state, and
//! reused for every subsequent locked edit. Recomputing the ratio from
//! already-rounded dimensions on each edit would let rounding error
//! accumulate; capturing it avoids that drift.

use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Which axis a resize edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// The width axis.
    Width,
    /// The height axis.
    Height,
}

/// Resolves target dimensions for resize edits against a captured ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectResolver {
    /// Width divided by height, captured at the last unlocked state.
    ratio: f64,
}

impl AspectResolver {
    /// Capture the width/height ratio of the given dimensions.
    ///
    /// Zero-area dimensions capture a ratio of 1.0 so later locked edits
    /// stay well-defined; such dimensions never reach the encoder anyway.
    #[must_use]
    pub fn capture(dims: Dimensions) -> Self {
        let ratio = if dims.area() == 0 {
            1.0
        } else {
            f64::from(dims.width) / f64::from(dims.height)
        };
        Self { ratio }
    }

    /// The captured width/height ratio.
    #[must_use]
    pub const fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Resolve a single-axis edit.
    ///
    /// - `new_value < 1` is rejected: returns `current` unchanged.
    /// - Unlocked: only the edited axis changes.
    /// - Locked: the other axis is recomputed from the captured ratio
    ///   (`h = round(w / ratio)` for width edits, symmetric for height),
    ///   clamped to at least 1 pixel.
    #[must_use]
    pub fn resolve(&self, current: Dimensions, axis: Axis, new_value: u32, locked: bool) -> Dimensions {
        if new_value < 1 {
            return current;
        }

        if !locked {
            return match axis {
                Axis::Width => Dimensions::new(new_value, current.height),
                Axis::Height => Dimensions::new(current.width, new_value),
            };
        }

        match axis {
            Axis::Width => {
                let height = round_axis(f64::from(new_value) / self.ratio);
                Dimensions::new(new_value, height)
            }
            Axis::Height => {
                let width = round_axis(f64::from(new_value) * self.ratio);
                Dimensions::new(width, new_value)
            }
        }
    }

    /// Percentage-scale shortcut: both axes multiplied by `factor` and
    /// rounded.
    ///
    /// Always derives from the *current* dimensions, so repeated calls
    /// compound: two successive `scale(_, 0.5)` calls quarter the area
    /// rather than resetting to the original source each time.
    /// Non-positive or non-finite factors are rejected (returns
    /// `current` unchanged).
    #[must_use]
    pub fn scale(current: Dimensions, factor: f64) -> Dimensions {
        if !factor.is_finite() || factor <= 0.0 {
            return current;
        }

        Dimensions::new(
            round_axis(f64::from(current.width) * factor),
            round_axis(f64::from(current.height) * factor),
        )
    }
}

/// Round a computed axis length to the nearest pixel, at least 1.
fn round_axis(value: f64) -> u32 {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = value.round().clamp(1.0, f64::from(u32::MAX)) as u32;
    rounded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unlocked_same_value_is_identity() {
        let resolver = AspectResolver::capture(Dimensions::new(640, 480));
        let current = Dimensions::new(640, 480);
        assert_eq!(
            resolver.resolve(current, Axis::Width, 640, false),
            current,
            "unlocked edit to the current value must be a no-op",
        );
    }

    #[test]
    fn unlocked_edit_changes_only_edited_axis() {
        let resolver = AspectResolver::capture(Dimensions::new(640, 480));
        let resolved = resolver.resolve(Dimensions::new(640, 480), Axis::Width, 100, false);
        assert_eq!(resolved, Dimensions::new(100, 480));

        let resolved = resolver.resolve(Dimensions::new(640, 480), Axis::Height, 99, false);
        assert_eq!(resolved, Dimensions::new(640, 99));
    }

    #[test]
    fn locked_width_edit_recomputes_height() {
        let resolver = AspectResolver::capture(Dimensions::new(100, 50));
        let resolved = resolver.resolve(Dimensions::new(100, 50), Axis::Width, 200, true);
        assert_eq!(resolved, Dimensions::new(200, 100));
    }

    #[test]
    fn locked_height_edit_recomputes_width() {
        let resolver = AspectResolver::capture(Dimensions::new(100, 50));
        let resolved = resolver.resolve(Dimensions::new(100, 50), Axis::Height, 25, true);
        assert_eq!(resolved, Dimensions::new(50, 25));
    }

    #[test]
    fn locked_a4_width_edit_rounds_from_captured_ratio() {
        // 595x842 (A4 at 72 dpi): ratio = 595/842, so a locked width
        // edit to 297 gives round(297 * 842 / 595) = round(420.29) = 420.
        let resolver = AspectResolver::capture(Dimensions::new(595, 842));
        let resolved = resolver.resolve(Dimensions::new(595, 842), Axis::Width, 297, true);
        assert_eq!(resolved, Dimensions::new(297, 420));
    }

    #[test]
    fn zero_value_rejected() {
        let resolver = AspectResolver::capture(Dimensions::new(100, 50));
        let current = Dimensions::new(100, 50);
        assert_eq!(resolver.resolve(current, Axis::Width, 0, false), current);
        assert_eq!(resolver.resolve(current, Axis::Width, 0, true), current);
        assert_eq!(resolver.resolve(current, Axis::Height, 0, true), current);
    }

    #[test]
    fn repeated_locked_edits_do_not_drift() {
        // The ratio is captured once; walking the width up and back down
        // must land exactly on the starting dimensions.
        let start = Dimensions::new(595, 842);
        let resolver = AspectResolver::capture(start);
        let mut current = start;
        for width in [300, 450, 123, 595] {
            current = resolver.resolve(current, Axis::Width, width, true);
        }
        assert_eq!(current, start);
    }

    #[test]
    fn locked_edit_clamps_other_axis_to_one() {
        // Extremely wide ratio: a tiny width edit would round height to 0.
        let resolver = AspectResolver::capture(Dimensions::new(1000, 1));
        let resolved = resolver.resolve(Dimensions::new(1000, 1), Axis::Width, 2, true);
        assert_eq!(resolved, Dimensions::new(2, 1));
    }

    #[test]
    fn scale_compounds_from_current() {
        let start = Dimensions::new(400, 300);
        let once = AspectResolver::scale(start, 0.5);
        assert_eq!(once, Dimensions::new(200, 150));
        let twice = AspectResolver::scale(once, 0.5);
        assert_eq!(
            twice,
            Dimensions::new(100, 75),
            "second scale must derive from the already-scaled dimensions",
        );
    }

    #[test]
    fn scale_rejects_non_positive_factors() {
        let current = Dimensions::new(400, 300);
        assert_eq!(AspectResolver::scale(current, 0.0), current);
        assert_eq!(AspectResolver::scale(current, -1.0), current);
        assert_eq!(AspectResolver::scale(current, f64::NAN), current);
        assert_eq!(AspectResolver::scale(current, f64::INFINITY), current);
    }

    #[test]
    fn scale_clamps_to_one_pixel() {
        let resolved = AspectResolver::scale(Dimensions::new(3, 3), 0.01);
        assert_eq!(resolved, Dimensions::new(1, 1));
    }

    #[test]
    fn capture_of_zero_area_defaults_ratio_to_one() {
        let resolver = AspectResolver::capture(Dimensions::new(0, 0));
        assert!((resolver.ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn resolver_serde_round_trip() {
        let resolver = AspectResolver::capture(Dimensions::new(595, 842));
        let json = serde_json::to_string(&resolver).unwrap();
        let deserialized: AspectResolver = serde_json::from_str(&json).unwrap();
        assert_eq!(resolver, deserialized);
    }
}
