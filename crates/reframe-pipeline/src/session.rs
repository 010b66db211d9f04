//! Edit session: the tool's state machine with a generation guard.
//!
//! A [`Session`] walks `Idle -> Decoding -> Ready -> (edit)*` and back.
//! Decode is the only asynchronous step, so it is split into
//! [`begin_decode`](Session::begin_decode) (called before handing the
//! bytes to the decoder) and [`commit_decode`](Session::commit_decode)
//! (called when the decode completes). Each `begin_decode` bumps a
//! generation counter and the returned [`DecodeTicket`] carries it; a
//! commit whose ticket has been superseded is ignored, so a late decode
//! can never overwrite newer state.
//!
//! Edits that arrive outside `Ready` (while a decode is in flight, or
//! with no image at all) are dropped, not queued. Encoding is
//! synchronous and never observable as a distinct state: `export`
//! borrows the session and leaves it in `Ready`.

use crate::aspect::{AspectResolver, Axis};
use crate::encode::{self, OutputArtifact, OutputFormat};
use crate::filter::FilterSpec;
use crate::raster::{self, ResampleFilter};
use crate::source::SourceImage;
use crate::types::{Dimensions, TransformConfig, TransformError};

/// Proof that a decode was started; carries the generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket {
    generation: u64,
}

/// Outcome of committing a decode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The result was current and has been applied.
    Applied,
    /// The ticket was superseded by a newer upload or reset; the
    /// session state is untouched.
    Stale,
}

/// Observable session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No source image; nothing to edit or export.
    Idle,
    /// A decode is in flight; edits are dropped until it commits.
    Decoding,
    /// A source is decoded; edits and exports are accepted.
    Ready,
}

/// Edit state held while a decoded source is live.
#[derive(Debug, Clone)]
struct Edit {
    source: SourceImage,
    target: Dimensions,
    resolver: AspectResolver,
    locked: bool,
    filter: FilterSpec,
    resample: ResampleFilter,
}

/// A single tool session: one image pipeline instance.
///
/// Exactly one session is active per tool; a new source upload fully
/// supersedes any in-flight one.
#[derive(Debug, Clone)]
pub struct Session {
    state: State,
    generation: u64,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Decoding,
    Ready(Box<Edit>),
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an idle session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            generation: 0,
        }
    }

    /// The current observable phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Decoding => Phase::Decoding,
            State::Ready(_) => Phase::Ready,
        }
    }

    /// Start decoding a new source image.
    ///
    /// Supersedes any previous upload — in-flight or committed — by
    /// bumping the generation; earlier tickets become stale.
    pub fn begin_decode(&mut self) -> DecodeTicket {
        self.generation += 1;
        self.state = State::Decoding;
        DecodeTicket {
            generation: self.generation,
        }
    }

    /// Commit the result of a decode started with `ticket`.
    ///
    /// Returns [`Commit::Stale`] (state untouched) if the ticket has
    /// been superseded. Otherwise a successful decode moves the session
    /// to `Ready` with the target set to the natural dimensions, the
    /// ratio captured, and no filter active; a failed decode returns
    /// the session to `Idle` (the caller surfaces the error it already
    /// holds).
    pub fn commit_decode(
        &mut self,
        ticket: DecodeTicket,
        result: Result<SourceImage, TransformError>,
    ) -> Commit {
        if ticket.generation != self.generation {
            return Commit::Stale;
        }

        self.state = match result {
            Ok(source) => {
                let natural = source.dimensions();
                State::Ready(Box::new(Edit {
                    source,
                    target: natural,
                    resolver: AspectResolver::capture(natural),
                    locked: TransformConfig::DEFAULT_ASPECT_LOCKED,
                    filter: FilterSpec::None,
                    resample: ResampleFilter::default(),
                }))
            }
            Err(_) => State::Idle,
        };
        Commit::Applied
    }

    /// Discard the session's source and return to `Idle`.
    ///
    /// Also bumps the generation, so any decode still in flight commits
    /// as stale instead of resurrecting discarded state.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = State::Idle;
    }

    /// Current target dimensions, if a source is decoded.
    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.edit().map(|e| e.target)
    }

    /// Natural dimensions of the decoded source, if any.
    #[must_use]
    pub fn natural_dimensions(&self) -> Option<Dimensions> {
        self.edit().map(|e| e.source.dimensions())
    }

    /// The active filter, if a source is decoded.
    #[must_use]
    pub fn filter(&self) -> Option<FilterSpec> {
        self.edit().map(|e| e.filter)
    }

    /// Whether the aspect lock is engaged, if a source is decoded.
    #[must_use]
    pub fn aspect_locked(&self) -> Option<bool> {
        self.edit().map(|e| e.locked)
    }

    /// Edit the target width. Returns `true` if the edit was applied.
    ///
    /// Dropped (returns `false`) outside `Ready`; values below 1 no-op
    /// at the resolver and still count as applied.
    pub fn set_width(&mut self, width: u32) -> bool {
        self.edit_axis(Axis::Width, width)
    }

    /// Edit the target height. Same semantics as [`set_width`](Self::set_width).
    pub fn set_height(&mut self, height: u32) -> bool {
        self.edit_axis(Axis::Height, height)
    }

    /// Scale both axes by `factor`, compounding from the current target.
    pub fn scale(&mut self, factor: f64) -> bool {
        match self.edit_mut() {
            Some(edit) => {
                edit.target = AspectResolver::scale(edit.target, factor);
                true
            }
            None => false,
        }
    }

    /// Engage or release the aspect lock.
    ///
    /// Locking re-captures the ratio from the current target, so the
    /// lock preserves whatever shape the unlocked edits produced.
    pub fn set_locked(&mut self, locked: bool) -> bool {
        match self.edit_mut() {
            Some(edit) => {
                if locked && !edit.locked {
                    edit.resolver = AspectResolver::capture(edit.target);
                }
                edit.locked = locked;
                true
            }
            None => false,
        }
    }

    /// Select a filter, replacing (never stacking with) the previous one.
    pub fn set_filter(&mut self, filter: FilterSpec) -> bool {
        match self.edit_mut() {
            Some(edit) => {
                edit.filter = filter;
                true
            }
            None => false,
        }
    }

    /// Select the resampling filter used for the draw.
    pub fn set_resample(&mut self, resample: ResampleFilter) -> bool {
        match self.edit_mut() {
            Some(edit) => {
                edit.resample = resample;
                true
            }
            None => false,
        }
    }

    /// Rasterize and encode the current state into a download artifact.
    ///
    /// Encoding is synchronous and leaves the session in `Ready`; the
    /// artifact is created fresh on every call, never cached.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NoSource`] outside `Ready`, or the
    /// encoder's error (e.g. [`TransformError::ZeroArea`]).
    pub fn export(&self, format: OutputFormat) -> Result<OutputArtifact, TransformError> {
        let edit = self.edit().ok_or(TransformError::NoSource)?;
        let surface = raster::rasterize(&edit.source, edit.target, edit.filter, edit.resample);
        encode::encode(&surface, format)
    }

    fn edit(&self) -> Option<&Edit> {
        match &self.state {
            State::Ready(edit) => Some(edit),
            _ => None,
        }
    }

    fn edit_mut(&mut self) -> Option<&mut Edit> {
        match &mut self.state {
            State::Ready(edit) => Some(edit),
            _ => None,
        }
    }

    fn edit_axis(&mut self, axis: Axis, value: u32) -> bool {
        match self.edit_mut() {
            Some(edit) => {
                edit.target = edit.resolver.resolve(edit.target, axis, value, edit.locked);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decoded(w: u32, h: u32) -> SourceImage {
        let img = image::DynamicImage::ImageRgba8(crate::types::RgbaImage::from_pixel(
            w,
            h,
            image::Rgba([120, 90, 60, 255]),
        ));
        SourceImage::from_dynamic(&img)
    }

    fn ready_session(w: u32, h: u32) -> Session {
        let mut session = Session::new();
        let ticket = session.begin_decode();
        assert_eq!(
            session.commit_decode(ticket, Ok(decoded(w, h))),
            Commit::Applied,
        );
        session
    }

    #[test]
    fn starts_idle() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.dimensions(), None);
    }

    #[test]
    fn decode_walks_idle_decoding_ready() {
        let mut session = Session::new();
        let ticket = session.begin_decode();
        assert_eq!(session.phase(), Phase::Decoding);
        session.commit_decode(ticket, Ok(decoded(100, 50)));
        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.dimensions(), Some(Dimensions::new(100, 50)));
        assert_eq!(session.filter(), Some(FilterSpec::None));
        assert_eq!(session.aspect_locked(), Some(true));
    }

    #[test]
    fn failed_decode_returns_to_idle() {
        let mut session = Session::new();
        let ticket = session.begin_decode();
        let outcome = session.commit_decode(ticket, Err(TransformError::EmptyInput));
        assert_eq!(outcome, Commit::Applied);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn superseded_decode_commits_as_stale() {
        let mut session = Session::new();
        let first = session.begin_decode();
        let second = session.begin_decode();

        // The late first decode must not overwrite the newer upload.
        assert_eq!(
            session.commit_decode(first, Ok(decoded(10, 10))),
            Commit::Stale,
        );
        assert_eq!(session.phase(), Phase::Decoding);

        assert_eq!(
            session.commit_decode(second, Ok(decoded(20, 20))),
            Commit::Applied,
        );
        assert_eq!(session.dimensions(), Some(Dimensions::new(20, 20)));
    }

    #[test]
    fn reset_makes_in_flight_decode_stale() {
        let mut session = Session::new();
        let ticket = session.begin_decode();
        session.reset();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.commit_decode(ticket, Ok(decoded(10, 10))), Commit::Stale);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn edits_outside_ready_are_dropped() {
        let mut session = Session::new();
        assert!(!session.set_width(100));
        assert!(!session.set_filter(FilterSpec::Sepia));

        let _ticket = session.begin_decode();
        assert!(!session.set_width(100));
        assert!(!session.scale(0.5));
        assert_eq!(session.phase(), Phase::Decoding);
    }

    #[test]
    fn locked_width_edit_recomputes_height() {
        let mut session = ready_session(100, 50);
        assert!(session.set_width(200));
        assert_eq!(session.dimensions(), Some(Dimensions::new(200, 100)));
    }

    #[test]
    fn zero_axis_edit_noops_but_counts_as_handled() {
        let mut session = ready_session(100, 50);
        assert!(session.set_width(0));
        assert_eq!(session.dimensions(), Some(Dimensions::new(100, 50)));
    }

    #[test]
    fn unlock_edit_relock_captures_new_ratio() {
        let mut session = ready_session(100, 100);
        session.set_locked(false);
        session.set_width(200); // now 200x100
        session.set_locked(true); // ratio becomes 2.0
        session.set_height(50);
        assert_eq!(session.dimensions(), Some(Dimensions::new(100, 50)));
    }

    #[test]
    fn filters_replace_rather_than_stack() {
        let mut session = ready_session(10, 10);
        session.set_filter(FilterSpec::Sepia);
        session.set_filter(FilterSpec::Blur);
        assert_eq!(session.filter(), Some(FilterSpec::Blur));

        // The export must equal a single-filter draw, not sepia-then-blur.
        let artifact = session.export(OutputFormat::Png).unwrap();
        let mut reference = ready_session(10, 10);
        reference.set_filter(FilterSpec::Blur);
        let expected = reference.export(OutputFormat::Png).unwrap();
        assert_eq!(artifact.bytes, expected.bytes);
    }

    #[test]
    fn scale_compounds_across_calls() {
        let mut session = ready_session(400, 300);
        assert!(session.scale(0.5));
        assert!(session.scale(0.5));
        assert_eq!(session.dimensions(), Some(Dimensions::new(100, 75)));
    }

    #[test]
    fn export_without_source_is_an_error() {
        let session = Session::new();
        assert!(matches!(
            session.export(OutputFormat::Png),
            Err(TransformError::NoSource),
        ));
    }

    #[test]
    fn export_leaves_session_ready_and_repeatable() {
        let mut session = ready_session(60, 40);
        session.set_width(30);
        let first = session.export(OutputFormat::jpeg()).unwrap();
        assert_eq!(session.phase(), Phase::Ready);
        let second = session.export(OutputFormat::jpeg()).unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.mime(), "image/jpeg");
    }

    #[test]
    fn new_upload_supersedes_committed_state() {
        let mut session = ready_session(100, 50);
        session.set_filter(FilterSpec::Sepia);

        let ticket = session.begin_decode();
        assert_eq!(session.phase(), Phase::Decoding);
        session.commit_decode(ticket, Ok(decoded(33, 44)));

        // Fresh source, fresh edit state: filter back to identity.
        assert_eq!(session.dimensions(), Some(Dimensions::new(33, 44)));
        assert_eq!(session.filter(), Some(FilterSpec::None));
    }
}
