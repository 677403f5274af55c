//! The [`Track`] capability trait, shared track configuration, and the
//! per-variant data payloads.
//!
//! A track is one renderable row of a frame. Every variant implements the
//! same three-part contract: report a size hint, fetch its data for a
//! genomic window (bounded by the window, never whole-genome), and draw the
//! fetched data into the panel the renderer allocates for it. Decorators
//! (see [`crate::compose::Decorator`]) only mutate a track's
//! [`TrackProperties`]; they never become rows themselves.

use serde::{Deserialize, Serialize};

use crate::{
    error::TrackPlotError,
    interval::GenomicInterval,
    render::Panel,
    sources::{AnchorPair, Feature, MatrixBlock, SignalSample},
    Position,
};

pub mod annotation;
pub mod arcs;
pub mod axis;
pub mod matrix;
pub mod signal;
pub mod spacer;

pub use annotation::AnnotationTrack;
pub use arcs::ArcTrack;
pub use axis::XAxisTrack;
pub use matrix::{MatrixTrack, ProfileTrack};
pub use signal::{CoverageTrack, SignalTrack};
pub use spacer::SpacerTrack;

/// Default row height in layout units.
pub const DEFAULT_HEIGHT: f64 = 3.0;
/// Default track color.
pub const DEFAULT_COLOR: &str = "#808080";

/// The y-axis scaling policy of a value-bearing track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValueRange {
    /// Scale to the min/max of the values fetched for the current window.
    Auto,
    /// Fixed bounds, identical for every window.
    Fixed { min: f64, max: f64 },
}

impl ValueRange {
    /// Resolve against the observed window extrema. A degenerate span is
    /// widened so that flat data still renders mid-panel.
    pub fn resolve(&self, observed_min: f64, observed_max: f64) -> (f64, f64) {
        let (min, max) = match *self {
            ValueRange::Auto => (observed_min.min(0.0), observed_max),
            ValueRange::Fixed { min, max } => (min, max),
        };
        if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        ValueRange::Auto
    }
}

/// Configuration shared by every track variant. Variant-specific options
/// live on the variant structs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackProperties {
    /// Identifies the track in error messages and the output artifact.
    pub name: String,
    /// Label drawn in the right margin; empty for none.
    pub title: String,
    /// Row height in layout units.
    pub height: f64,
    pub color: String,
    /// Flip the value axis (arcs open downward, signal hangs from the top).
    pub inverted: bool,
    pub value_range: ValueRange,
}

impl TrackProperties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            height: DEFAULT_HEIGHT,
            color: DEFAULT_COLOR.to_string(),
            inverted: false,
            value_range: ValueRange::Auto,
        }
    }

    /// Check option values; fatal at frame-build time.
    pub fn validate(&self) -> Result<(), TrackPlotError> {
        if !(self.height > 0.0) {
            return Err(TrackPlotError::InvalidTrackOption {
                track: self.name.clone(),
                reason: format!("height must be positive, got {}", self.height),
            });
        }
        if let ValueRange::Fixed { min, max } = self.value_range {
            if !(max > min) {
                return Err(TrackPlotError::InvalidTrackOption {
                    track: self.name.clone(),
                    reason: format!("value range ({min}, {max}) must have min < max"),
                });
            }
        }
        Ok(())
    }
}

/// The per-render payload a track's `fetch` produces and its `draw`
/// consumes. Owned by the renderer for the duration of one render cycle;
/// variants that want to memoize by interval key may do so internally.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackData {
    Signal(Vec<SignalSample>),
    Features(Vec<Feature>),
    Arcs(Vec<AnchorPair>),
    Matrix(MatrixBlock),
    /// Binned profile values (virtual-4C), aligned to matrix bins.
    Profile {
        bin_start: usize,
        resolution: Position,
        values: Vec<f64>,
    },
    /// Position-only tracks (axis, spacer).
    Empty,
}

/// Preferred layout size of a track row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeHint {
    /// Height in layout units.
    pub height: f64,
}

/// The polymorphic track contract: one row/panel bound to a data source.
pub trait Track {
    fn properties(&self) -> &TrackProperties;

    fn properties_mut(&mut self) -> &mut TrackProperties;

    fn name(&self) -> &str {
        &self.properties().name
    }

    /// How tall this row wants to be; overridable through the
    /// `TrackHeight` decorator, which rewrites the property this reads.
    fn size_hint(&self) -> SizeHint {
        SizeHint {
            height: self.properties().height,
        }
    }

    /// Validate configuration; called once at frame build.
    fn validate(&self) -> Result<(), TrackPlotError> {
        self.properties().validate()
    }

    /// Fetch the data overlapping `interval` from the track's adapter.
    ///
    /// A [`TrackPlotError::DataUnavailable`] return is recoverable: the
    /// renderer substitutes a placeholder panel. Any other error aborts
    /// the frame render.
    fn fetch(&self, interval: &GenomicInterval) -> Result<TrackData, TrackPlotError>;

    /// Draw `data` (produced by `fetch` for the same `interval`) into the
    /// allocated panel.
    fn draw(
        &self,
        interval: &GenomicInterval,
        data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError>;
}

/// The recoverable error a track raises when its adapter has nothing for
/// the window's chromosome.
pub(crate) fn data_unavailable(name: &str, interval: &GenomicInterval) -> TrackPlotError {
    TrackPlotError::DataUnavailable {
        track: name.to_string(),
        interval: interval.to_string(),
    }
}
