//! The [`TrackPlotError`] `enum` definition and error messages.
//!
use crate::Position;
use genomap::GenomeMapError;
use std::num::ParseIntError;
use thiserror::Error;

/// The [`TrackPlotError`] defines the standard set of errors that should
/// be passed to the user.
///
/// The taxonomy matters for recovery: configuration and composition errors
/// are fatal and abort frame construction or rendering; data-unavailable
/// errors are recovered per track by rendering a placeholder panel.
#[derive(Debug, Error)]
pub enum TrackPlotError {
    // IO related errors
    #[error("File writing error: {0}")]
    IOError(#[from] std::io::Error),

    // Locus / interval errors
    #[error("Could not parse locus string '{0}': expected 'chrom' or 'chrom:start-end'")]
    InvalidLocusString(String),
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("Interval invalid: start ({0}) must be less than or equal to end ({1})")]
    InvalidInterval(Position, Position),
    #[error("Interval [{0}, {1}] clamped to zero width on sequence of length {2}")]
    EmptyIntervalAfterClamp(Position, Position, Position),
    #[error("Chromosome '{0}' is not in the genome's chromosome-size table")]
    UnknownChromosome(String),
    #[error("Error encountered in genomap::GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),

    // Composition errors
    #[error("Decorator {0} has no preceding track to apply to")]
    DecoratorWithoutTarget(String),
    #[error("Frame has no tracks")]
    EmptyFrame,

    // Track configuration errors (fatal, construction/render time)
    #[error("Track '{track}' has an invalid option: {reason}")]
    InvalidTrackOption { track: String, reason: String },
    #[error("Track '{track}' failed to render {interval}: {source}")]
    TrackRenderError {
        track: String,
        interval: String,
        #[source]
        source: Box<TrackPlotError>,
    },

    // Data adapter errors (recoverable per track)
    #[error("No data available for track '{track}' over {interval}")]
    DataUnavailable { track: String, interval: String },
    #[error("Matrix source resolution must be nonzero")]
    ZeroResolution,
}

impl TrackPlotError {
    /// Whether a track-level fetch error can be recovered by rendering
    /// an empty placeholder panel instead of aborting the frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrackPlotError::DataUnavailable { .. })
    }
}
