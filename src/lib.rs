//! # trackplot
//!
//! A library for composing genome-browser figures out of heterogeneous
//! data tracks (contact matrices, signal, annotations, arc diagrams) and
//! rendering them stacked over a shared genomic coordinate system, with an
//! interactive browsing session on top.
//!
//! The three layers, bottom up:
//!
//! 1. **Tracks** ([`track`]): one renderable row each, bound to a data
//!    adapter ([`sources`]) and rendered for a [`GenomicInterval`] window.
//!    File-format parsing lives outside this crate; adapters only answer
//!    interval-bounded queries.
//!
//! 2. **Frames** ([`compose`]): tracks combine with `+` into an ordered
//!    figure. Decorators (`Title`, `TrackHeight`, `Inverted`, `Color`)
//!    modify the preceding track instead of adding a row.
//!
//! 3. **Browsing** ([`browser`]): a [`Browser`] holds the current interval
//!    and re-renders the frame through the [`Renderer`] on `goto`, `pan`,
//!    and `zoom`, pushing each artifact to an injected display sink.
//!
//! ```
//! use trackplot::prelude::*;
//! use trackplot::sources::{MemorySignal, SignalSample};
//!
//! # fn main() -> Result<(), TrackPlotError> {
//! let genome = Genome::from_pairs([("chr9", 141_000_000u32)]);
//! let signal = MemorySignal::new(
//!     genome.seqlens().clone(),
//!     [("chr9".to_string(), SignalSample { start: 4_500_000, end: 5_500_000, value: 2.5 })],
//! )?;
//!
//! let frame = (XAxisTrack::new()
//!     + SignalTrack::new(signal)
//!     + Decorator::Title("coverage".to_string())
//!     + SpacerTrack::new(0.5))
//! .build()?;
//!
//! let start: GenomicInterval = "chr9:4,000,000-6,000,000".parse()?;
//! let mut browser = Browser::new(frame, genome, start, NullSink)?;
//! browser.zoom(0.5)?;
//! assert_eq!(browser.interval().to_string(), "chr9:4500000-5500000");
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod compose;
pub mod error;
pub mod genome;
pub mod interval;
pub mod render;
pub mod sources;
pub mod test_utilities;
pub mod track;

/// A genomic position in basepairs.
pub type Position = u32;

pub mod prelude {
    pub use crate::browser::{Browser, FrameSink, NavCommand, NullSink};
    pub use crate::compose::{Decorator, Frame, FrameBuilder};
    pub use crate::error::TrackPlotError;
    pub use crate::genome::Genome;
    pub use crate::interval::GenomicInterval;
    pub use crate::render::{RenderedFrame, Renderer};
    pub use crate::track::{
        AnnotationTrack, ArcTrack, CoverageTrack, MatrixTrack, ProfileTrack, SignalTrack,
        SpacerTrack, Track, TrackProperties, ValueRange, XAxisTrack,
    };
}
