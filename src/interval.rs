//! The [`GenomicInterval`] value type and locus-string parsing.
//!
//! All coordinate math in the crate funnels through this type. Intervals are
//! 0-indexed, right-exclusive, and immutable once constructed; navigation
//! operations build new intervals rather than mutating in place.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{error::TrackPlotError, Position};

/// A genomic interval: a chromosome name plus start/end positions,
/// with the invariant `start <= end`.
///
/// Ordering is lexicographic over `(chrom, start, end)`, so intervals
/// sort by chromosome name first, then position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicInterval {
    chrom: String,
    start: Position,
    end: Position,
}

impl GenomicInterval {
    /// Create a new interval, validating `start <= end`.
    pub fn new(
        chrom: impl Into<String>,
        start: Position,
        end: Position,
    ) -> Result<Self, TrackPlotError> {
        if start > end {
            return Err(TrackPlotError::InvalidInterval(start, end));
        }
        Ok(Self {
            chrom: chrom.into(),
            start,
            end,
        })
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Width of this interval in basepairs.
    pub fn width(&self) -> Position {
        self.end - self.start
    }

    /// Midpoint of this interval.
    pub fn center(&self) -> Position {
        self.start + self.width() / 2
    }

    /// Whether this interval overlaps `(start, end)` on the same chromosome.
    pub fn overlaps(&self, chrom: &str, start: Position, end: Position) -> bool {
        self.chrom == chrom && start < self.end && end > self.start
    }

    /// Shift this interval by `fraction` of its width along the chromosome,
    /// clamped so that it never leaves `[0, chrom_len]`. Width is preserved:
    /// hitting a chromosome boundary slides the interval rather than
    /// truncating it.
    pub fn pan(&self, fraction: f64, chrom_len: Position) -> Self {
        let width = self.width().min(chrom_len);
        let shift = (fraction * width as f64).round() as i64;
        let start = self.start as i64 + shift;
        // slide back inside the chromosome, preserving width
        let max_start = chrom_len.saturating_sub(width) as i64;
        let start = start.clamp(0, max_start) as Position;
        Self {
            chrom: self.chrom.clone(),
            start,
            end: start + width,
        }
    }

    /// Scale this interval's width by `factor` around its center
    /// (`factor < 1` zooms in). The result is clamped to `[0, chrom_len]`
    /// and has width at least [`MIN_ZOOM_WIDTH`].
    pub fn zoom(&self, factor: f64, chrom_len: Position) -> Self {
        let new_width = ((self.width() as f64 * factor).round() as Position)
            .clamp(MIN_ZOOM_WIDTH, chrom_len);
        let center = self.center() as i64;
        let start = (center - new_width as i64 / 2).max(0) as Position;
        let start = start.min(chrom_len.saturating_sub(new_width));
        Self {
            chrom: self.chrom.clone(),
            start,
            end: start + new_width,
        }
    }
}

/// Minimum interval width reachable by zooming in, in basepairs.
pub const MIN_ZOOM_WIDTH: Position = 1;

impl PartialOrd for GenomicInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GenomicInterval {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.chrom, self.start, self.end).cmp(&(&other.chrom, other.start, other.end))
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl FromStr for GenomicInterval {
    type Err = TrackPlotError;

    /// Parse a locus string like `"chr9:4000000-6000000"`. Comma grouping
    /// in the coordinates (`"chr9:4,000,000-6,000,000"`) is accepted.
    /// A bare chromosome name is not parseable here since the full length
    /// is unknown; resolve those through [`Genome::full_chromosome`].
    ///
    /// [`Genome::full_chromosome`]: crate::genome::Genome::full_chromosome
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chrom, span) = s
            .rsplit_once(':')
            .ok_or_else(|| TrackPlotError::InvalidLocusString(s.to_string()))?;
        let (start, end) = span
            .split_once('-')
            .ok_or_else(|| TrackPlotError::InvalidLocusString(s.to_string()))?;
        if chrom.is_empty() {
            return Err(TrackPlotError::InvalidLocusString(s.to_string()));
        }
        let start: Position = start.replace(',', "").parse()?;
        let end: Position = end.replace(',', "").parse()?;
        GenomicInterval::new(chrom, start, end)
    }
}
