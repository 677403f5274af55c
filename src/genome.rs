//! The [`Genome`] chromosome-size table, used to validate and clamp
//! intervals before rendering.

use indexmap::IndexMap;

use crate::{error::TrackPlotError, interval::GenomicInterval, Position};

/// A table of chromosome names and their lengths, in declaration order.
///
/// Every interval the browser navigates to is resolved against this table:
/// unknown chromosome names are fatal, out-of-bounds coordinates are
/// clamped.
#[derive(Clone, Debug, Default)]
pub struct Genome {
    seqlens: IndexMap<String, Position>,
}

impl Genome {
    pub fn new(seqlens: IndexMap<String, Position>) -> Self {
        Self { seqlens }
    }

    /// Build from `(name, length)` pairs, keeping insertion order.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Position)>) -> Self {
        Self {
            seqlens: pairs.into_iter().map(|(n, l)| (n.into(), l)).collect(),
        }
    }

    pub fn seqlens(&self) -> &IndexMap<String, Position> {
        &self.seqlens
    }

    /// The length of chromosome `chrom`, or an [`TrackPlotError::UnknownChromosome`]
    /// error if it is not in the table.
    pub fn chrom_len(&self, chrom: &str) -> Result<Position, TrackPlotError> {
        self.seqlens
            .get(chrom)
            .copied()
            .ok_or_else(|| TrackPlotError::UnknownChromosome(chrom.to_string()))
    }

    /// An interval covering all of chromosome `chrom`.
    pub fn full_chromosome(&self, chrom: &str) -> Result<GenomicInterval, TrackPlotError> {
        let len = self.chrom_len(chrom)?;
        GenomicInterval::new(chrom, 0, len)
    }

    /// Resolve `interval` against this genome: the chromosome must exist,
    /// and coordinates past the chromosome end are clamped. A clamp that
    /// collapses the interval to zero width is fatal (the interval lies
    /// entirely past the end of the chromosome).
    pub fn clamp(&self, interval: &GenomicInterval) -> Result<GenomicInterval, TrackPlotError> {
        let len = self.chrom_len(interval.chrom())?;
        let start = interval.start().min(len);
        let end = interval.end().min(len);
        if start == end {
            return Err(TrackPlotError::EmptyIntervalAfterClamp(
                interval.start(),
                interval.end(),
                len,
            ));
        }
        GenomicInterval::new(interval.chrom(), start, end)
    }
}
