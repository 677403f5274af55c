//! Data-source adapter traits and in-memory reference implementations.
//!
//! The rendering core never parses file bytes. Each concrete file format
//! (cool/mcool, BAM, BED, GTF, BigWig, BedGraph, BEDPE, pairs) is expected
//! to be wrapped in an adapter implementing one of the narrow source traits
//! here: report the chromosomes it knows about, and answer bounded queries
//! for records overlapping a [`GenomicInterval`]. The `Memory*` types in
//! this module are complete implementations over in-memory records; they
//! back the test suite and any caller that has already loaded its data.

use coitrees::{BasicCOITree, GenericInterval, IntervalTree};
use genomap::GenomeMap;
use indexmap::IndexMap;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::{error::TrackPlotError, interval::GenomicInterval, Position};

/// A single signal measurement over a genomic span (BigWig/BedGraph-style).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    pub start: Position,
    pub end: Position,
    pub value: f64,
}

/// Feature strand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

/// An annotation feature (BED/GTF-style).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub start: Position,
    pub end: Position,
    pub name: Option<String>,
    pub score: Option<f64>,
    pub strand: Option<Strand>,
}

impl Feature {
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            name: None,
            score: None,
            strand: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A paired-anchor record (BEDPE/pairs-style); both anchors are on the
/// same chromosome for arc drawing purposes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    pub start1: Position,
    pub end1: Position,
    pub start2: Position,
    pub end2: Position,
    pub score: Option<f64>,
}

impl AnchorPair {
    pub fn new(start1: Position, end1: Position, start2: Position, end2: Position) -> Self {
        Self {
            start1,
            end1,
            start2,
            end2,
            score: None,
        }
    }

    /// The full genomic span covered by both anchors.
    pub fn span(&self) -> (Position, Position) {
        (self.start1.min(self.start2), self.end1.max(self.end2))
    }
}

/// A dense block of matrix values covering a rectangle of bins.
///
/// `row_bin_start`/`col_bin_start` index bins (genomic position divided by
/// `resolution`), so the block's genomic footprint is recoverable without
/// a back-pointer to the source.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixBlock {
    pub row_bin_start: usize,
    pub col_bin_start: usize,
    pub resolution: Position,
    pub values: Array2<f64>,
}

impl MatrixBlock {
    /// Maximum finite value in the block, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

/// Common surface of every data adapter: which chromosomes it can answer
/// queries for, and how long they are.
pub trait DataSource {
    fn chrom_sizes(&self) -> IndexMap<String, Position>;

    fn has_chrom(&self, chrom: &str) -> bool {
        self.chrom_sizes().contains_key(chrom)
    }
}

/// Adapter for continuous signal data (BigWig, BedGraph, BAM coverage).
pub trait SignalSource: DataSource {
    /// All samples overlapping `interval`, in position order.
    fn query(&self, interval: &GenomicInterval) -> Result<Vec<SignalSample>, TrackPlotError>;
}

/// Adapter for interval annotations (BED, GTF).
pub trait FeatureSource: DataSource {
    /// All features overlapping `interval`, in position order.
    fn query(&self, interval: &GenomicInterval) -> Result<Vec<Feature>, TrackPlotError>;
}

/// Adapter for paired-anchor data (BEDPE, pairs).
pub trait PairSource: DataSource {
    /// All pairs whose combined span overlaps `interval`, in position order.
    fn query(&self, interval: &GenomicInterval) -> Result<Vec<AnchorPair>, TrackPlotError>;
}

/// Adapter for binned contact matrices (cool/mcool).
pub trait MatrixSource: DataSource {
    /// Bin size in basepairs.
    fn resolution(&self) -> Position;

    /// Fetch the dense block with rows spanning `rows` and columns spanning
    /// `cols`, both snapped outward to bin boundaries.
    fn query_block(
        &self,
        rows: &GenomicInterval,
        cols: &GenomicInterval,
    ) -> Result<MatrixBlock, TrackPlotError>;

    /// The square block over `interval` (rows == cols).
    fn query(&self, interval: &GenomicInterval) -> Result<MatrixBlock, TrackPlotError> {
        self.query_block(interval, interval)
    }
}

/// Snap `interval` outward to bin boundaries, returning `(first_bin,
/// one_past_last_bin)` bin indices.
pub fn snap_to_bins(
    interval: &GenomicInterval,
    resolution: Position,
) -> Result<(usize, usize), TrackPlotError> {
    if resolution == 0 {
        return Err(TrackPlotError::ZeroResolution);
    }
    let first = (interval.start() / resolution) as usize;
    let last = (interval.end().div_ceil(resolution)) as usize;
    Ok((first, last.max(first + 1)))
}

// An interval-tree entry whose metadata is an index into a record vector.
#[derive(Clone, Debug)]
struct IndexedSpan {
    start: Position,
    end: Position,
    index: usize,
}

impl GenericInterval<usize> for IndexedSpan {
    fn first(&self) -> i32 {
        self.start as i32
    }
    // coitrees is right-inclusive internally
    fn last(&self) -> i32 {
        self.end as i32 - 1
    }
    fn metadata(&self) -> &usize {
        &self.index
    }
}

/// One chromosome's worth of indexed records plus an interval tree over
/// their spans.
struct SpanTree {
    tree: BasicCOITree<usize, usize>,
}

impl SpanTree {
    fn new(spans: Vec<IndexedSpan>) -> Self {
        Self {
            tree: BasicCOITree::new(&spans),
        }
    }

    /// Collect record indices overlapping the 0-indexed right-exclusive
    /// query, sorted so results are deterministic.
    fn overlapping(&self, start: Position, end: Position) -> Vec<usize> {
        let mut hits = Vec::new();
        if end > start {
            self.tree
                .query(start as i32, end as i32 - 1, |node| hits.push(*node.metadata()));
        }
        hits.sort_unstable();
        hits
    }
}

fn build_span_map<T>(
    seqlens: &IndexMap<String, Position>,
    records: &GenomeMap<Vec<T>>,
    span_of: impl Fn(&T) -> (Position, Position),
) -> Result<GenomeMap<SpanTree>, TrackPlotError> {
    let mut trees = GenomeMap::new();
    for chrom in seqlens.keys() {
        let mut spans = Vec::new();
        if let Some(recs) = records.get(chrom) {
            for (index, r) in recs.iter().enumerate() {
                let (start, end) = span_of(r);
                if start > end {
                    return Err(TrackPlotError::InvalidInterval(start, end));
                }
                spans.push(IndexedSpan { start, end, index });
            }
        }
        trees.insert(chrom, SpanTree::new(spans))?;
    }
    Ok(trees)
}

fn collect_records<T: Clone>(
    seqlens: &IndexMap<String, Position>,
    records: impl IntoIterator<Item = (String, T)>,
) -> Result<GenomeMap<Vec<T>>, TrackPlotError> {
    let mut map: GenomeMap<Vec<T>> = GenomeMap::new();
    for chrom in seqlens.keys() {
        map.insert(chrom, Vec::new())?;
    }
    for (chrom, record) in records {
        match map.get_mut(&chrom) {
            Some(recs) => recs.push(record),
            None => return Err(TrackPlotError::UnknownChromosome(chrom)),
        }
    }
    Ok(map)
}

/// In-memory [`SignalSource`] backed by per-chromosome interval trees.
pub struct MemorySignal {
    seqlens: IndexMap<String, Position>,
    samples: GenomeMap<Vec<SignalSample>>,
    trees: GenomeMap<SpanTree>,
}

impl MemorySignal {
    /// Build from `(chrom, sample)` records. Records on chromosomes not in
    /// `seqlens` are a construction error.
    pub fn new(
        seqlens: IndexMap<String, Position>,
        records: impl IntoIterator<Item = (String, SignalSample)>,
    ) -> Result<Self, TrackPlotError> {
        let samples = collect_records(&seqlens, records)?;
        let trees = build_span_map(&seqlens, &samples, |s| (s.start, s.end))?;
        Ok(Self {
            seqlens,
            samples,
            trees,
        })
    }
}

impl DataSource for MemorySignal {
    fn chrom_sizes(&self) -> IndexMap<String, Position> {
        self.seqlens.clone()
    }
}

impl SignalSource for MemorySignal {
    fn query(&self, interval: &GenomicInterval) -> Result<Vec<SignalSample>, TrackPlotError> {
        let (Some(tree), Some(samples)) = (
            self.trees.get(interval.chrom()),
            self.samples.get(interval.chrom()),
        ) else {
            return Ok(Vec::new());
        };
        Ok(tree
            .overlapping(interval.start(), interval.end())
            .into_iter()
            .map(|i| samples[i].clone())
            .collect())
    }
}

/// In-memory [`FeatureSource`] backed by per-chromosome interval trees.
pub struct MemoryFeatures {
    seqlens: IndexMap<String, Position>,
    features: GenomeMap<Vec<Feature>>,
    trees: GenomeMap<SpanTree>,
}

impl MemoryFeatures {
    pub fn new(
        seqlens: IndexMap<String, Position>,
        records: impl IntoIterator<Item = (String, Feature)>,
    ) -> Result<Self, TrackPlotError> {
        let features = collect_records(&seqlens, records)?;
        let trees = build_span_map(&seqlens, &features, |f| (f.start, f.end))?;
        Ok(Self {
            seqlens,
            features,
            trees,
        })
    }
}

impl DataSource for MemoryFeatures {
    fn chrom_sizes(&self) -> IndexMap<String, Position> {
        self.seqlens.clone()
    }
}

impl FeatureSource for MemoryFeatures {
    fn query(&self, interval: &GenomicInterval) -> Result<Vec<Feature>, TrackPlotError> {
        let (Some(tree), Some(features)) = (
            self.trees.get(interval.chrom()),
            self.features.get(interval.chrom()),
        ) else {
            return Ok(Vec::new());
        };
        Ok(tree
            .overlapping(interval.start(), interval.end())
            .into_iter()
            .map(|i| features[i].clone())
            .collect())
    }
}

/// In-memory [`PairSource`]; pairs are indexed by their combined span so
/// arcs partially outside the window are still found.
pub struct MemoryPairs {
    seqlens: IndexMap<String, Position>,
    pairs: GenomeMap<Vec<AnchorPair>>,
    trees: GenomeMap<SpanTree>,
}

impl MemoryPairs {
    pub fn new(
        seqlens: IndexMap<String, Position>,
        records: impl IntoIterator<Item = (String, AnchorPair)>,
    ) -> Result<Self, TrackPlotError> {
        let pairs = collect_records(&seqlens, records)?;
        // the combined span can be well-formed even when one anchor is
        // not, so each anchor is checked on its own
        for pair in pairs.values().flatten() {
            for (start, end) in [(pair.start1, pair.end1), (pair.start2, pair.end2)] {
                if start > end {
                    return Err(TrackPlotError::InvalidInterval(start, end));
                }
            }
        }
        let trees = build_span_map(&seqlens, &pairs, |p| p.span())?;
        Ok(Self {
            seqlens,
            pairs,
            trees,
        })
    }
}

impl DataSource for MemoryPairs {
    fn chrom_sizes(&self) -> IndexMap<String, Position> {
        self.seqlens.clone()
    }
}

impl PairSource for MemoryPairs {
    fn query(&self, interval: &GenomicInterval) -> Result<Vec<AnchorPair>, TrackPlotError> {
        let (Some(tree), Some(pairs)) = (
            self.trees.get(interval.chrom()),
            self.pairs.get(interval.chrom()),
        ) else {
            return Ok(Vec::new());
        };
        Ok(tree
            .overlapping(interval.start(), interval.end())
            .into_iter()
            .map(|i| pairs[i].clone())
            .collect())
    }
}

/// In-memory [`MatrixSource`] holding one dense per-chromosome matrix at a
/// fixed resolution.
pub struct MemoryMatrix {
    seqlens: IndexMap<String, Position>,
    resolution: Position,
    matrices: GenomeMap<Array2<f64>>,
}

impl MemoryMatrix {
    /// Each matrix must be square with `ceil(chrom_len / resolution)` bins
    /// per side.
    pub fn new(
        seqlens: IndexMap<String, Position>,
        resolution: Position,
        matrices: impl IntoIterator<Item = (String, Array2<f64>)>,
    ) -> Result<Self, TrackPlotError> {
        if resolution == 0 {
            return Err(TrackPlotError::ZeroResolution);
        }
        let mut map = GenomeMap::new();
        for (chrom, matrix) in matrices {
            let len = seqlens
                .get(&chrom)
                .ok_or_else(|| TrackPlotError::UnknownChromosome(chrom.clone()))?;
            let nbins = len.div_ceil(resolution) as usize;
            if matrix.nrows() != nbins || matrix.ncols() != nbins {
                return Err(TrackPlotError::InvalidTrackOption {
                    track: chrom.clone(),
                    reason: format!(
                        "matrix is {}x{}, expected {}x{} at {} bp resolution",
                        matrix.nrows(),
                        matrix.ncols(),
                        nbins,
                        nbins,
                        resolution
                    ),
                });
            }
            map.insert(&chrom, matrix)?;
        }
        Ok(Self {
            seqlens,
            resolution,
            matrices: map,
        })
    }
}

impl DataSource for MemoryMatrix {
    fn chrom_sizes(&self) -> IndexMap<String, Position> {
        self.seqlens.clone()
    }

    fn has_chrom(&self, chrom: &str) -> bool {
        self.matrices.get(chrom).is_some()
    }
}

impl MatrixSource for MemoryMatrix {
    fn resolution(&self) -> Position {
        self.resolution
    }

    fn query_block(
        &self,
        rows: &GenomicInterval,
        cols: &GenomicInterval,
    ) -> Result<MatrixBlock, TrackPlotError> {
        let matrix = self
            .matrices
            .get(rows.chrom())
            .ok_or_else(|| TrackPlotError::UnknownChromosome(rows.chrom().to_string()))?;
        let (r0, r1) = snap_to_bins(rows, self.resolution)?;
        let (c0, c1) = snap_to_bins(cols, self.resolution)?;
        let r1 = r1.min(matrix.nrows());
        let c1 = c1.min(matrix.ncols());
        let r0 = r0.min(r1);
        let c0 = c0.min(c1);
        Ok(MatrixBlock {
            row_bin_start: r0,
            col_bin_start: c0,
            resolution: self.resolution,
            values: matrix.slice(s![r0..r1, c0..c1]).to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn seqlens() -> IndexMap<String, Position> {
        [("chr1".to_string(), 100), ("chr2".to_string(), 50)]
            .into_iter()
            .collect()
    }

    fn chr1_only() -> IndexMap<String, Position> {
        std::iter::once(("chr1".to_string(), 100)).collect()
    }

    #[test]
    fn test_signal_query_bounded() {
        let source = MemorySignal::new(
            seqlens(),
            [
                ("chr1".to_string(), SignalSample { start: 0, end: 10, value: 1.0 }),
                ("chr1".to_string(), SignalSample { start: 10, end: 20, value: 2.0 }),
                ("chr1".to_string(), SignalSample { start: 40, end: 50, value: 3.0 }),
            ],
        )
        .unwrap();
        let iv = GenomicInterval::new("chr1", 5, 15).unwrap();
        let samples = source.query(&iv).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 1.0);
        assert_eq!(samples[1].value, 2.0);
    }

    #[test]
    fn test_query_missing_chrom_is_empty() {
        let source = MemorySignal::new(seqlens(), []).unwrap();
        let iv = GenomicInterval::new("chrMT", 0, 10).unwrap();
        assert!(source.query(&iv).unwrap().is_empty());
        assert!(!source.has_chrom("chrMT"));
    }

    #[test]
    fn test_unknown_chrom_record_is_construction_error() {
        let result = MemoryFeatures::new(
            seqlens(),
            [("chr17".to_string(), Feature::new(0, 10))],
        );
        assert!(matches!(result, Err(TrackPlotError::UnknownChromosome(_))));
    }

    #[test]
    fn test_reversed_record_span_is_construction_error() {
        let result = MemorySignal::new(
            seqlens(),
            [("chr1".to_string(), SignalSample { start: 20, end: 10, value: 1.0 })],
        );
        assert!(matches!(result, Err(TrackPlotError::InvalidInterval(20, 10))));
    }

    #[test]
    fn test_reversed_anchor_is_construction_error() {
        // the combined span (100, 900) is fine; the first anchor is not
        let result = MemoryPairs::new(
            seqlens(),
            [("chr1".to_string(), AnchorPair::new(200, 100, 800, 900))],
        );
        assert!(matches!(result, Err(TrackPlotError::InvalidInterval(200, 100))));
    }

    #[test]
    fn test_pair_found_by_span() {
        let source = MemoryPairs::new(
            seqlens(),
            [("chr1".to_string(), AnchorPair::new(0, 5, 80, 90))],
        )
        .unwrap();
        // window between the anchors still overlaps the pair's span
        let iv = GenomicInterval::new("chr1", 30, 40).unwrap();
        assert_eq!(source.query(&iv).unwrap().len(), 1);
    }

    #[test]
    fn test_snap_to_bins() {
        let iv = GenomicInterval::new("chr1", 15, 35).unwrap();
        assert_eq!(snap_to_bins(&iv, 10).unwrap(), (1, 4));
        let exact = GenomicInterval::new("chr1", 10, 30).unwrap();
        assert_eq!(snap_to_bins(&exact, 10).unwrap(), (1, 3));
    }

    #[test]
    fn test_matrix_block_query() {
        let matrix = Array2::from_shape_fn((10, 10), |(i, j)| (i * 10 + j) as f64);
        let source = MemoryMatrix::new(chr1_only(), 10, [("chr1".to_string(), matrix)]).unwrap();
        let iv = GenomicInterval::new("chr1", 20, 40).unwrap();
        let block = source.query(&iv).unwrap();
        assert_eq!(block.row_bin_start, 2);
        assert_eq!(block.values, arr2(&[[22.0, 23.0], [32.0, 33.0]]));
        assert_eq!(block.max_value(), Some(33.0));
    }

    #[test]
    fn test_matrix_shape_mismatch_is_error() {
        let result = MemoryMatrix::new(chr1_only(), 10, [("chr1".to_string(), Array2::zeros((5, 5)))]);
        assert!(matches!(
            result,
            Err(TrackPlotError::InvalidTrackOption { .. })
        ));
    }
}
