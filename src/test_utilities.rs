//! Test cases and test utility functions.
//!

use rand::{thread_rng, Rng};

use crate::{
    interval::GenomicInterval,
    sources::{Feature, SignalSample},
    Position,
};

// Stochastic test defaults: enough draws to catch ordering and packing
// mistakes without slowing the test suite.
pub const NRANDOM: usize = 1000;

// feature length bounds
pub const MIN_LEN: Position = 1;
pub const MAX_LEN: Position = 10_000;

// number of chromosome sequences
pub const NCHROM: usize = 22;

// chromosome sizes
pub const MIN_CHROM_LEN: Position = 50_000_000;
pub const MAX_CHROM_LEN: Position = 250_000_000;

/// Build a random range start/end on a sequence of `chrom_len`.
/// 0-indexed, right exclusive.
pub fn random_range(chrom_len: Position) -> (Position, Position) {
    let mut rng = thread_rng();
    let len = rng.gen_range(MIN_LEN..MAX_LEN);
    let start = rng.gen_range(0..chrom_len - len + 1);
    (start, start + len)
}

/// Build a random sequence length.
pub fn random_seqlen() -> Position {
    let mut rng = thread_rng();
    rng.gen_range(MIN_CHROM_LEN..=MAX_CHROM_LEN)
}

/// Sample a random chromosome name.
pub fn random_chrom() -> String {
    let mut rng = thread_rng();
    format!("chr{}", rng.gen_range(1..NCHROM + 1))
}

/// Build a random interval on the given chromosome.
pub fn random_interval(chrom: &str, chrom_len: Position) -> GenomicInterval {
    let (start, end) = random_range(chrom_len);
    GenomicInterval::new(chrom, start, end).expect("random range is valid")
}

/// Build `n` random features on a sequence of `chrom_len`, start-sorted.
pub fn random_features(n: usize, chrom_len: Position) -> Vec<Feature> {
    let mut features: Vec<_> = (0..n)
        .map(|i| {
            let (start, end) = random_range(chrom_len);
            Feature::new(start, end).with_name(format!("feature.{}", i))
        })
        .collect();
    features.sort_by_key(|f| (f.start, f.end));
    features
}

/// Build `n` contiguous random signal samples tiling `[0, n * width)`.
pub fn random_signal(n: usize, width: Position) -> Vec<SignalSample> {
    let mut rng = thread_rng();
    (0..n)
        .map(|i| SignalSample {
            start: i as Position * width,
            end: (i as Position + 1) * width,
            value: rng.gen_range(0.0..100.0),
        })
        .collect()
}
