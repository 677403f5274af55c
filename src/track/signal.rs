//! Continuous signal tracks: [`SignalTrack`] (BigWig/BedGraph-style area
//! plots) and [`CoverageTrack`] (alignment coverage bars).

use crate::{
    error::TrackPlotError,
    interval::GenomicInterval,
    render::Panel,
    sources::{SignalSample, SignalSource},
    track::{data_unavailable, Track, TrackData, TrackProperties},
};

/// Default number of resampling bins across the window.
pub const DEFAULT_NUMBER_OF_BINS: usize = 700;
const SIGNAL_COLOR: &str = "#dfccde";
const COVERAGE_COLOR: &str = "#a6cee3";

/// Resample `samples` into `nbins` equal-width bins across `interval`,
/// taking the overlap-weighted mean per bin. Bins with no overlapping
/// sample are zero.
pub fn bin_samples(samples: &[SignalSample], interval: &GenomicInterval, nbins: usize) -> Vec<f64> {
    let start = interval.start() as f64;
    let bin_bp = interval.width() as f64 / nbins as f64;
    let mut sums = vec![0.0f64; nbins];
    let mut covered = vec![0.0f64; nbins];
    for sample in samples {
        let s = (sample.start as f64).max(start);
        let e = (sample.end as f64).min(interval.end() as f64);
        if e <= s {
            continue;
        }
        let first = (((s - start) / bin_bp).floor() as usize).min(nbins - 1);
        let last = (((e - start) / bin_bp).ceil() as usize).min(nbins);
        for bin in first..last {
            let bin_lo = start + bin as f64 * bin_bp;
            let bin_hi = bin_lo + bin_bp;
            let overlap = (e.min(bin_hi) - s.max(bin_lo)).max(0.0);
            sums[bin] += sample.value * overlap;
            covered[bin] += overlap;
        }
    }
    sums.iter()
        .zip(&covered)
        .map(|(sum, cov)| if *cov > 0.0 { sum / cov } else { 0.0 })
        .collect()
}

fn observed_extrema(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    })
}

fn fetch_signal<S: SignalSource>(
    source: &S,
    name: &str,
    interval: &GenomicInterval,
) -> Result<TrackData, TrackPlotError> {
    if !source.has_chrom(interval.chrom()) {
        return Err(data_unavailable(name, interval));
    }
    Ok(TrackData::Signal(source.query(interval)?))
}

/// A BigWig/BedGraph-style signal track, rendered as a filled area plot.
pub struct SignalTrack<S> {
    source: S,
    properties: TrackProperties,
    number_of_bins: usize,
}

impl<S: SignalSource> SignalTrack<S> {
    pub fn new(source: S) -> Self {
        let mut properties = TrackProperties::new("signal");
        properties.color = SIGNAL_COLOR.to_string();
        Self {
            source,
            properties,
            number_of_bins: DEFAULT_NUMBER_OF_BINS,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn with_number_of_bins(mut self, nbins: usize) -> Self {
        self.number_of_bins = nbins;
        self
    }
}

impl<S: SignalSource> Track for SignalTrack<S> {
    fn properties(&self) -> &TrackProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut TrackProperties {
        &mut self.properties
    }

    fn validate(&self) -> Result<(), TrackPlotError> {
        self.properties.validate()?;
        if self.number_of_bins == 0 {
            return Err(TrackPlotError::InvalidTrackOption {
                track: self.name().to_string(),
                reason: "number_of_bins must be nonzero".to_string(),
            });
        }
        Ok(())
    }

    fn fetch(&self, interval: &GenomicInterval) -> Result<TrackData, TrackPlotError> {
        fetch_signal(&self.source, self.name(), interval)
    }

    fn draw(
        &self,
        interval: &GenomicInterval,
        data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        let TrackData::Signal(samples) = data else {
            return Ok(());
        };
        if samples.is_empty() {
            return Ok(());
        }
        let values = bin_samples(samples, interval, self.number_of_bins);
        let (observed_min, observed_max) = observed_extrema(&values);
        let (min, max) = self.properties.value_range.resolve(observed_min, observed_max);
        let inverted = self.properties.inverted;
        let baseline = min.max(0.0).min(max);

        // step-area polygon over the bins, closed along the baseline
        let bin_px = panel.width() / values.len() as f64;
        let x_left = panel.x(interval.start());
        let y_base = panel.y_value(baseline, min, max, inverted);
        let mut points = Vec::with_capacity(values.len() * 2 + 2);
        points.push((x_left, y_base));
        for (i, value) in values.iter().enumerate() {
            let y = panel.y_value(*value, min, max, inverted);
            points.push((x_left + i as f64 * bin_px, y));
            points.push((x_left + (i + 1) as f64 * bin_px, y));
        }
        points.push((x_left + values.len() as f64 * bin_px, y_base));
        panel.polygon(&points, &self.properties.color);
        Ok(())
    }
}

/// An alignment-coverage track (BAM-style), rendered as per-bin bars.
pub struct CoverageTrack<S> {
    source: S,
    properties: TrackProperties,
    number_of_bins: usize,
}

impl<S: SignalSource> CoverageTrack<S> {
    pub fn new(source: S) -> Self {
        let mut properties = TrackProperties::new("coverage");
        properties.color = COVERAGE_COLOR.to_string();
        Self {
            source,
            properties,
            number_of_bins: DEFAULT_NUMBER_OF_BINS,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn with_number_of_bins(mut self, nbins: usize) -> Self {
        self.number_of_bins = nbins;
        self
    }
}

impl<S: SignalSource> Track for CoverageTrack<S> {
    fn properties(&self) -> &TrackProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut TrackProperties {
        &mut self.properties
    }

    fn validate(&self) -> Result<(), TrackPlotError> {
        self.properties.validate()?;
        if self.number_of_bins == 0 {
            return Err(TrackPlotError::InvalidTrackOption {
                track: self.name().to_string(),
                reason: "number_of_bins must be nonzero".to_string(),
            });
        }
        Ok(())
    }

    fn fetch(&self, interval: &GenomicInterval) -> Result<TrackData, TrackPlotError> {
        fetch_signal(&self.source, self.name(), interval)
    }

    fn draw(
        &self,
        interval: &GenomicInterval,
        data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        let TrackData::Signal(samples) = data else {
            return Ok(());
        };
        if samples.is_empty() {
            return Ok(());
        }
        let values = bin_samples(samples, interval, self.number_of_bins);
        let (observed_min, observed_max) = observed_extrema(&values);
        let (min, max) = self.properties.value_range.resolve(observed_min, observed_max);
        let inverted = self.properties.inverted;
        let baseline = min.max(0.0).min(max);

        let bin_px = panel.width() / values.len() as f64;
        let x_left = panel.x(interval.start());
        let y_base = panel.y_value(baseline, min, max, inverted);
        for (i, value) in values.iter().enumerate() {
            if *value == baseline {
                continue;
            }
            let y = panel.y_value(*value, min, max, inverted);
            let (top, height) = if y <= y_base {
                (y, y_base - y)
            } else {
                (y_base, y - y_base)
            };
            panel.rect(x_left + i as f64 * bin_px, top, bin_px, height, &self.properties.color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySignal;
    use indexmap::IndexMap;

    fn seqlens() -> IndexMap<String, crate::Position> {
        std::iter::once(("chr1".to_string(), 1000)).collect()
    }

    fn sample(start: u32, end: u32, value: f64) -> (String, SignalSample) {
        ("chr1".to_string(), SignalSample { start, end, value })
    }

    #[test]
    fn test_bin_samples_weighted_mean() {
        let iv = GenomicInterval::new("chr1", 0, 100).unwrap();
        let samples = vec![
            SignalSample { start: 0, end: 50, value: 2.0 },
            SignalSample { start: 50, end: 100, value: 4.0 },
        ];
        let bins = bin_samples(&samples, &iv, 4);
        assert_eq!(bins, vec![2.0, 2.0, 4.0, 4.0]);
    }

    #[test]
    fn test_bin_samples_partial_coverage() {
        let iv = GenomicInterval::new("chr1", 0, 100).unwrap();
        // only the first half of bin 0 is covered; mean over covered bases
        let samples = vec![SignalSample { start: 0, end: 25, value: 8.0 }];
        let bins = bin_samples(&samples, &iv, 2);
        assert_eq!(bins, vec![8.0, 0.0]);
    }

    #[test]
    fn test_fetch_wrong_chrom_is_recoverable() {
        let track = SignalTrack::new(MemorySignal::new(seqlens(), []).unwrap());
        let iv = GenomicInterval::new("chr9", 0, 10).unwrap();
        let err = track.fetch(&iv).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_fetch_bounded_by_interval() {
        let source = MemorySignal::new(
            seqlens(),
            [sample(0, 100, 1.0), sample(500, 600, 2.0)],
        )
        .unwrap();
        let track = SignalTrack::new(source);
        let iv = GenomicInterval::new("chr1", 400, 700).unwrap();
        let TrackData::Signal(samples) = track.fetch(&iv).unwrap() else {
            panic!("expected signal data");
        };
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 2.0);
    }

    #[test]
    fn test_zero_bins_is_configuration_error() {
        let track = SignalTrack::new(MemorySignal::new(seqlens(), []).unwrap())
            .with_number_of_bins(0);
        assert!(matches!(
            track.validate(),
            Err(TrackPlotError::InvalidTrackOption { .. })
        ));
    }
}
