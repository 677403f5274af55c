//! Interval-annotation tracks (BED/GTF features) with stacked row packing.

use crate::{
    error::TrackPlotError,
    interval::GenomicInterval,
    render::Panel,
    sources::{Feature, FeatureSource},
    track::{data_unavailable, Track, TrackData, TrackProperties},
    Position,
};

const ANNOTATION_COLOR: &str = "#1f78b4";

/// Assign each feature to the first row whose rightmost end lies left of
/// the feature's start (greedy first-fit; features must be start-sorted).
/// Returns per-feature row indices and the row count.
pub fn pack_rows(features: &[Feature]) -> (Vec<usize>, usize) {
    let mut row_ends: Vec<Position> = Vec::new();
    let mut assignment = Vec::with_capacity(features.len());
    for feature in features {
        let row = row_ends
            .iter()
            .position(|end| *end <= feature.start)
            .unwrap_or_else(|| {
                row_ends.push(0);
                row_ends.len() - 1
            });
        row_ends[row] = feature.end;
        assignment.push(row);
    }
    (assignment, row_ends.len().max(1))
}

/// A BED/GTF feature track. Features are packed into rows so overlapping
/// features never collide; each row subdivides the panel height.
pub struct AnnotationTrack<S> {
    source: S,
    properties: TrackProperties,
    labels: bool,
    /// Cap on packed rows; features overflowing the cap are dropped.
    max_rows: Option<usize>,
}

impl<S: FeatureSource> AnnotationTrack<S> {
    pub fn new(source: S) -> Self {
        let mut properties = TrackProperties::new("annotation");
        properties.color = ANNOTATION_COLOR.to_string();
        Self {
            source,
            properties,
            labels: true,
            max_rows: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }
}

impl<S: FeatureSource> Track for AnnotationTrack<S> {
    fn properties(&self) -> &TrackProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut TrackProperties {
        &mut self.properties
    }

    fn validate(&self) -> Result<(), TrackPlotError> {
        self.properties.validate()?;
        if self.max_rows == Some(0) {
            return Err(TrackPlotError::InvalidTrackOption {
                track: self.name().to_string(),
                reason: "max_rows must be nonzero".to_string(),
            });
        }
        Ok(())
    }

    fn fetch(&self, interval: &GenomicInterval) -> Result<TrackData, TrackPlotError> {
        if !self.source.has_chrom(interval.chrom()) {
            return Err(data_unavailable(self.name(), interval));
        }
        let mut features = self.source.query(interval)?;
        features.sort_by_key(|f| (f.start, f.end));
        Ok(TrackData::Features(features))
    }

    fn draw(
        &self,
        _interval: &GenomicInterval,
        data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        let TrackData::Features(features) = data else {
            return Ok(());
        };
        if features.is_empty() {
            return Ok(());
        }
        let (assignment, nrows) = pack_rows(features);
        let nrows = self.max_rows.map_or(nrows, |cap| nrows.min(cap));
        let row_height = panel.height() / nrows as f64;
        let box_height = row_height * 0.6;
        for (feature, row) in features.iter().zip(&assignment) {
            if *row >= nrows {
                continue;
            }
            let x0 = panel.x(feature.start);
            let x1 = panel.x(feature.end);
            let y_top = panel.y(*row as f64 / nrows as f64) + (row_height - box_height) / 2.0;
            // clipped boxes keep a minimum visible width
            panel.rect(x0, y_top, (x1 - x0).max(0.5), box_height, &self.properties.color);
            if self.labels {
                if let Some(name) = &feature.name {
                    panel.text(x0, y_top - 1.0, box_height * 0.8, "start", name);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemoryFeatures;
    use indexmap::IndexMap;

    fn seqlens() -> IndexMap<String, Position> {
        std::iter::once(("chr1".to_string(), 1000)).collect()
    }

    #[test]
    fn test_pack_rows_disjoint_single_row() {
        let features = vec![Feature::new(0, 10), Feature::new(10, 20), Feature::new(30, 40)];
        let (rows, nrows) = pack_rows(&features);
        assert_eq!(rows, vec![0, 0, 0]);
        assert_eq!(nrows, 1);
    }

    #[test]
    fn test_pack_rows_overlapping_stack() {
        let features = vec![
            Feature::new(0, 100),
            Feature::new(50, 150),
            Feature::new(60, 160),
            Feature::new(120, 200),
        ];
        let (rows, nrows) = pack_rows(&features);
        assert_eq!(rows, vec![0, 1, 2, 0]);
        assert_eq!(nrows, 3);
    }

    #[test]
    fn test_fetch_sorts_by_start() {
        let source = MemoryFeatures::new(
            seqlens(),
            [
                ("chr1".to_string(), Feature::new(500, 600).with_name("b")),
                ("chr1".to_string(), Feature::new(100, 200).with_name("a")),
            ],
        )
        .unwrap();
        let track = AnnotationTrack::new(source);
        let iv = GenomicInterval::new("chr1", 0, 1000).unwrap();
        let TrackData::Features(features) = track.fetch(&iv).unwrap() else {
            panic!("expected features");
        };
        assert_eq!(features[0].name.as_deref(), Some("a"));
        assert_eq!(features[1].name.as_deref(), Some("b"));
    }

    #[test]
    fn test_fetch_missing_chrom_recoverable() {
        let track = AnnotationTrack::new(MemoryFeatures::new(seqlens(), []).unwrap());
        let iv = GenomicInterval::new("chrY", 0, 10).unwrap();
        assert!(track.fetch(&iv).unwrap_err().is_recoverable());
    }
}
