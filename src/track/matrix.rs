//! Contact-matrix tracks: the triangular Hi-C heatmap ([`MatrixTrack`])
//! and the virtual-4C profile sliced from a matrix at an anchor
//! ([`ProfileTrack`]).

use crate::{
    error::TrackPlotError,
    interval::GenomicInterval,
    render::{svg::heat_color, Panel},
    sources::MatrixSource,
    track::{data_unavailable, Track, TrackData, TrackProperties, ValueRange},
};

const PROFILE_COLOR: &str = "#e41a1c";
const MATRIX_HEIGHT: f64 = 10.0;

/// A Hi-C matrix rendered in triangular form: the diagonal runs along the
/// panel's bottom edge and interaction distance grows upward (downward
/// when inverted). The window is snapped outward to bin boundaries before
/// fetching, so cells always align with the matrix resolution.
pub struct MatrixTrack<M> {
    source: M,
    properties: TrackProperties,
    /// Fraction of the window width shown as maximum off-diagonal
    /// distance; 1.0 is full depth.
    depth_ratio: f64,
}

impl<M: MatrixSource> MatrixTrack<M> {
    pub fn new(source: M) -> Self {
        let mut properties = TrackProperties::new("matrix");
        properties.height = MATRIX_HEIGHT;
        Self {
            source,
            properties,
            depth_ratio: 1.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn with_depth_ratio(mut self, depth_ratio: f64) -> Self {
        self.depth_ratio = depth_ratio;
        self
    }
}

impl<M: MatrixSource> Track for MatrixTrack<M> {
    fn properties(&self) -> &TrackProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut TrackProperties {
        &mut self.properties
    }

    fn validate(&self) -> Result<(), TrackPlotError> {
        self.properties.validate()?;
        if !(self.depth_ratio > 0.0 && self.depth_ratio <= 1.0) {
            return Err(TrackPlotError::InvalidTrackOption {
                track: self.name().to_string(),
                reason: format!("depth_ratio must be in (0, 1], got {}", self.depth_ratio),
            });
        }
        Ok(())
    }

    fn fetch(&self, interval: &GenomicInterval) -> Result<TrackData, TrackPlotError> {
        if !self.source.has_chrom(interval.chrom()) {
            return Err(data_unavailable(self.name(), interval));
        }
        Ok(TrackData::Matrix(self.source.query(interval)?))
    }

    fn draw(
        &self,
        interval: &GenomicInterval,
        data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        let TrackData::Matrix(block) = data else {
            return Ok(());
        };
        let Some(observed_max) = block.max_value() else {
            return Ok(());
        };
        let (min, max) = match self.properties.value_range {
            ValueRange::Auto => (0.0, observed_max),
            fixed => fixed.resolve(0.0, observed_max),
        };
        if !(max > min) {
            return Ok(());
        }

        let res = block.resolution as f64;
        let depth_bp = (interval.width() as f64 * self.depth_ratio).max(res);
        let y_per_bp = panel.height() / depth_bp;
        let px_per_bp = panel.width() / interval.width() as f64;
        let inverted = self.properties.inverted;
        let n = block.values.nrows();
        for i in 0..n {
            for j in i..block.values.ncols() {
                let value = block.values[(i, j)];
                if !value.is_finite() || value <= min {
                    continue;
                }
                let gi = (block.row_bin_start + i) as f64 * res + res / 2.0;
                let gj = (block.col_bin_start + j) as f64 * res + res / 2.0;
                let dist = gj - gi;
                if dist > depth_bp {
                    continue;
                }
                // rotated cell: a diamond centered on the midpoint of the
                // two bins, raised off the diagonal by their distance
                let cx = panel.x(0) + (((gi + gj) / 2.0) - interval.start() as f64) * px_per_bp;
                let depth_frac = (dist * y_per_bp / panel.height()).clamp(0.0, 1.0);
                let cy = if inverted {
                    panel.y(depth_frac)
                } else {
                    panel.y(1.0 - depth_frac)
                };
                let half_w = res / 2.0 * px_per_bp;
                let half_h = res / 2.0 * y_per_bp;
                let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
                panel.polygon(
                    &[
                        (cx - half_w, cy),
                        (cx, cy - half_h),
                        (cx + half_w, cy),
                        (cx, cy + half_h),
                    ],
                    &heat_color(t),
                );
            }
        }
        Ok(())
    }
}

/// A virtual-4C profile: the mean contact frequency between a fixed anchor
/// and every bin across the window, drawn as a line.
pub struct ProfileTrack<M> {
    source: M,
    anchor: GenomicInterval,
    properties: TrackProperties,
}

impl<M: MatrixSource> ProfileTrack<M> {
    /// The anchor's chromosome must be resolvable by the source; an
    /// unresolvable anchor is a fatal construction-time error.
    pub fn new(source: M, anchor: GenomicInterval) -> Result<Self, TrackPlotError> {
        if !source.has_chrom(anchor.chrom()) {
            return Err(TrackPlotError::InvalidTrackOption {
                track: "profile".to_string(),
                reason: format!("anchor chromosome '{}' not in matrix source", anchor.chrom()),
            });
        }
        let mut properties = TrackProperties::new("profile");
        properties.color = PROFILE_COLOR.to_string();
        Ok(Self {
            source,
            anchor,
            properties,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn anchor(&self) -> &GenomicInterval {
        &self.anchor
    }
}

impl<M: MatrixSource> Track for ProfileTrack<M> {
    fn properties(&self) -> &TrackProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut TrackProperties {
        &mut self.properties
    }

    fn fetch(&self, interval: &GenomicInterval) -> Result<TrackData, TrackPlotError> {
        // cis-only: a window on another chromosome has no contacts with
        // the anchor, so the renderer substitutes the placeholder
        if interval.chrom() != self.anchor.chrom() || !self.source.has_chrom(interval.chrom()) {
            return Err(data_unavailable(self.name(), interval));
        }
        let block = self.source.query_block(&self.anchor, interval)?;
        let values = if block.values.nrows() == 0 {
            vec![0.0; block.values.ncols()]
        } else {
            // column means over the anchor's bin rows
            (0..block.values.ncols())
                .map(|c| block.values.column(c).sum() / block.values.nrows() as f64)
                .collect()
        };
        Ok(TrackData::Profile {
            bin_start: block.col_bin_start,
            resolution: block.resolution,
            values,
        })
    }

    fn draw(
        &self,
        _interval: &GenomicInterval,
        data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        let TrackData::Profile {
            bin_start,
            resolution,
            values,
        } = data
        else {
            return Ok(());
        };
        if values.is_empty() {
            return Ok(());
        }
        let observed_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let observed_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (min, max) = self.properties.value_range.resolve(observed_min, observed_max);
        let inverted = self.properties.inverted;

        let mut d = String::new();
        for (i, value) in values.iter().enumerate() {
            let mid = (*bin_start + i) as f64 * *resolution as f64 + *resolution as f64 / 2.0;
            let x = panel.x(mid.round() as crate::Position);
            let y = panel.y_value(*value, min, max, inverted);
            if d.is_empty() {
                d.push_str(&format!(
                    "M {} {}",
                    crate::render::svg::px(x),
                    crate::render::svg::px(y)
                ));
            } else {
                d.push_str(&format!(
                    " L {} {}",
                    crate::render::svg::px(x),
                    crate::render::svg::px(y)
                ));
            }
        }
        panel.path(&d, &self.properties.color, 1.0);
        Ok(())
    }
}
