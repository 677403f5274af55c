//! Arc-diagram tracks for paired-anchor data (BEDPE/pairs).

use crate::{
    error::TrackPlotError,
    interval::GenomicInterval,
    render::Panel,
    sources::PairSource,
    track::{data_unavailable, Track, TrackData, TrackProperties},
};

const ARC_COLOR: &str = "#3297dc";

/// One arc per anchor pair, spanning the two anchor midpoints. Arcs open
/// upward from the panel's bottom edge; the `Inverted` decorator flips
/// them to open downward from the top edge without touching the data.
pub struct ArcTrack<P> {
    source: P,
    properties: TrackProperties,
    line_width: f64,
}

impl<P: PairSource> ArcTrack<P> {
    pub fn new(source: P) -> Self {
        let mut properties = TrackProperties::new("arcs");
        properties.color = ARC_COLOR.to_string();
        Self {
            source,
            properties,
            line_width: 1.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }
}

impl<P: PairSource> Track for ArcTrack<P> {
    fn properties(&self) -> &TrackProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut TrackProperties {
        &mut self.properties
    }

    fn validate(&self) -> Result<(), TrackPlotError> {
        self.properties.validate()?;
        if !(self.line_width > 0.0) {
            return Err(TrackPlotError::InvalidTrackOption {
                track: self.name().to_string(),
                reason: format!("line_width must be positive, got {}", self.line_width),
            });
        }
        Ok(())
    }

    fn fetch(&self, interval: &GenomicInterval) -> Result<TrackData, TrackPlotError> {
        if !self.source.has_chrom(interval.chrom()) {
            return Err(data_unavailable(self.name(), interval));
        }
        let mut pairs = self.source.query(interval)?;
        pairs.sort_by_key(|p| p.span());
        Ok(TrackData::Arcs(pairs))
    }

    fn draw(
        &self,
        interval: &GenomicInterval,
        data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        let TrackData::Arcs(pairs) = data else {
            return Ok(());
        };
        let window = interval.width() as f64;
        let inverted = self.properties.inverted;
        for pair in pairs {
            let mid1 = pair.start1 + (pair.end1 - pair.start1) / 2;
            let mid2 = pair.start2 + (pair.end2 - pair.start2) / 2;
            let (left, right) = if mid1 <= mid2 { (mid1, mid2) } else { (mid2, mid1) };
            let x1 = panel.x(left);
            let x2 = panel.x(right);
            // apex height scales with the arc's span relative to the window
            let apex_frac = ((right - left) as f64 / window).clamp(0.05, 1.0);
            let (y_base, y_apex) = if inverted {
                (panel.y(0.0), panel.y(apex_frac))
            } else {
                (panel.y(1.0), panel.y(1.0 - apex_frac))
            };
            // quadratic Bezier; the control point overshoots so the curve
            // itself peaks at y_apex
            let control_y = y_base + 2.0 * (y_apex - y_base);
            let d = format!(
                "M {} {} Q {} {} {} {}",
                crate::render::svg::px(x1),
                crate::render::svg::px(y_base),
                crate::render::svg::px((x1 + x2) / 2.0),
                crate::render::svg::px(control_y),
                crate::render::svg::px(x2),
                crate::render::svg::px(y_base),
            );
            panel.path(&d, &self.properties.color, self.line_width);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{AnchorPair, MemoryPairs};
    use indexmap::IndexMap;

    fn seqlens() -> IndexMap<String, crate::Position> {
        std::iter::once(("chr1".to_string(), 10_000)).collect()
    }

    fn track(pairs: Vec<AnchorPair>) -> ArcTrack<MemoryPairs> {
        let records = pairs.into_iter().map(|p| ("chr1".to_string(), p));
        ArcTrack::new(MemoryPairs::new(seqlens(), records).unwrap())
    }

    #[test]
    fn test_fetch_orders_by_span() {
        let track = track(vec![
            AnchorPair::new(500, 600, 900, 1000),
            AnchorPair::new(0, 100, 400, 500),
        ]);
        let iv = GenomicInterval::new("chr1", 0, 10_000).unwrap();
        let TrackData::Arcs(pairs) = track.fetch(&iv).unwrap() else {
            panic!("expected arcs");
        };
        assert_eq!(pairs[0].start1, 0);
        assert_eq!(pairs[1].start1, 500);
    }

    #[test]
    fn test_pairs_outside_window_skipped() {
        let track = track(vec![AnchorPair::new(0, 10, 90, 100)]);
        let iv = GenomicInterval::new("chr1", 5000, 6000).unwrap();
        let TrackData::Arcs(pairs) = track.fetch(&iv).unwrap() else {
            panic!("expected arcs");
        };
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_inverted_flips_direction() {
        let mut t = track(vec![AnchorPair::new(100, 200, 800, 900)]);
        let iv = GenomicInterval::new("chr1", 0, 1000).unwrap();
        let data = t.fetch(&iv).unwrap();

        let mut up = Panel::new(0.0, 0.0, 100.0, 50.0, iv.clone());
        t.draw(&iv, &data, &mut up).unwrap();
        t.properties_mut().inverted = true;
        let mut down = Panel::new(0.0, 0.0, 100.0, 50.0, iv.clone());
        t.draw(&iv, &data, &mut down).unwrap();
        assert_ne!(up.into_svg_group("a"), down.into_svg_group("a"));
    }
}
