//! The shared-coordinate rendering pipeline: vertical layout, per-track
//! panel allocation, and SVG compositing.

pub mod svg;

pub use svg::Panel;

use crate::{
    compose::Frame,
    error::TrackPlotError,
    genome::Genome,
    interval::GenomicInterval,
};

/// Pixels per layout unit (track heights and widths are given in
/// centimeter-like layout units).
pub const UNITS_TO_PX: f64 = 28.5;

/// Fraction of the figure width given to the plot area; the remainder is
/// the right-hand label gutter.
const PLOT_WIDTH_FRACTION: f64 = 0.85;

/// The vertical slot one track row occupies, in layout units.
#[derive(Clone, Debug, PartialEq)]
pub struct RowLayout {
    pub name: String,
    pub y_offset: f64,
    pub height: f64,
}

/// A finished render: the SVG document plus the layout that produced it.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    svg: String,
    /// Figure width in layout units.
    pub width: f64,
    /// Figure height in layout units; equals the margins plus the sum of
    /// row heights and inter-track spacing.
    pub height: f64,
    pub rows: Vec<RowLayout>,
    pub interval: GenomicInterval,
}

impl RenderedFrame {
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Write the SVG document to `path`.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), TrackPlotError> {
        std::fs::write(path, &self.svg)?;
        Ok(())
    }
}

/// Walks a frame's tracks for a genomic window: clamps the window against
/// the genome, computes the stacked layout, has every track fetch and draw
/// into its allocated panel, and composites the result into one document.
///
/// Rendering is deterministic: identical (frame, interval) inputs over
/// identical sources yield byte-identical SVG.
pub struct Renderer {
    genome: Genome,
    units_to_px: f64,
}

impl Renderer {
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            units_to_px: UNITS_TO_PX,
        }
    }

    pub fn with_scale(mut self, units_to_px: f64) -> Self {
        self.units_to_px = units_to_px;
        self
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Render `frame` for `interval`.
    ///
    /// Per-track recoverable data errors become "no data" placeholder
    /// panels; configuration errors abort with the offending track named
    /// in the error chain.
    pub fn render(
        &self,
        frame: &Frame,
        interval: &GenomicInterval,
    ) -> Result<RenderedFrame, TrackPlotError> {
        let interval = self.genome.clamp(interval)?;

        let margin = frame.properties().margin();
        let spacing = frame.properties().track_spacing();
        let width = frame.properties().width();

        // vertical layout, in units
        let mut rows = Vec::with_capacity(frame.len());
        let mut y = margin;
        for (i, track) in frame.tracks().enumerate() {
            if i > 0 {
                y += spacing;
            }
            let height = track.size_hint().height;
            rows.push(RowLayout {
                name: track.name().to_string(),
                y_offset: y,
                height,
            });
            y += height;
        }
        let total_height = y + margin;

        let scale = self.units_to_px;
        let plot_width_px = width * PLOT_WIDTH_FRACTION * scale;
        let mut groups = Vec::with_capacity(rows.len());
        for (track, row) in frame.tracks().zip(&rows) {
            let mut panel = Panel::new(
                0.0,
                row.y_offset * scale,
                plot_width_px,
                row.height * scale,
                interval.clone(),
            );
            match track.fetch(&interval) {
                Ok(data) => {
                    track
                        .draw(&interval, &data, &mut panel)
                        .map_err(|e| TrackPlotError::TrackRenderError {
                            track: track.name().to_string(),
                            interval: interval.to_string(),
                            source: Box::new(e),
                        })?;
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("substituting placeholder panel: {}", e);
                    panel.placeholder("no data");
                }
                Err(e) => {
                    return Err(TrackPlotError::TrackRenderError {
                        track: track.name().to_string(),
                        interval: interval.to_string(),
                        source: Box::new(e),
                    });
                }
            }
            panel.title(&track.properties().title);
            groups.push(panel.into_svg_group(track.name()));
        }

        let svg = svg::document(width * scale, total_height * scale, &groups);
        Ok(RenderedFrame {
            svg,
            width,
            height: total_height,
            rows,
            interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Decorator, FrameBuilder};
    use crate::sources::{MemorySignal, SignalSample};
    use crate::track::{SignalTrack, SpacerTrack, XAxisTrack};
    use indexmap::IndexMap;

    fn genome() -> Genome {
        Genome::from_pairs([("chr1", 10_000u32), ("chr2", 5_000)])
    }

    fn chr1_signal() -> MemorySignal {
        let seqlens: IndexMap<String, u32> = std::iter::once(("chr1".to_string(), 10_000)).collect();
        MemorySignal::new(
            seqlens,
            [
                ("chr1".to_string(), SignalSample { start: 0, end: 5_000, value: 1.0 }),
                ("chr1".to_string(), SignalSample { start: 5_000, end: 10_000, value: 3.0 }),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_render_deterministic() {
        let frame = (XAxisTrack::new()
            + SignalTrack::new(chr1_signal()).with_number_of_bins(10)
            + Decorator::Title("signal".to_string()))
        .build()
        .unwrap();
        let renderer = Renderer::new(genome());
        let iv = GenomicInterval::new("chr1", 0, 10_000).unwrap();
        let first = renderer.render(&frame, &iv).unwrap();
        let second = renderer.render(&frame, &iv).unwrap();
        assert_eq!(first.svg(), second.svg());
    }

    #[test]
    fn test_layout_heights_sum() {
        let frame = (SpacerTrack::new(5.0) + SpacerTrack::new(0.5) + SpacerTrack::new(10.0))
            .build()
            .unwrap();
        let renderer = Renderer::new(genome());
        let iv = GenomicInterval::new("chr1", 0, 1_000).unwrap();
        let rendered = renderer.render(&frame, &iv).unwrap();
        assert_eq!(rendered.height, 15.5);
        assert_eq!(rendered.rows[0].height, 5.0);
        assert_eq!(rendered.rows[1].y_offset, 5.0);
        assert_eq!(rendered.rows[2].y_offset, 5.5);
        assert_eq!(rendered.rows[2].height, 10.0);
    }

    #[test]
    fn test_layout_with_spacing_and_margin() {
        let frame = (SpacerTrack::new(2.0)
            + SpacerTrack::new(3.0)
            + FrameBuilder::new().with_track_spacing(0.25).with_margin(1.0))
        .build()
        .unwrap();
        let renderer = Renderer::new(genome());
        let iv = GenomicInterval::new("chr1", 0, 1_000).unwrap();
        let rendered = renderer.render(&frame, &iv).unwrap();
        // 1.0 + 2.0 + 0.25 + 3.0 + 1.0
        assert_eq!(rendered.height, 7.25);
        assert_eq!(rendered.rows[1].y_offset, 3.25);
    }

    #[test]
    fn test_wrong_chromosome_renders_placeholder() {
        // the signal source only knows chr1; chr2 is a valid genome
        // chromosome, so the track falls back to a placeholder panel
        let frame = FrameBuilder::new()
            .push(SignalTrack::new(chr1_signal()))
            .build()
            .unwrap();
        let renderer = Renderer::new(genome());
        let iv = GenomicInterval::new("chr2", 0, 1_000).unwrap();
        let rendered = renderer.render(&frame, &iv).unwrap();
        assert!(rendered.svg().contains("no data"));
    }

    #[test]
    fn test_unknown_chromosome_is_fatal() {
        let frame = (SpacerTrack::new(1.0) + SpacerTrack::new(1.0)).build().unwrap();
        let renderer = Renderer::new(genome());
        let iv = GenomicInterval::new("chrMT", 0, 1_000).unwrap();
        assert!(matches!(
            renderer.render(&frame, &iv),
            Err(TrackPlotError::UnknownChromosome(_))
        ));
    }

    #[test]
    fn test_out_of_bounds_interval_clamped() {
        let frame = (XAxisTrack::new() + SpacerTrack::new(1.0)).build().unwrap();
        let renderer = Renderer::new(genome());
        let iv = GenomicInterval::new("chr2", 4_000, 9_999).unwrap();
        let rendered = renderer.render(&frame, &iv).unwrap();
        assert_eq!(rendered.interval, GenomicInterval::new("chr2", 4_000, 5_000).unwrap());
    }

    #[test]
    fn test_save_artifact() {
        let frame = (XAxisTrack::new() + SpacerTrack::new(1.0)).build().unwrap();
        let renderer = Renderer::new(genome());
        let iv = GenomicInterval::new("chr1", 0, 1_000).unwrap();
        let rendered = renderer.render(&frame, &iv).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.svg");
        rendered.save(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, rendered.svg());
    }
}
