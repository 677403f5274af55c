//! The coordinate-ruler track.

use crate::{
    error::TrackPlotError,
    interval::GenomicInterval,
    render::Panel,
    track::{Track, TrackData, TrackProperties},
    Position,
};

const AXIS_HEIGHT: f64 = 2.0;
const AXIS_COLOR: &str = "#000000";

/// Pick a round tick step (1/2/5 × 10^k) giving roughly `target` ticks
/// across `span` basepairs.
pub fn tick_step(span: Position, target: usize) -> Position {
    let raw = (span as f64 / target.max(1) as f64).max(1.0);
    let mag = 10f64.powf(raw.log10().floor());
    let ratio = raw / mag;
    let step = if ratio <= 1.0 {
        mag
    } else if ratio <= 2.0 {
        2.0 * mag
    } else if ratio <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };
    step as Position
}

fn format_bp(pos: Position) -> String {
    if pos >= 1_000_000 && pos % 100_000 == 0 {
        format!("{:.1} Mb", pos as f64 / 1_000_000.0)
    } else if pos >= 1_000 && pos % 100 == 0 {
        format!("{:.1} kb", pos as f64 / 1_000.0)
    } else {
        format!("{} bp", pos)
    }
}

/// An x-axis ruler: a baseline with labeled ticks at round positions.
/// Fetches nothing; its drawing is a pure function of the window.
pub struct XAxisTrack {
    properties: TrackProperties,
    target_ticks: usize,
}

impl XAxisTrack {
    pub fn new() -> Self {
        let mut properties = TrackProperties::new("x-axis");
        properties.height = AXIS_HEIGHT;
        properties.color = AXIS_COLOR.to_string();
        Self {
            properties,
            target_ticks: 5,
        }
    }
}

impl Default for XAxisTrack {
    fn default() -> Self {
        Self::new()
    }
}

impl Track for XAxisTrack {
    fn properties(&self) -> &TrackProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut TrackProperties {
        &mut self.properties
    }

    fn fetch(&self, _interval: &GenomicInterval) -> Result<TrackData, TrackPlotError> {
        Ok(TrackData::Empty)
    }

    fn draw(
        &self,
        interval: &GenomicInterval,
        _data: &TrackData,
        panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        let y_line = panel.y(0.3);
        panel.line(
            panel.x(interval.start()),
            y_line,
            panel.x(interval.end()),
            y_line,
            &self.properties.color,
            1.0,
        );
        let step = tick_step(interval.width(), self.target_ticks);
        let mut tick = interval.start().div_ceil(step) * step;
        while tick <= interval.end() {
            let x = panel.x(tick);
            panel.line(x, y_line, x, panel.y(0.55), &self.properties.color, 1.0);
            panel.text(x, panel.y(0.95), panel.height() * 0.45, "middle", &format_bp(tick));
            tick = match tick.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_step_round_values() {
        assert_eq!(tick_step(2_000_000, 5), 500_000);
        assert_eq!(tick_step(1_000, 5), 200);
        assert_eq!(tick_step(10, 5), 2);
    }

    #[test]
    fn test_format_bp() {
        assert_eq!(format_bp(4_500_000), "4.5 Mb");
        assert_eq!(format_bp(2_500), "2.5 kb");
        assert_eq!(format_bp(137), "137 bp");
    }

    #[test]
    fn test_axis_draws_without_data() {
        let track = XAxisTrack::new();
        let iv = GenomicInterval::new("chr1", 0, 1000).unwrap();
        let mut panel = Panel::new(0.0, 0.0, 200.0, 20.0, iv.clone());
        track.draw(&iv, &TrackData::Empty, &mut panel).unwrap();
        let svg = panel.into_svg_group("x-axis");
        assert!(svg.contains("<line"));
        assert!(svg.contains("bp</text>") || svg.contains("kb</text>"));
    }
}
