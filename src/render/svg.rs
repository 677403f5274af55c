//! Deterministic SVG compositing: the [`Panel`] drawing surface handed to
//! each track, and the final document assembly.
//!
//! The artifact is a hand-assembled SVG string rather than a raster buffer:
//! identical (frame, interval) inputs must produce byte-identical output,
//! which string assembly with fixed float formatting gives directly.

use std::fmt::Write;

use crate::{interval::GenomicInterval, Position};

/// Fixed-precision float formatting so output bytes never depend on float
/// noise accumulated differently across runs.
pub(crate) fn px(v: f64) -> String {
    format!("{:.2}", v)
}

/// YlOrRd-style three-stop color ramp for matrix cells; `t` in `[0, 1]`.
pub(crate) fn heat_color(t: f64) -> String {
    const STOPS: [(f64, f64, f64); 3] = [
        (255.0, 255.0, 204.0),
        (253.0, 141.0, 60.0),
        (128.0, 0.0, 38.0),
    ];
    let t = t.clamp(0.0, 1.0);
    let (lo, hi, f) = if t < 0.5 {
        (STOPS[0], STOPS[1], t * 2.0)
    } else {
        (STOPS[1], STOPS[2], (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * f).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        lerp(lo.0, hi.0),
        lerp(lo.1, hi.1),
        lerp(lo.2, hi.2)
    )
}

/// The rectangular sub-region of the figure allocated to one track row.
///
/// A [`Panel`] owns the genomic-x to pixel mapping for the shared window
/// and accumulates SVG fragments; the renderer composites panels in track
/// order. All pixel coordinates are absolute within the final document.
pub struct Panel {
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
    interval: GenomicInterval,
    body: String,
}

impl Panel {
    pub(crate) fn new(
        x0: f64,
        y0: f64,
        width: f64,
        height: f64,
        interval: GenomicInterval,
    ) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
            interval,
            body: String::new(),
        }
    }

    /// The shared genomic window this panel is mapped to.
    pub fn interval(&self) -> &GenomicInterval {
        &self.interval
    }

    /// Panel width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Panel height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Map a genomic position to an absolute x pixel coordinate, clamped
    /// to the panel's horizontal extent.
    pub fn x(&self, pos: Position) -> f64 {
        let span = self.interval.width() as f64;
        let frac = (pos as f64 - self.interval.start() as f64) / span;
        self.x0 + frac.clamp(0.0, 1.0) * self.width
    }

    /// Map a vertical fraction (0 = top of panel, 1 = bottom) to an
    /// absolute y pixel coordinate.
    pub fn y(&self, frac: f64) -> f64 {
        self.y0 + frac.clamp(0.0, 1.0) * self.height
    }

    /// Map a data value within `[min, max]` to a y coordinate; values grow
    /// upward unless `inverted`.
    pub fn y_value(&self, value: f64, min: f64, max: f64, inverted: bool) -> f64 {
        let span = max - min;
        let frac = if span > 0.0 {
            ((value - min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        if inverted {
            self.y(frac)
        } else {
            self.y(1.0 - frac)
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        writeln!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            px(x),
            px(y),
            px(w.max(0.0)),
            px(h.max(0.0)),
            fill
        )
        .expect("write to String cannot fail");
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        writeln!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            px(x1),
            px(y1),
            px(x2),
            px(y2),
            stroke,
            px(width)
        )
        .expect("write to String cannot fail");
    }

    /// Filled polygon from `(x, y)` pixel vertices.
    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str) {
        let mut coords = String::new();
        for (x, y) in points {
            if !coords.is_empty() {
                coords.push(' ');
            }
            write!(coords, "{},{}", px(*x), px(*y)).expect("write to String cannot fail");
        }
        writeln!(self.body, r#"<polygon points="{}" fill="{}"/>"#, coords, fill)
            .expect("write to String cannot fail");
    }

    /// Stroked path from raw path data.
    pub fn path(&mut self, d: &str, stroke: &str, width: f64) {
        writeln!(
            self.body,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            d,
            stroke,
            px(width)
        )
        .expect("write to String cannot fail");
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, anchor: &str, content: &str) {
        writeln!(
            self.body,
            r#"<text x="{}" y="{}" font-size="{}" text-anchor="{}" font-family="sans-serif">{}</text>"#,
            px(x),
            px(y),
            px(size),
            anchor,
            escape_text(content)
        )
        .expect("write to String cannot fail");
    }

    /// Draw the track title along the right margin, vertically centered.
    pub fn title(&mut self, text: &str) {
        if !text.is_empty() {
            self.text(self.x0 + self.width + 4.0, self.y(0.5), 10.0, "start", text);
        }
    }

    /// Fill the panel with the "no data" placeholder.
    pub fn placeholder(&mut self, label: &str) {
        self.rect(self.x0, self.y0, self.width, self.height, "#f5f5f5");
        self.text(
            self.x0 + self.width / 2.0,
            self.y(0.5),
            10.0,
            "middle",
            label,
        );
    }

    pub(crate) fn into_svg_group(self, name: &str) -> String {
        format!(
            "<g data-track=\"{}\">\n{}</g>\n",
            escape_text(name),
            self.body
        )
    }
}

// Escapes attribute context too, since track names land in `data-track="…"`.
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Assemble the final SVG document from composited panel groups.
pub(crate) fn document(width: f64, height: f64, groups: &[String]) -> String {
    let mut out = String::new();
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        px(width),
        px(height),
        px(width),
        px(height)
    )
    .expect("write to String cannot fail");
    writeln!(
        out,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        px(width),
        px(height),
        "#ffffff"
    )
    .expect("write to String cannot fail");
    for group in groups {
        out.push_str(group);
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_panel() -> Panel {
        let iv = GenomicInterval::new("chr1", 100, 200).unwrap();
        Panel::new(10.0, 20.0, 100.0, 50.0, iv)
    }

    #[test]
    fn test_x_mapping() {
        let panel = test_panel();
        assert_eq!(panel.x(100), 10.0);
        assert_eq!(panel.x(150), 60.0);
        assert_eq!(panel.x(200), 110.0);
        // clamped outside the window
        assert_eq!(panel.x(50), 10.0);
        assert_eq!(panel.x(500), 110.0);
    }

    #[test]
    fn test_y_value_inversion() {
        let panel = test_panel();
        let top = panel.y_value(10.0, 0.0, 10.0, false);
        let bottom = panel.y_value(10.0, 0.0, 10.0, true);
        assert_eq!(top, 20.0);
        assert_eq!(bottom, 70.0);
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0.0), "#ffffcc");
        assert_eq!(heat_color(1.0), "#800026");
    }

    #[test]
    fn test_document_background() {
        let doc = document(100.0, 50.0, &[]);
        assert!(doc.contains(r##"<rect x="0" y="0" width="100.00" height="50.00" fill="#ffffff"/>"##));
    }

    #[test]
    fn test_quoted_track_name_escaped() {
        let panel = test_panel();
        let group = panel.into_svg_group(r#"my "favorite" track"#);
        assert!(group.starts_with("<g data-track=\"my &quot;favorite&quot; track\">"));
    }

    #[test]
    fn test_fragments_deterministic() {
        let build = || {
            let mut panel = test_panel();
            panel.rect(0.0, 0.0, 10.0, 5.0, "#808080");
            panel.line(0.0, 0.0, 1.0, 1.0, "#000000", 0.5);
            panel.into_svg_group("t")
        };
        assert_eq!(build(), build());
    }
}
