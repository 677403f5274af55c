//! The interactive browsing session: current locus, navigation commands,
//! and re-render triggering.
//!
//! A [`Browser`] owns the composed [`Frame`] and the current interval, and
//! is the only thing that mutates the interval. Navigation is cooperative
//! and single-threaded: each operation renders synchronously and pushes
//! the artifact to the injected [`FrameSink`]. Rapid repeated events are
//! coalesced last-one-wins through [`Browser::post`]; commands that are
//! superseded before they are processed are never rendered.

use crate::{
    compose::Frame,
    error::TrackPlotError,
    genome::Genome,
    interval::GenomicInterval,
    render::{RenderedFrame, Renderer},
};

/// Where rendered frames go: the display collaborator (notebook widget,
/// file writer, test recorder). Injected, never hard-wired.
pub trait FrameSink {
    fn show(&mut self, rendered: &RenderedFrame);
}

/// A sink that discards output, for headless use.
#[derive(Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn show(&mut self, _rendered: &RenderedFrame) {}
}

/// A navigation command over the current interval.
#[derive(Clone, Debug, PartialEq)]
pub enum NavCommand {
    /// Jump to an interval (clamped against the genome).
    Goto(GenomicInterval),
    /// Shift by a fraction of the current width; negative is leftward.
    Pan(f64),
    /// Scale the width around the center; `factor < 1` zooms in.
    Zoom(f64),
}

/// The browsing session's render status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserState {
    Idle,
    Rendering,
}

/// An interactive browsing session over one frame.
pub struct Browser<S: FrameSink> {
    frame: Frame,
    renderer: Renderer,
    current: GenomicInterval,
    state: BrowserState,
    pending: Option<NavCommand>,
    sink: S,
}

impl<S: FrameSink> Browser<S> {
    /// Create a session positioned at `initial`. The initial interval is
    /// validated against the genome immediately; an unknown chromosome is
    /// a construction error.
    pub fn new(
        frame: Frame,
        genome: Genome,
        initial: GenomicInterval,
        sink: S,
    ) -> Result<Self, TrackPlotError> {
        let renderer = Renderer::new(genome);
        let current = renderer.genome().clamp(&initial)?;
        Ok(Self {
            frame,
            renderer,
            current,
            state: BrowserState::Idle,
            pending: None,
            sink,
        })
    }

    pub fn interval(&self) -> &GenomicInterval {
        &self.current
    }

    pub fn state(&self) -> BrowserState {
        self.state
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Render the current state and push it to the sink.
    pub fn show(&mut self) -> Result<(), TrackPlotError> {
        self.navigate(NavCommand::Goto(self.current.clone()))
    }

    /// Jump to `interval` and re-render.
    pub fn goto(&mut self, interval: GenomicInterval) -> Result<(), TrackPlotError> {
        self.navigate(NavCommand::Goto(interval))
    }

    /// Jump to a locus given as text: either `"chrom:start-end"` or a bare
    /// chromosome name (the full chromosome).
    pub fn goto_locus(&mut self, locus: &str) -> Result<(), TrackPlotError> {
        let interval = if locus.contains(':') {
            locus.parse()?
        } else {
            self.renderer.genome().full_chromosome(locus)?
        };
        self.goto(interval)
    }

    /// Shift the view by `fraction` of its width and re-render; the view
    /// never leaves the chromosome.
    pub fn pan(&mut self, fraction: f64) -> Result<(), TrackPlotError> {
        self.navigate(NavCommand::Pan(fraction))
    }

    /// Scale the view width by `factor` around its center and re-render.
    pub fn zoom(&mut self, factor: f64) -> Result<(), TrackPlotError> {
        self.navigate(NavCommand::Zoom(factor))
    }

    /// Queue a command without rendering. Posting replaces any previously
    /// queued command (last-one-wins), so rapid repeated events collapse
    /// to a single render once [`Browser::process_pending`] runs.
    pub fn post(&mut self, command: NavCommand) {
        if let Some(superseded) = self.pending.replace(command) {
            log::debug!("navigation command superseded before render: {:?}", superseded);
        }
    }

    /// Apply the latest queued command, if any. Returns whether a render
    /// happened.
    pub fn process_pending(&mut self) -> Result<bool, TrackPlotError> {
        match self.pending.take() {
            Some(command) => {
                self.navigate(command)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn navigate(&mut self, command: NavCommand) -> Result<(), TrackPlotError> {
        if self.state == BrowserState::Rendering {
            // re-entrant request during an in-flight render: coalesce
            self.post(command);
            return Ok(());
        }
        let mut next = Some(command);
        while let Some(command) = next.take() {
            let target = self.resolve(command)?;
            log::debug!("rendering {}", target);
            self.state = BrowserState::Rendering;
            let result = self.renderer.render(&self.frame, &target);
            self.state = BrowserState::Idle;
            let rendered = result?;
            self.current = rendered.interval.clone();
            self.sink.show(&rendered);
            // anything queued while rendering/displaying runs now
            next = self.pending.take();
        }
        Ok(())
    }

    /// Turn a command into the target interval, validated against the
    /// genome. Failures leave the current interval untouched.
    fn resolve(&self, command: NavCommand) -> Result<GenomicInterval, TrackPlotError> {
        match command {
            NavCommand::Goto(interval) => self.renderer.genome().clamp(&interval),
            NavCommand::Pan(fraction) => {
                let len = self.renderer.genome().chrom_len(self.current.chrom())?;
                Ok(self.current.pan(fraction, len))
            }
            NavCommand::Zoom(factor) => {
                let len = self.renderer.genome().chrom_len(self.current.chrom())?;
                Ok(self.current.zoom(factor, len))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{SpacerTrack, XAxisTrack};

    /// Records every interval pushed to the display.
    #[derive(Default)]
    struct RecordingSink {
        shown: Vec<GenomicInterval>,
    }

    impl FrameSink for RecordingSink {
        fn show(&mut self, rendered: &RenderedFrame) {
            self.shown.push(rendered.interval.clone());
        }
    }

    fn test_browser() -> Browser<RecordingSink> {
        let frame = (XAxisTrack::new() + SpacerTrack::new(1.0)).build().unwrap();
        let genome = Genome::from_pairs([("chr9", 141_000_000u32), ("chr1", 1_000_000)]);
        let initial = GenomicInterval::new("chr9", 4_000_000, 6_000_000).unwrap();
        Browser::new(frame, genome, initial, RecordingSink::default()).unwrap()
    }

    #[test]
    fn test_show_pushes_current_interval() {
        let mut browser = test_browser();
        browser.show().unwrap();
        assert_eq!(browser.sink().shown.len(), 1);
        assert_eq!(browser.sink().shown[0], *browser.interval());
    }

    #[test]
    fn test_zoom_in_centers() {
        let mut browser = test_browser();
        browser.zoom(0.5).unwrap();
        assert_eq!(
            *browser.interval(),
            GenomicInterval::new("chr9", 4_500_000, 5_500_000).unwrap()
        );
    }

    #[test]
    fn test_zoom_roundtrip_restores_interval() {
        let mut browser = test_browser();
        let original = browser.interval().clone();
        browser.zoom(0.5).unwrap();
        browser.zoom(2.0).unwrap();
        assert_eq!(*browser.interval(), original);
    }

    #[test]
    fn test_pan_stays_in_bounds() {
        let mut browser = test_browser();
        browser.pan(-100.0).unwrap();
        assert_eq!(browser.interval().start(), 0);
        assert_eq!(browser.interval().width(), 2_000_000);
        browser.pan(1_000.0).unwrap();
        assert_eq!(browser.interval().end(), 141_000_000);
    }

    #[test]
    fn test_goto_locus_text() {
        let mut browser = test_browser();
        browser.goto_locus("chr1:1,000-2,000").unwrap();
        assert_eq!(
            *browser.interval(),
            GenomicInterval::new("chr1", 1_000, 2_000).unwrap()
        );
        browser.goto_locus("chr1").unwrap();
        assert_eq!(
            *browser.interval(),
            GenomicInterval::new("chr1", 0, 1_000_000).unwrap()
        );
    }

    #[test]
    fn test_goto_unknown_chromosome_keeps_interval() {
        let mut browser = test_browser();
        let before = browser.interval().clone();
        let err = browser
            .goto(GenomicInterval::new("chrNope", 0, 100).unwrap())
            .unwrap_err();
        assert!(matches!(err, TrackPlotError::UnknownChromosome(_)));
        assert_eq!(*browser.interval(), before);
        assert_eq!(browser.state(), BrowserState::Idle);
    }

    #[test]
    fn test_posted_commands_coalesce() {
        let mut browser = test_browser();
        browser.post(NavCommand::Zoom(0.1));
        browser.post(NavCommand::Pan(0.5));
        browser.post(NavCommand::Zoom(0.5));
        // only the latest command is applied, and only one frame is shown
        assert!(browser.process_pending().unwrap());
        assert_eq!(browser.sink().shown.len(), 1);
        assert_eq!(
            *browser.interval(),
            GenomicInterval::new("chr9", 4_500_000, 5_500_000).unwrap()
        );
        // nothing left queued
        assert!(!browser.process_pending().unwrap());
    }

    #[test]
    fn test_initial_interval_validated() {
        let frame = (XAxisTrack::new() + SpacerTrack::new(1.0)).build().unwrap();
        let genome = Genome::from_pairs([("chr1", 1_000u32)]);
        let bad = GenomicInterval::new("chr7", 0, 100).unwrap();
        assert!(Browser::new(frame, genome, bad, NullSink).is_err());
    }
}
