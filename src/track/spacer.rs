//! The spacer track: an empty row used to separate two tracks.

use crate::{
    error::TrackPlotError,
    interval::GenomicInterval,
    render::Panel,
    track::{Track, TrackData, TrackProperties},
};

const SPACER_HEIGHT: f64 = 1.0;

/// An empty row of configured height. It has no data and draws nothing;
/// it only occupies vertical space in the layout.
pub struct SpacerTrack {
    properties: TrackProperties,
}

impl SpacerTrack {
    pub fn new(height: f64) -> Self {
        let mut properties = TrackProperties::new("spacer");
        properties.height = height;
        Self { properties }
    }
}

impl Default for SpacerTrack {
    fn default() -> Self {
        Self::new(SPACER_HEIGHT)
    }
}

impl Track for SpacerTrack {
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
        _interval: &GenomicInterval,
        _data: &TrackData,
        _panel: &mut Panel,
    ) -> Result<(), TrackPlotError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacer_height() {
        let spacer = SpacerTrack::new(0.5);
        assert_eq!(spacer.size_hint().height, 0.5);
        assert_eq!(SpacerTrack::default().size_hint().height, SPACER_HEIGHT);
    }
}
