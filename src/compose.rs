//! Frame composition: the `+` algebra over tracks, decorators, and frames.
//!
//! Composition accumulates an element sequence in a [`FrameBuilder`];
//! nothing is interpreted until [`FrameBuilder::build`]. That split is what
//! makes the operator associative by construction: `(a + b) + c` and
//! `a + (b + c)` produce the same element sequence, and decorator
//! absorption runs exactly once over that sequence. `build` is also the
//! single fallible point, where a decorator with no preceding track and
//! invalid option values are rejected.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::{
    error::TrackPlotError,
    sources::{FeatureSource, MatrixSource, PairSource, SignalSource},
    track::{
        AnnotationTrack, ArcTrack, CoverageTrack, MatrixTrack, ProfileTrack, SignalTrack,
        SpacerTrack, Track, TrackProperties, XAxisTrack,
    },
};

/// A composition element that modifies the preceding track's properties
/// instead of adding a new row.
#[derive(Clone, Debug, PartialEq)]
pub enum Decorator {
    /// Set the track's margin label.
    Title(String),
    /// Override the track's row height.
    TrackHeight(f64),
    /// Flip the track's value axis (arcs open downward, signal hangs
    /// from the top).
    Inverted,
    /// Override the track's color.
    Color(String),
}

impl Decorator {
    /// Apply this decorator's effect to a track's property set.
    pub fn apply(&self, properties: &mut TrackProperties) {
        match self {
            Decorator::Title(title) => properties.title = title.clone(),
            Decorator::TrackHeight(height) => properties.height = *height,
            Decorator::Inverted => properties.inverted = true,
            Decorator::Color(color) => properties.color = color.clone(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Decorator::Title(_) => "Title",
            Decorator::TrackHeight(_) => "TrackHeight",
            Decorator::Inverted => "Inverted",
            Decorator::Color(_) => "Color",
        }
    }
}

/// One element of a composition sequence.
pub enum Element {
    Track(Box<dyn Track>),
    Decorator(Decorator),
    Frame(Frame),
}

impl From<Decorator> for Element {
    fn from(value: Decorator) -> Self {
        Element::Decorator(value)
    }
}

impl From<Frame> for Element {
    fn from(value: Frame) -> Self {
        Element::Frame(value)
    }
}

impl From<Box<dyn Track>> for Element {
    fn from(value: Box<dyn Track>) -> Self {
        Element::Track(value)
    }
}

/// Shared frame layout configuration, in layout units. Unset keys fall
/// back to defaults at render time; merging two frames keeps the left
/// frame's setting for any key both define.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameProperties {
    width: Option<f64>,
    track_spacing: Option<f64>,
    margin: Option<f64>,
}

impl FrameProperties {
    /// Default figure width in layout units.
    pub const DEFAULT_WIDTH: f64 = 40.0;
    pub const DEFAULT_TRACK_SPACING: f64 = 0.0;
    pub const DEFAULT_MARGIN: f64 = 0.0;

    pub fn width(&self) -> f64 {
        self.width.unwrap_or(Self::DEFAULT_WIDTH)
    }

    pub fn track_spacing(&self) -> f64 {
        self.track_spacing.unwrap_or(Self::DEFAULT_TRACK_SPACING)
    }

    pub fn margin(&self) -> f64 {
        self.margin.unwrap_or(Self::DEFAULT_MARGIN)
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = Some(width);
    }

    pub fn set_track_spacing(&mut self, spacing: f64) {
        self.track_spacing = Some(spacing);
    }

    pub fn set_margin(&mut self, margin: f64) {
        self.margin = Some(margin);
    }

    /// Fill unset keys from `other`; set keys (the left operand's) win.
    fn absorb(&mut self, other: &FrameProperties) {
        self.width = self.width.or(other.width);
        self.track_spacing = self.track_spacing.or(other.track_spacing);
        self.margin = self.margin.or(other.margin);
    }

    fn validate(&self) -> Result<(), TrackPlotError> {
        if let Some(width) = self.width {
            if !(width > 0.0) {
                return Err(TrackPlotError::InvalidTrackOption {
                    track: "frame".to_string(),
                    reason: format!("width must be positive, got {width}"),
                });
            }
        }
        Ok(())
    }
}

/// An accumulated, not-yet-validated composition sequence.
#[derive(Default)]
pub struct FrameBuilder {
    elements: Vec<Element>,
    properties: FrameProperties,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, element: impl Into<Element>) -> Self {
        self.elements.push(element.into());
        self
    }

    fn push_front(mut self, element: impl Into<Element>) -> Self {
        self.elements.insert(0, element.into());
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.properties.set_width(width);
        self
    }

    pub fn with_track_spacing(mut self, spacing: f64) -> Self {
        self.properties.set_track_spacing(spacing);
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.properties.set_margin(margin);
        self
    }

    /// Interpret the element sequence: tracks append rows, a decorator
    /// mutates the preceding track (no new row), a nested frame splices
    /// its rows in place (this builder's properties take precedence).
    pub fn build(self) -> Result<Frame, TrackPlotError> {
        let mut tracks: Vec<Box<dyn Track>> = Vec::new();
        let mut properties = self.properties;
        for element in self.elements {
            match element {
                Element::Track(track) => {
                    track.validate()?;
                    tracks.push(track);
                }
                Element::Decorator(decorator) => match tracks.last_mut() {
                    Some(target) => {
                        decorator.apply(target.properties_mut());
                        target.validate()?;
                    }
                    None => {
                        return Err(TrackPlotError::DecoratorWithoutTarget(
                            decorator.name().to_string(),
                        ));
                    }
                },
                Element::Frame(frame) => {
                    properties.absorb(&frame.properties);
                    tracks.extend(frame.tracks);
                }
            }
        }
        if tracks.is_empty() {
            return Err(TrackPlotError::EmptyFrame);
        }
        properties.validate()?;
        Ok(Frame { tracks, properties })
    }
}

/// An ordered, composed collection of tracks rendered together as one
/// figure. Insertion order is render order, top to bottom. A frame's
/// structure is immutable after [`FrameBuilder::build`]; only the
/// browser's interval changes between renders.
pub struct Frame {
    pub(crate) tracks: Vec<Box<dyn Track>>,
    pub(crate) properties: FrameProperties,
}

impl Frame {
    /// Named form of the `+` operator: combine two composition elements
    /// into a builder.
    pub fn combine(a: impl Into<Element>, b: impl Into<Element>) -> FrameBuilder {
        FrameBuilder::new().push(a).push(b)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn properties(&self) -> &FrameProperties {
        &self.properties
    }

    pub fn tracks(&self) -> impl Iterator<Item = &dyn Track> {
        self.tracks.iter().map(|t| t.as_ref())
    }

    /// The effective properties of each row, in render order. Two frames
    /// composed from re-associated groupings of the same elements compare
    /// equal here.
    pub fn track_properties(&self) -> Vec<&TrackProperties> {
        self.tracks.iter().map(|t| t.properties()).collect()
    }
}

// `Box<dyn Track>` rules out deriving; summarize by row names instead.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field(
                "tracks",
                &self.tracks.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("properties", &self.properties)
            .finish()
    }
}

impl<R: Into<Element>> Add<R> for FrameBuilder {
    type Output = FrameBuilder;

    fn add(self, rhs: R) -> FrameBuilder {
        self.push(rhs)
    }
}

impl Add<FrameBuilder> for FrameBuilder {
    type Output = FrameBuilder;

    fn add(mut self, rhs: FrameBuilder) -> FrameBuilder {
        self.elements.extend(rhs.elements);
        self.properties.absorb(&rhs.properties);
        self
    }
}

// `Add` impls for every element type, so composition can start from any
// element: `track + decorator`, `decorator + builder`, `frame + track`.
macro_rules! impl_element_add {
    ($ty:ty $(, $gen:ident : $bound:path)*) => {
        impl<$($gen: $bound + 'static,)* R: Into<Element>> Add<R> for $ty {
            type Output = FrameBuilder;

            fn add(self, rhs: R) -> FrameBuilder {
                FrameBuilder::new().push(self).push(rhs)
            }
        }

        impl<$($gen: $bound + 'static),*> Add<FrameBuilder> for $ty {
            type Output = FrameBuilder;

            fn add(self, rhs: FrameBuilder) -> FrameBuilder {
                rhs.push_front(self)
            }
        }
    };
}

impl_element_add!(Decorator);
impl_element_add!(Frame);
impl_element_add!(SpacerTrack);
impl_element_add!(XAxisTrack);
impl_element_add!(SignalTrack<S>, S: SignalSource);
impl_element_add!(CoverageTrack<S>, S: SignalSource);
impl_element_add!(AnnotationTrack<S>, S: FeatureSource);
impl_element_add!(ArcTrack<P>, P: PairSource);
impl_element_add!(MatrixTrack<M>, M: MatrixSource);
impl_element_add!(ProfileTrack<M>, M: MatrixSource);

macro_rules! impl_element_from {
    ($ty:ty $(, $gen:ident : $bound:path)*) => {
        impl<$($gen: $bound + 'static),*> From<$ty> for Element {
            fn from(value: $ty) -> Element {
                Element::Track(Box::new(value))
            }
        }
    };
}

impl_element_from!(SpacerTrack);
impl_element_from!(XAxisTrack);
impl_element_from!(SignalTrack<S>, S: SignalSource);
impl_element_from!(CoverageTrack<S>, S: SignalSource);
impl_element_from!(AnnotationTrack<S>, S: FeatureSource);
impl_element_from!(ArcTrack<P>, P: PairSource);
impl_element_from!(MatrixTrack<M>, M: MatrixSource);
impl_element_from!(ProfileTrack<M>, M: MatrixSource);
