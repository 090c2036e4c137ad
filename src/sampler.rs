//! Fixed-rate frame sampling.
//!
//! The sampler stays `Idle` until it holds a media source, a capture surface, and a loaded
//! classifier. From then on it is `Sampling` for the rest of the session. Each tick captures at
//! most one frame and classifies it; anything that goes wrong abandons only that tick.

use tracing::{debug, info, trace, warn};

use crate::classification::ClassificationResult;
use crate::classifier::{Classifier, ClassifierAdapter};
use crate::frame::FrameBuffer;
use crate::source::{FrameSource, ReadyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
}

/// What a single sampling tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A required handle is still missing.
    Idle,
    /// The source had no new frame.
    NoData,
    /// The source will not produce more frames.
    SourceEnded,
    /// Capture or classification failed; the next tick tries again.
    Abandoned,
    Classified(ClassificationResult),
}

pub struct FrameSampler<C, S> {
    source: Option<S>,
    surface: Option<FrameBuffer>,
    classifier: ClassifierAdapter<C>,
    state: SamplerState,
}

impl<C, S> Default for FrameSampler<C, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, S> FrameSampler<C, S> {
    /// A sampler with no handles attached.
    pub fn new() -> Self {
        Self {
            source: None,
            surface: None,
            classifier: ClassifierAdapter::new(),
            state: SamplerState::Idle,
        }
    }

    pub fn attach_source(&mut self, source: S) {
        self.source = Some(source);
    }

    pub fn attach_surface(&mut self, surface: FrameBuffer) {
        self.surface = Some(surface);
    }

    pub fn attach_classifier(&mut self, engine: C) {
        self.classifier.attach(engine);
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_ready()
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    pub fn classifier(&self) -> &ClassifierAdapter<C> {
        &self.classifier
    }

    fn handles_ready(&self) -> bool {
        self.source.is_some() && self.surface.is_some() && self.classifier.is_ready()
    }
}

impl<C: Classifier, S: FrameSource> FrameSampler<C, S> {
    /// Run one sampling tick.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state == SamplerState::Idle {
            if !self.handles_ready() {
                return TickOutcome::Idle;
            }
            info!("frame sampler active");
            self.state = SamplerState::Sampling;
        }

        let (Some(source), Some(surface)) = (self.source.as_mut(), self.surface.as_mut()) else {
            return TickOutcome::Idle;
        };

        match source.ready_state() {
            ReadyState::HaveNothing => return TickOutcome::NoData,
            ReadyState::Ended => return TickOutcome::SourceEnded,
            ReadyState::HaveEnoughData => {}
        }

        let Some((width, height)) = source.dimensions() else {
            return TickOutcome::NoData;
        };
        if surface.resize(width, height) {
            debug!(width, height, "capture surface resized");
        }

        if let Err(err) = source.capture(surface) {
            warn!(error = %err, "frame capture failed; skipping tick");
            return TickOutcome::Abandoned;
        }

        match self.classifier.classify(surface) {
            Ok(result) => {
                trace!(?result, "frame classified");
                TickOutcome::Classified(result)
            }
            Err(err) => {
                warn!(error = %err, "classification failed; skipping tick");
                TickOutcome::Abandoned
            }
        }
    }
}
