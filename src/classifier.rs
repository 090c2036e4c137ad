use tracing::debug;

use crate::Result;
use crate::classification::ClassificationResult;
use crate::frame::FrameBuffer;

/// Pluggable motion-classification engine used by [`crate::Session`].
///
/// An engine receives one captured frame per call and reports whether it sees motion. Engines
/// may keep internal history between calls; that state is opaque to the pipeline.
///
/// Calls are serialized by the caller: an engine is never asked to classify two frames at once.
pub trait Classifier {
    /// Tell the engine the frame geometry it will receive from now on.
    ///
    /// Called before the first `classify` that uses new dimensions.
    fn configure(&mut self, width: u32, height: u32) -> Result<()>;

    /// Classify one frame.
    ///
    /// Engines that are still warming up should return [`ClassificationResult::NotReady`].
    fn classify(&mut self, frame: &FrameBuffer) -> Result<ClassificationResult>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn configure(&mut self, width: u32, height: u32) -> Result<()> {
        (**self).configure(width, height)
    }

    fn classify(&mut self, frame: &FrameBuffer) -> Result<ClassificationResult> {
        (**self).classify(frame)
    }
}

/// Wraps an engine that may not have finished loading yet.
///
/// The adapter answers `NotReady` while no engine is attached and forwards dimension changes
/// to the engine before the frame that carries them.
pub struct ClassifierAdapter<C> {
    engine: Option<C>,
    configured: Option<(u32, u32)>,
}

impl<C> Default for ClassifierAdapter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ClassifierAdapter<C> {
    pub fn new() -> Self {
        Self {
            engine: None,
            configured: None,
        }
    }

    /// An adapter around an engine that has already finished loading.
    pub fn ready(engine: C) -> Self {
        Self {
            engine: Some(engine),
            configured: None,
        }
    }

    /// Attach a loaded engine. The next classify call reconfigures it with the frame geometry.
    pub fn attach(&mut self, engine: C) {
        self.engine = Some(engine);
        self.configured = None;
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&C> {
        self.engine.as_ref()
    }
}

impl<C: Classifier> ClassifierAdapter<C> {
    /// Classify a frame, configuring the engine first if the geometry changed.
    pub fn classify(&mut self, frame: &FrameBuffer) -> Result<ClassificationResult> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(ClassificationResult::NotReady);
        };

        let dims = frame.dimensions();
        if self.configured != Some(dims) {
            debug!(width = dims.0, height = dims.1, "configuring classifier");
            engine.configure(dims.0, dims.1)?;
            self.configured = Some(dims);
        }

        engine.classify(frame)
    }
}
