use crate::Result;
use crate::frame::FrameBuffer;

/// How much data a media source currently has for the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// No new frame since the last capture.
    HaveNothing,
    /// A new frame can be captured now.
    HaveEnoughData,
    /// The source will never produce another frame.
    Ended,
}

/// A live video feed the sampler can draw frames from.
pub trait FrameSource {
    /// Current frame dimensions, once known.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Poll readiness. Called once per sampling tick, before any capture.
    fn ready_state(&mut self) -> ReadyState;

    /// Copy the current frame into `frame`.
    ///
    /// The caller sizes `frame` to [`FrameSource::dimensions`] beforehand.
    fn capture(&mut self, frame: &mut FrameBuffer) -> Result<()>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn dimensions(&self) -> Option<(u32, u32)> {
        (**self).dimensions()
    }

    fn ready_state(&mut self) -> ReadyState {
        (**self).ready_state()
    }

    fn capture(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        (**self).capture(frame)
    }
}
