//! Three-frame differencing motion engine.
//!
//! Each frame is reduced to luma and kept in a short history. A pixel counts as moving when it
//! differs by more than `threshold` from the previous frame *and* the previous frame differs
//! from the one before it. Requiring both differences filters single-frame flicker.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::classification::ClassificationResult;
use crate::classifier::Classifier;
use crate::frame::FrameBuffer;
use crate::{Error, Result};

const HISTORY_LEN: usize = 3;

/// Tuning knobs for [`FrameDiffClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDiffConfig {
    /// Minimum luma difference for a pixel to count as changed.
    pub threshold: u8,

    /// Motion is reported when more than this many pixels changed.
    pub motion_pixel_count: usize,
}

impl Default for FrameDiffConfig {
    fn default() -> Self {
        Self {
            threshold: 30,
            motion_pixel_count: 100,
        }
    }
}

/// Built-in engine comparing the last three luma frames.
pub struct FrameDiffClassifier {
    config: FrameDiffConfig,
    history: VecDeque<Vec<u8>>,
    geometry: (u32, u32),
}

impl FrameDiffClassifier {
    pub fn new(config: FrameDiffConfig) -> Self {
        Self {
            config,
            history: VecDeque::with_capacity(HISTORY_LEN),
            geometry: (0, 0),
        }
    }

    pub fn config(&self) -> FrameDiffConfig {
        self.config
    }

    fn moving_pixels(&self) -> usize {
        let (oldest, middle, newest) = (&self.history[0], &self.history[1], &self.history[2]);
        oldest
            .iter()
            .zip(middle)
            .zip(newest)
            .filter(|((a, b), c)| {
                a.abs_diff(**b) > self.config.threshold && b.abs_diff(**c) > self.config.threshold
            })
            .count()
    }
}

impl Classifier for FrameDiffClassifier {
    fn configure(&mut self, width: u32, height: u32) -> Result<()> {
        if (width, height) != self.geometry {
            // Frames of different geometry can't be compared pixel for pixel, even when the
            // pixel count matches.
            self.history.clear();
            self.geometry = (width, height);
        }
        Ok(())
    }

    fn classify(&mut self, frame: &FrameBuffer) -> Result<ClassificationResult> {
        if frame.channels() < 3 {
            return Err(Error::msg(format!(
                "frame-diff classifier needs RGB(A) frames, got {} channel(s)",
                frame.channels()
            )));
        }

        if frame.dimensions() != self.geometry {
            let ((fw, fh), (cw, ch)) = (frame.dimensions(), self.geometry);
            return Err(Error::msg(format!(
                "frame is {fw}x{fh} but classifier is configured for {cw}x{ch}"
            )));
        }

        let luma = to_luma(frame.pixels(), frame.channels());

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(luma);

        if self.history.len() < HISTORY_LEN {
            return Ok(ClassificationResult::NotReady);
        }

        let moving = self.moving_pixels();
        trace!(moving, "frame-diff pass");
        if moving > self.config.motion_pixel_count {
            Ok(ClassificationResult::MotionDetected)
        } else {
            Ok(ClassificationResult::NoMotion)
        }
    }
}

/// Reduce interleaved RGB(A) pixels to one luma byte per pixel.
fn to_luma(pixels: &[u8], channels: usize) -> Vec<u8> {
    pixels
        .chunks_exact(channels)
        .map(|px| {
            let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
            (0.30 * r + 0.59 * g + 0.11 * b) as u8
        })
        .collect()
}
