//! Raw RGBA frame streams.
//!
//! Frames arrive back to back with no header: each one is exactly `width * height * 4` bytes.
//! This is what `ffmpeg -f rawvideo -pix_fmt rgba -` emits, so a camera can be piped straight in.
//!
//! Reading happens on a dedicated thread so a slow or blocking input never stalls the sampling
//! timer. The thread hands complete frames over a small bounded channel; when the sampler falls
//! behind, the reader blocks instead of buffering without limit.

use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::frame::{FrameBuffer, RGBA_CHANNELS};
use crate::source::{FrameSource, ReadyState};
use crate::{Error, Result};

const CHANNEL_DEPTH: usize = 2;

/// A [`FrameSource`] fed by a raw RGBA byte stream.
pub struct RawFrameSource {
    width: u32,
    height: u32,
    rx: Receiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
    disconnected: bool,
    reader: Option<JoinHandle<io::Result<()>>>,
}

impl RawFrameSource {
    /// Start reading frames of the given size from `r`.
    ///
    /// `r` only needs `Send`: it is moved into the reader thread and never shared.
    pub fn spawn<R>(r: R, width: u32, height: u32) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        if width == 0 || height == 0 {
            return Err(Error::config(format!(
                "raw frame size must be non-zero, got {width}x{height}"
            )));
        }

        let frame_len = width as usize * height as usize * RGBA_CHANNELS;
        let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(CHANNEL_DEPTH);

        let reader = std::thread::Builder::new()
            .name("glimpse-raw-reader".to_owned())
            .spawn(move || read_frames(r, frame_len, |frame| tx.send(frame).is_ok()))?;

        Ok(Self {
            width,
            height,
            rx,
            pending: None,
            disconnected: false,
            reader: Some(reader),
        })
    }

    fn reap_reader(&mut self) {
        let Some(handle) = self.reader.take() else {
            return;
        };
        match handle.join() {
            Ok(Ok(())) => debug!("raw frame reader finished"),
            Ok(Err(err)) => warn!(error = %err, "raw frame reader stopped on error"),
            Err(_) => warn!("raw frame reader panicked"),
        }
    }
}

impl FrameSource for RawFrameSource {
    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn ready_state(&mut self) -> ReadyState {
        if self.pending.is_some() {
            return ReadyState::HaveEnoughData;
        }
        if self.disconnected {
            return ReadyState::Ended;
        }

        match self.rx.try_recv() {
            Ok(frame) => {
                self.pending = Some(frame);
                ReadyState::HaveEnoughData
            }
            Err(TryRecvError::Empty) => ReadyState::HaveNothing,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                self.reap_reader();
                ReadyState::Ended
            }
        }
    }

    fn capture(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        let pixels = self
            .pending
            .take()
            .ok_or_else(|| Error::capture("no raw frame buffered"))?;

        if frame.pixels().len() != pixels.len() {
            return Err(Error::capture(format!(
                "capture surface holds {} bytes but raw frame has {}",
                frame.pixels().len(),
                pixels.len()
            )));
        }

        frame.pixels_mut().copy_from_slice(&pixels);
        Ok(())
    }
}

/// Read whole frames from `r` until EOF or until `emit` returns `false`.
///
/// A trailing partial frame is dropped.
fn read_frames<R: Read>(
    mut r: R,
    frame_len: usize,
    mut emit: impl FnMut(Vec<u8>) -> bool,
) -> io::Result<()> {
    loop {
        let mut frame = vec![0u8; frame_len];
        let filled = fill(&mut r, &mut frame)?;

        if filled == 0 {
            return Ok(());
        }
        if filled < frame_len {
            warn!(
                filled,
                expected = frame_len,
                "discarding partial frame at end of input"
            );
            return Ok(());
        }
        if !emit(frame) {
            // Receiver dropped; nobody is sampling any more.
            return Ok(());
        }
    }
}

/// Fill `buf` as far as possible, returning the byte count (short only at EOF).
fn fill<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    /// Poll until the reader thread has delivered something other than `HaveNothing`.
    fn poll(source: &mut RawFrameSource) -> ReadyState {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let state = source.ready_state();
            if state != ReadyState::HaveNothing || Instant::now() > deadline {
                return state;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn read_frames_drops_partial_tail() -> anyhow::Result<()> {
        let mut frames = Vec::new();
        read_frames(Cursor::new(vec![1u8; 10]), 4, |f| {
            frames.push(f);
            true
        })?;
        assert_eq!(frames.len(), 2);
        Ok(())
    }

    #[test]
    fn read_frames_stops_when_emit_refuses() -> anyhow::Result<()> {
        let mut seen = 0;
        read_frames(Cursor::new(vec![0u8; 40]), 4, |_| {
            seen += 1;
            false
        })?;
        assert_eq!(seen, 1);
        Ok(())
    }

    #[test]
    fn zero_sized_frames_are_rejected() {
        assert!(RawFrameSource::spawn(Cursor::new(Vec::new()), 0, 4).is_err());
    }

    #[test]
    fn yields_each_frame_once_then_ends() -> anyhow::Result<()> {
        let mut bytes = vec![10u8; 16];
        bytes.extend(vec![20u8; 16]);
        let mut source = RawFrameSource::spawn(Cursor::new(bytes), 2, 2)?;
        let mut frame = FrameBuffer::new(2, 2);

        assert_eq!(poll(&mut source), ReadyState::HaveEnoughData);
        source.capture(&mut frame)?;
        assert!(frame.pixels().iter().all(|&b| b == 10));

        assert_eq!(poll(&mut source), ReadyState::HaveEnoughData);
        source.capture(&mut frame)?;
        assert!(frame.pixels().iter().all(|&b| b == 20));

        assert_eq!(poll(&mut source), ReadyState::Ended);
        assert!(source.capture(&mut frame).is_err());
        Ok(())
    }

    #[test]
    fn capture_rejects_wrong_surface_size() -> anyhow::Result<()> {
        let mut source = RawFrameSource::spawn(Cursor::new(vec![0u8; 16]), 2, 2)?;
        assert_eq!(poll(&mut source), ReadyState::HaveEnoughData);

        let mut frame = FrameBuffer::new(3, 3);
        let err = source.capture(&mut frame).unwrap_err();
        assert!(err.to_string().contains("capture surface"));
        Ok(())
    }
}
