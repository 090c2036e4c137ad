//! Raster storage for one captured video frame.

/// Bytes per pixel for the RGBA rasters produced by capture.
pub const RGBA_CHANNELS: usize = 4;

/// A rectangular raw pixel buffer holding exactly one captured frame.
///
/// Pixels are stored row-major, `channels` bytes per pixel. The sampler owns one buffer as its
/// capture surface and reuses it across ticks; the pixel contents are only meaningful for the
/// tick that filled them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    channels: usize,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Create a zeroed RGBA buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_channels(width, height, RGBA_CHANNELS)
    }

    pub fn with_channels(width: u32, height: u32, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            pixels: vec![0; byte_len(width, height, channels)],
        }
    }

    /// Wrap existing pixel data.
    ///
    /// Returns `None` when `pixels` does not hold exactly `width * height * channels` bytes.
    pub fn from_pixels(width: u32, height: u32, channels: usize, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != byte_len(width, height, channels) {
            return None;
        }
        Some(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Resize the surface to new dimensions, keeping the channel depth.
    ///
    /// Returns `true` if the geometry changed. Pixel contents are undefined afterwards and
    /// must be overwritten by the next capture.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixels
            .resize(byte_len(width, height, self.channels), 0);
        true
    }
}

fn byte_len(width: u32, height: u32, channels: usize) -> usize {
    width as usize * height as usize * channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_reports_geometry_changes_only() {
        let mut frame = FrameBuffer::new(4, 2);
        assert_eq!(frame.pixels().len(), 32);

        assert!(!frame.resize(4, 2));
        assert!(frame.resize(8, 2));
        assert_eq!(frame.dimensions(), (8, 2));
        assert_eq!(frame.pixels().len(), 64);
    }

    #[test]
    fn from_pixels_rejects_mismatched_length() {
        assert!(FrameBuffer::from_pixels(2, 2, 4, vec![0; 15]).is_none());
        assert!(FrameBuffer::from_pixels(2, 2, 4, vec![0; 16]).is_some());
    }
}
