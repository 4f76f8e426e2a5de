use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::{Result, VideoError};

/// A single video frame.
///
/// Thin wrapper around an RGB image buffer with the pixel accessors the
/// quantizer needs.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        let buffer = ImageBuffer::new(width, height);
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Load a frame from an image file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|_| VideoError::LoadFailed {
            path: path.as_ref().display().to_string(),
        })?;

        let rgb_image = match image {
            image::DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };

        Ok(Self::new(rgb_image))
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let pixel = self.buffer.get_pixel(x, y);
        [pixel[0], pixel[1], pixel[2]]
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.buffer
            .save(path.as_ref())
            .map_err(|e| VideoError::FrameProcessingFailed {
                reason: format!("Failed to save frame {}: {e}", path.as_ref().display()),
            })?;
        Ok(())
    }
}

/// Probed properties of an input video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Encoder settings applied when reassembling frames into a video.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderParams {
    /// Video codec passed to the encoder
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_pixel_roundtrip() {
        let mut frame = Frame::new_black(4, 4);
        assert_eq!(frame.get_pixel(2, 3), [0, 0, 0]);

        frame.set_pixel(2, 3, [9, 8, 7]);
        assert_eq!(frame.get_pixel(2, 3), [9, 8, 7]);
    }

    #[test]
    fn test_filled_frame() {
        let frame = Frame::new_filled(3, 2, [1, 2, 3]);
        assert_eq!((frame.width(), frame.height()), (3, 2));
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.get_pixel(x, y), [1, 2, 3]);
            }
        }
    }

    #[test]
    fn test_frame_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let frame = Frame::new_filled(8, 8, [200, 100, 50]);
        frame.save_png(&path).unwrap();

        let loaded = Frame::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (8, 8));
        assert_eq!(loaded.get_pixel(4, 4), [200, 100, 50]);
    }
}
