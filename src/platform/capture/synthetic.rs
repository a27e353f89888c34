// Blank frame source for replays and tests

use super::FrameSource;
use crate::models::capture::{CaptureError, CaptureResult, Frame};
use image::RgbImage;

pub struct SyntheticCamera {
    width: u32,
    height: u32,
    /// Frames left before end of stream; `None` never ends
    remaining: Option<usize>,
    frames_read: u64,
    frames_drained: u64,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, frame_limit: Option<usize>) -> Self {
        Self {
            width,
            height,
            remaining: frame_limit,
            frames_read: 0,
            frames_drained: 0,
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn frames_drained(&self) -> u64 {
        self.frames_drained
    }
}

impl FrameSource for SyntheticCamera {
    /// Drained frames are not counted against the frame limit
    fn drain(&mut self, count: u32) -> CaptureResult<()> {
        self.frames_drained += count as u64;
        Ok(())
    }

    fn read_frame(&mut self) -> CaptureResult<Frame> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(CaptureError::EndOfStream);
            }
            *remaining -= 1;
        }

        self.frames_read += 1;
        Ok(Frame::new(RgbImage::new(self.width, self.height)))
    }

    fn describe(&self) -> String {
        format!("synthetic {}x{} source", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_camera_ends_after_limit() {
        let mut camera = SyntheticCamera::new(8, 6, Some(2));
        camera.drain(3).unwrap();

        let frame = camera.read_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert!(camera.read_frame().is_ok());
        assert!(matches!(camera.read_frame(), Err(CaptureError::EndOfStream)));

        assert_eq!(camera.frames_read(), 2);
        assert_eq!(camera.frames_drained(), 3);
    }
}
