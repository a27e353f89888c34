// Camera capture and preview implementations
// Each backend provides the interface defined here over the types in models/capture.rs

use crate::models::capture::{CaptureResult, Frame, FrameOverlay};

#[cfg(feature = "camera-opencv")]
pub mod opencv_camera;

#[cfg(feature = "camera-opencv")]
pub use opencv_camera::{OpenCvCamera as PlatformCamera, OpenCvPreview as PlatformPreview};

pub mod synthetic;

pub use synthetic::SyntheticCamera;

/// A stream of frames from a camera
pub trait FrameSource {
    /// Discard up to `count` buffered frames without decoding them
    fn drain(&mut self, count: u32) -> CaptureResult<()>;

    /// Read and decode the next frame
    fn read_frame(&mut self) -> CaptureResult<Frame>;

    /// Human readable description of the source
    fn describe(&self) -> String;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn drain(&mut self, count: u32) -> CaptureResult<()> {
        (**self).drain(count)
    }

    fn read_frame(&mut self) -> CaptureResult<Frame> {
        (**self).read_frame()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Window showing the processed frame, and the source of the quit key
pub trait Preview {
    fn show(&mut self, frame: &Frame, overlay: &FrameOverlay) -> CaptureResult<()>;

    /// Poll the keyboard for at most 1 ms
    fn poll_key(&mut self) -> CaptureResult<Option<char>>;
}

impl<T: Preview + ?Sized> Preview for Box<T> {
    fn show(&mut self, frame: &Frame, overlay: &FrameOverlay) -> CaptureResult<()> {
        (**self).show(frame, overlay)
    }

    fn poll_key(&mut self) -> CaptureResult<Option<char>> {
        (**self).poll_key()
    }
}

/// No window and no keyboard; the loop ends on end-of-stream or Ctrl-C
pub struct NullPreview;

impl Preview for NullPreview {
    fn show(&mut self, _frame: &Frame, _overlay: &FrameOverlay) -> CaptureResult<()> {
        Ok(())
    }

    fn poll_key(&mut self) -> CaptureResult<Option<char>> {
        Ok(None)
    }
}
