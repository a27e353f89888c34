// OpenCV camera capture and preview window

use super::{FrameSource, Preview};
use crate::models::capture::{CameraSource, CaptureError, CaptureResult, Frame, FrameOverlay};
use image::RgbImage;
use opencv::{core, highgui, imgproc, prelude::*, videoio};

// ============================================================================
// Camera
// ============================================================================

pub struct OpenCvCamera {
    capture: videoio::VideoCapture,
    source: CameraSource,
}

impl OpenCvCamera {
    pub fn open(source: &CameraSource) -> CaptureResult<Self> {
        let connect_err = |e: opencv::Error| CaptureError::ConnectionFailed(format!("{}: {}", source, e));

        let mut capture = match source {
            CameraSource::Index(index) => videoio::VideoCapture::new(*index, videoio::CAP_ANY),
            CameraSource::Url(url) => videoio::VideoCapture::from_file(url, videoio::CAP_ANY),
        }
        .map_err(connect_err)?;

        if !capture.is_opened().map_err(connect_err)? {
            return Err(CaptureError::ConnectionFailed(source.to_string()));
        }

        // Keep the stream's internal queue short so frames stay current
        if source.is_network_stream() {
            if let Err(e) = capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0) {
                log::warn!("Camera ignored buffer size hint: {}", e);
            }
        }

        log::info!("Opened {}", source);

        Ok(Self {
            capture,
            source: source.clone(),
        })
    }
}

impl FrameSource for OpenCvCamera {
    fn drain(&mut self, count: u32) -> CaptureResult<()> {
        for _ in 0..count {
            let grabbed = self
                .capture
                .grab()
                .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;
            if !grabbed {
                break;
            }
        }
        Ok(())
    }

    fn read_frame(&mut self) -> CaptureResult<Frame> {
        let mut bgr = core::Mat::default();
        let ok = self
            .capture
            .read(&mut bgr)
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;

        if !ok || bgr.empty() {
            return Err(CaptureError::ReadFailed(format!("no frame from {}", self.source)));
        }

        let mut rgb = core::Mat::default();
        imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let bytes = rgb
            .data_bytes()
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))?
            .to_vec();

        let image = RgbImage::from_raw(width, height, bytes).ok_or_else(|| {
            CaptureError::ReadFailed(format!("unexpected buffer size for {}x{} frame", width, height))
        })?;

        Ok(Frame::new(image))
    }

    fn describe(&self) -> String {
        self.source.to_string()
    }
}

// ============================================================================
// Preview
// ============================================================================

const WINDOW_NAME: &str = "Hand Mouse";

// Pairs of landmark indices joined when drawing the hand skeleton
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

/// Preview window; a headless preview skips drawing but still polls the quit key
pub struct OpenCvPreview {
    visible: bool,
}

impl OpenCvPreview {
    pub fn window() -> Self {
        Self { visible: true }
    }

    pub fn headless() -> Self {
        Self { visible: false }
    }

    fn to_bgr(frame: &Frame) -> opencv::Result<core::Mat> {
        let flat = core::Mat::from_slice(frame.image.as_raw())?;
        let rgb = flat.reshape(3, frame.height() as i32)?;
        let mut bgr = core::Mat::default();
        imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
        Ok(bgr)
    }

    fn draw(canvas: &mut core::Mat, overlay: &FrameOverlay) -> opencv::Result<()> {
        let green = core::Scalar::new(0.0, 255.0, 0.0, 0.0);
        let red = core::Scalar::new(0.0, 0.0, 255.0, 0.0);
        let white = core::Scalar::new(255.0, 255.0, 255.0, 0.0);
        let width = canvas.cols() as f32;
        let height = canvas.rows() as f32;

        if let Some(hand) = &overlay.hand {
            let pixel = |i: usize| {
                let p = &hand.landmarks[i];
                core::Point::new((p.x * width) as i32, (p.y * height) as i32)
            };

            for (a, b) in HAND_CONNECTIONS {
                imgproc::line(canvas, pixel(a), pixel(b), white, 1, imgproc::LINE_8, 0)?;
            }
            for i in 0..hand.landmarks.len() {
                imgproc::circle(canvas, pixel(i), 3, red, -1, imgproc::LINE_8, 0)?;
            }
        }

        if let Some(cursor) = overlay.cursor {
            let text = format!("Cursor: ({}, {})", cursor.x, cursor.y);
            imgproc::put_text(
                canvas,
                &text,
                core::Point::new(10, 30),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.6,
                green,
                2,
                imgproc::LINE_8,
                false,
            )?;
        }

        if let Some(gesture) = overlay.gesture {
            imgproc::put_text(
                canvas,
                gesture,
                core::Point::new(10, 90),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.6,
                green,
                2,
                imgproc::LINE_8,
                false,
            )?;
        }

        if let Some(event) = &overlay.event {
            imgproc::put_text(
                canvas,
                event,
                core::Point::new(10, 60),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.8,
                red,
                2,
                imgproc::LINE_8,
                false,
            )?;
        }

        imgproc::put_text(
            canvas,
            "Press 'q' to quit",
            core::Point::new(10, canvas.rows() - 10),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            white,
            1,
            imgproc::LINE_8,
            false,
        )?;

        Ok(())
    }
}

impl Preview for OpenCvPreview {
    fn show(&mut self, frame: &Frame, overlay: &FrameOverlay) -> CaptureResult<()> {
        if !self.visible {
            return Ok(());
        }

        let preview_err = |e: opencv::Error| CaptureError::PreviewFailed(e.to_string());
        let mut canvas = Self::to_bgr(frame).map_err(preview_err)?;
        Self::draw(&mut canvas, overlay).map_err(preview_err)?;
        highgui::imshow(WINDOW_NAME, &canvas).map_err(preview_err)?;
        Ok(())
    }

    fn poll_key(&mut self) -> CaptureResult<Option<char>> {
        let key = highgui::wait_key(1).map_err(|e| CaptureError::PreviewFailed(e.to_string()))?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key & 0xFF) as u32))
    }
}

impl Drop for OpenCvPreview {
    fn drop(&mut self) {
        if self.visible {
            let _ = highgui::destroy_all_windows();
        }
    }
}
