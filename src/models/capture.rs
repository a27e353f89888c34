// Data structures for camera capture

use crate::models::input::Point;
use crate::models::pose::HandPose;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where frames come from: a local device index or a network video stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraSource {
    Index(i32),
    Url(String),
}

impl CameraSource {
    /// Network streams buffer internally and need draining to stay current
    pub fn is_network_stream(&self) -> bool {
        matches!(self, CameraSource::Url(_))
    }
}

impl FromStr for CameraSource {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<i32>() {
            return Ok(CameraSource::Index(index));
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(CameraSource::Url(s.to_string()))
        } else {
            Err(CaptureError::InvalidSource(s.to_string()))
        }
    }
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSource::Index(index) => write!(f, "camera index {}", index),
            CameraSource::Url(url) => write!(f, "IP camera {}", url),
        }
    }
}

/// A captured RGB frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub timestamp: i64,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Mirror the frame so moving the hand right moves the cursor right
    pub fn mirrored(&self) -> Frame {
        Frame {
            timestamp: self.timestamp,
            image: image::imageops::flip_horizontal(&self.image),
        }
    }
}

/// What the preview window draws on top of a frame
#[derive(Debug, Clone, Default)]
pub struct FrameOverlay {
    pub hand: Option<HandPose>,
    pub cursor: Option<Point>,
    /// Name of the gesture driving the frame, if any
    pub gesture: Option<&'static str>,
    /// Short event banner such as "CLICK!" or "SCROLL: 25"
    pub event: Option<String>,
}

/// Error types for camera capture operations
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Invalid camera source: {0} (expected a device index or an http(s) URL)")]
    InvalidSource(String),

    #[error("Could not connect to {0}")]
    ConnectionFailed(String),

    #[error("Frame read failed: {0}")]
    ReadFailed(String),

    #[error("End of stream")]
    EndOfStream,

    #[error("Preview failed: {0}")]
    PreviewFailed(String),

    #[error("Not supported in this build")]
    NotSupported,
}

pub type CaptureResult<T> = Result<T, CaptureError>;
