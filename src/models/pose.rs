// Data models for hand tracking and gesture classification

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of keypoints produced by the MediaPipe hand landmarker
pub const HAND_LANDMARK_COUNT: usize = 21;

// ==============================================================================
// Shared: 3D Keypoint
// ==============================================================================

/// A normalized 3D keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint3D {
    pub x: f32, // Normalized [0, 1] for image coordinates
    pub y: f32, // Normalized [0, 1], grows downward
    pub z: f32, // Depth relative to the wrist
}

impl Keypoint3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

// ==============================================================================
// Hand Tracking (21 keypoints per hand)
// ==============================================================================

/// A single detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    pub landmarks: [Keypoint3D; HAND_LANDMARK_COUNT],
    #[serde(default)]
    pub handedness: Handedness,
    #[serde(default)]
    pub confidence: f32,
}

impl HandPose {
    /// Build a pose from detector output, rejecting anything that is not exactly 21 keypoints
    pub fn from_landmarks(
        landmarks: Vec<Keypoint3D>,
        handedness: Handedness,
        confidence: f32,
    ) -> PoseResult<Self> {
        let count = landmarks.len();
        let landmarks: [Keypoint3D; HAND_LANDMARK_COUNT] = landmarks
            .try_into()
            .map_err(|_| PoseError::InvalidLandmarks(count))?;

        Ok(Self {
            landmarks,
            handedness,
            confidence,
        })
    }

    pub fn landmark(&self, landmark: HandLandmark) -> &Keypoint3D {
        &self.landmarks[landmark as usize]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Left" | "left" => Handedness::Left,
            "Right" | "right" => Handedness::Right,
            _ => Handedness::Unknown,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

/// MediaPipe Hand Landmark indices (21 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

// ==============================================================================
// Gesture Labels
// ==============================================================================

/// Per-frame classification of a hand pose.
///
/// The fields are computed independently and may overlap; the dispatcher
/// decides which one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureLabels {
    pub pinching: bool,
    pub peace_sign: bool,
    pub extended_fingers: u8,
}

/// The gesture that drives the frame after priority resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveGesture {
    Pinch,
    Peace,
    Scroll,
    None,
}

impl ActiveGesture {
    pub fn to_string(&self) -> &'static str {
        match self {
            ActiveGesture::Pinch => "Pinch",
            ActiveGesture::Peace => "Peace",
            ActiveGesture::Scroll => "Scroll",
            ActiveGesture::None => "",
        }
    }
}

impl GestureLabels {
    pub fn active_gesture(&self) -> ActiveGesture {
        if self.pinching {
            ActiveGesture::Pinch
        } else if self.peace_sign {
            ActiveGesture::Peace
        } else if self.extended_fingers == 5 {
            ActiveGesture::Scroll
        } else {
            ActiveGesture::None
        }
    }
}

// ==============================================================================
// Configuration
// ==============================================================================

/// Options handed to the hand landmarker. Running mode is always VIDEO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkerConfig {
    pub model_path: PathBuf,
    pub num_hands: u32,
    pub min_hand_detection_confidence: f32,
    pub min_hand_presence_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for LandmarkerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("hand_landmarker.task"),
            num_hands: 1,
            min_hand_detection_confidence: 0.5,
            min_hand_presence_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Hand landmarker not initialized")]
    NotInitialized,

    #[error("Model loading failed: {0}")]
    ModelLoadFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Expected 21 hand landmarks, got {0}")]
    InvalidLandmarks(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not supported in this build")]
    NotSupported,
}

pub type PoseResult<T> = Result<T, PoseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_pose_requires_21_landmarks() {
        let short = vec![Keypoint3D::default(); 20];
        assert!(matches!(
            HandPose::from_landmarks(short, Handedness::Right, 0.9),
            Err(PoseError::InvalidLandmarks(20))
        ));

        let pose = HandPose::from_landmarks(vec![Keypoint3D::default(); 21], Handedness::Right, 0.9)
            .unwrap();
        assert_eq!(pose.landmarks.len(), HAND_LANDMARK_COUNT);
    }

    #[test]
    fn test_landmark_lookup_uses_mediapipe_indices() {
        let landmarks = (0..21)
            .map(|i| Keypoint3D::new(i as f32, 0.0, 0.0))
            .collect();
        let pose = HandPose::from_landmarks(landmarks, Handedness::Left, 1.0).unwrap();

        assert_eq!(pose.landmark(HandLandmark::ThumbTip).x, 4.0);
        assert_eq!(pose.landmark(HandLandmark::IndexFingerTip).x, 8.0);
        assert_eq!(pose.landmark(HandLandmark::PinkyTip).x, 20.0);
    }

    #[test]
    fn test_active_gesture_priority() {
        let labels = GestureLabels {
            pinching: true,
            peace_sign: true,
            extended_fingers: 5,
        };
        assert_eq!(labels.active_gesture(), ActiveGesture::Pinch);

        let labels = GestureLabels {
            pinching: false,
            peace_sign: true,
            extended_fingers: 5,
        };
        assert_eq!(labels.active_gesture(), ActiveGesture::Peace);

        let labels = GestureLabels {
            pinching: false,
            peace_sign: false,
            extended_fingers: 5,
        };
        assert_eq!(labels.active_gesture(), ActiveGesture::Scroll);

        let labels = GestureLabels {
            pinching: false,
            peace_sign: false,
            extended_fingers: 4,
        };
        assert_eq!(labels.active_gesture(), ActiveGesture::None);
    }

    #[test]
    fn test_handedness_labels() {
        assert_eq!(Handedness::from_label("Left"), Handedness::Left);
        assert_eq!(Handedness::from_label("right"), Handedness::Right);
        assert_eq!(Handedness::from_label("?"), Handedness::Unknown);
    }

    #[test]
    fn test_landmarker_config_default() {
        let config = LandmarkerConfig::default();
        assert_eq!(config.num_hands, 1);
        assert_eq!(config.min_hand_detection_confidence, 0.5);
        assert_eq!(config.model_path, PathBuf::from("hand_landmarker.task"));
    }
}
