// MediaPipe Hand Landmarker bridge
// Abstracts the hand landmark model behind a trait so the gesture pipeline can
// run against the real model (PyO3), a recorded replay, or a test double

use crate::models::capture::Frame;
use crate::models::pose::{HandPose, LandmarkerConfig, PoseResult};

/// A source of hand landmarks for video frames.
///
/// `timestamp_ms` must increase monotonically across calls; the MediaPipe
/// VIDEO running mode rejects out-of-order timestamps.
pub trait HandLandmarker {
    /// Detect at most one hand in the frame
    fn detect(&mut self, frame: &Frame, timestamp_ms: i64) -> PoseResult<Option<HandPose>>;

    /// Check if the model is loaded
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn get_model_info(&self) -> String;
}

impl<T: HandLandmarker + ?Sized> HandLandmarker for Box<T> {
    fn detect(&mut self, frame: &Frame, timestamp_ms: i64) -> PoseResult<Option<HandPose>> {
        (**self).detect(frame, timestamp_ms)
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn get_model_info(&self) -> String {
        (**self).get_model_info()
    }
}

// ==============================================================================
// PyO3 Implementation (Python MediaPipe)
// ==============================================================================

#[cfg(feature = "ml-pyo3")]
pub mod pyo3_backend {
    use super::*;
    use crate::models::pose::{Handedness, Keypoint3D, PoseError};
    use pyo3::prelude::*;
    use pyo3::types::{PyBytes, PyModule};

    const BRIDGE_SOURCE: &str = r#"
import numpy as np
import mediapipe as mp
from mediapipe.tasks import python
from mediapipe.tasks.python import vision


def create(model_path, detection, presence, tracking, num_hands):
    options = vision.HandLandmarkerOptions(
        base_options=python.BaseOptions(model_asset_path=model_path),
        running_mode=vision.RunningMode.VIDEO,
        num_hands=num_hands,
        min_hand_detection_confidence=detection,
        min_hand_presence_confidence=presence,
        min_tracking_confidence=tracking,
    )
    return vision.HandLandmarker.create_from_options(options)


def detect(landmarker, rgb_bytes, width, height, timestamp_ms):
    data = np.frombuffer(rgb_bytes, dtype=np.uint8).reshape((height, width, 3))
    image = mp.Image(image_format=mp.ImageFormat.SRGB, data=data)
    result = landmarker.detect_for_video(image, timestamp_ms)
    if not result.hand_landmarks:
        return None
    label, score = "Unknown", 0.0
    if result.handedness and result.handedness[0]:
        category = result.handedness[0][0]
        label, score = category.category_name, category.score
    points = [(lm.x, lm.y, lm.z) for lm in result.hand_landmarks[0]]
    return points, label, score


def close(landmarker):
    landmarker.close()
"#;

    pub struct PyO3HandLandmarker {
        bridge: Py<PyModule>,
        landmarker: PyObject,
        config: LandmarkerConfig,
    }

    impl PyO3HandLandmarker {
        pub fn new(config: &LandmarkerConfig) -> PoseResult<Self> {
            if !config.model_path.exists() {
                return Err(PoseError::ModelLoadFailed(format!(
                    "Model file {} not found. Run `hand-mouse download-model` first",
                    config.model_path.display()
                )));
            }

            Python::with_gil(|py| {
                let bridge = PyModule::from_code_bound(
                    py,
                    BRIDGE_SOURCE,
                    "hand_landmarker_bridge.py",
                    "hand_landmarker_bridge",
                )
                .map_err(|e| PoseError::ModelLoadFailed(format!(
                    "Failed to import mediapipe: {}. Make sure Python dependencies are installed (pip install mediapipe numpy)",
                    e
                )))?;

                let landmarker = bridge
                    .getattr("create")
                    .and_then(|create| {
                        create.call1((
                            config.model_path.to_string_lossy().into_owned(),
                            config.min_hand_detection_confidence,
                            config.min_hand_presence_confidence,
                            config.min_tracking_confidence,
                            config.num_hands,
                        ))
                    })
                    .map_err(|e| PoseError::ModelLoadFailed(format!("Failed to create hand landmarker: {}", e)))?;

                log::info!(
                    "MediaPipe hand landmarker loaded from {} (detection={}, presence={}, tracking={})",
                    config.model_path.display(),
                    config.min_hand_detection_confidence,
                    config.min_hand_presence_confidence,
                    config.min_tracking_confidence
                );

                Ok(Self {
                    bridge: bridge.unbind(),
                    landmarker: landmarker.unbind(),
                    config: config.clone(),
                })
            })
        }
    }

    impl HandLandmarker for PyO3HandLandmarker {
        fn detect(&mut self, frame: &Frame, timestamp_ms: i64) -> PoseResult<Option<HandPose>> {
            Python::with_gil(|py| {
                let bridge = self.bridge.bind(py);
                let image_bytes = PyBytes::new_bound(py, frame.image.as_raw());

                let result = bridge
                    .getattr("detect")
                    .and_then(|detect| {
                        detect.call1((
                            self.landmarker.clone_ref(py),
                            image_bytes,
                            frame.width(),
                            frame.height(),
                            timestamp_ms,
                        ))
                    })
                    .map_err(|e| PoseError::InferenceFailed(format!("MediaPipe inference failed: {}", e)))?;

                if result.is_none() {
                    return Ok(None);
                }

                let (points, label, score): (Vec<(f32, f32, f32)>, String, f32) = result
                    .extract()
                    .map_err(|e| PoseError::InferenceFailed(format!("Unexpected landmarker output: {}", e)))?;

                let landmarks = points
                    .into_iter()
                    .map(|(x, y, z)| Keypoint3D::new(x, y, z))
                    .collect();

                HandPose::from_landmarks(landmarks, Handedness::from_label(&label), score).map(Some)
            })
        }

        fn is_initialized(&self) -> bool {
            true
        }

        fn get_model_info(&self) -> String {
            format!(
                "PyO3 MediaPipe Hand Landmarker (Python backend) - model: {}, hands: {}",
                self.config.model_path.display(),
                self.config.num_hands
            )
        }
    }

    impl Drop for PyO3HandLandmarker {
        fn drop(&mut self) {
            Python::with_gil(|py| {
                let closed = self
                    .bridge
                    .bind(py)
                    .getattr("close")
                    .and_then(|close| close.call1((self.landmarker.clone_ref(py),)));
                if let Err(e) = closed {
                    log::warn!("Failed to close hand landmarker: {}", e);
                }
            });
        }
    }

    /// Python and MediaPipe versions, for the dependency check
    pub fn runtime_versions() -> Result<(String, String), String> {
        Python::with_gil(|py| {
            let python_version = py.version().to_string();
            let mediapipe_version = py
                .import_bound("mediapipe")
                .and_then(|mp| mp.getattr("__version__"))
                .and_then(|v| v.extract::<String>())
                .map_err(|e| format!("MediaPipe import failed: {}", e))?;
            Ok((python_version, mediapipe_version))
        })
    }
}

// ==============================================================================
// Dummy Implementation (for compilation without features)
// ==============================================================================

#[cfg(not(feature = "ml-pyo3"))]
pub struct DummyHandLandmarker {
    config: LandmarkerConfig,
}

#[cfg(not(feature = "ml-pyo3"))]
impl DummyHandLandmarker {
    pub fn new(config: &LandmarkerConfig) -> PoseResult<Self> {
        log::warn!("Using dummy hand landmarker (no inference); enable the 'ml-pyo3' feature for MediaPipe");
        Ok(Self {
            config: config.clone(),
        })
    }
}

#[cfg(not(feature = "ml-pyo3"))]
impl HandLandmarker for DummyHandLandmarker {
    fn detect(&mut self, _frame: &Frame, _timestamp_ms: i64) -> PoseResult<Option<HandPose>> {
        Ok(None)
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn get_model_info(&self) -> String {
        format!(
            "Dummy hand landmarker (no ML inference - enable 'ml-pyo3' feature), model: {}",
            self.config.model_path.display()
        )
    }
}

// ==============================================================================
// Default Backend Selection
// ==============================================================================

#[cfg(feature = "ml-pyo3")]
pub type DefaultHandLandmarker = pyo3_backend::PyO3HandLandmarker;

#[cfg(not(feature = "ml-pyo3"))]
pub type DefaultHandLandmarker = DummyHandLandmarker;

#[cfg(all(test, not(feature = "ml-pyo3")))]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_dummy_landmarker_reports_uninitialized() {
        let mut landmarker: Box<dyn HandLandmarker> =
            Box::new(DummyHandLandmarker::new(&LandmarkerConfig::default()).unwrap());

        assert!(!landmarker.is_initialized());
        assert!(landmarker.get_model_info().contains("hand_landmarker.task"));
        assert_eq!(landmarker.detect(&Frame::new(RgbImage::new(4, 4)), 33).unwrap(), None);
    }
}
