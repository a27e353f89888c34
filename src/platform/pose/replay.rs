// Recorded landmark replay
//
// Feeds previously captured detector output back through the pipeline. The
// file is a JSON array with one entry per frame: `null` for "no hand", or an
// object with a 21-element `landmarks` array.

use super::mediapipe_bridge::HandLandmarker;
use crate::models::capture::Frame;
use crate::models::pose::{HandPose, PoseError, PoseResult};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub struct ReplayLandmarker {
    source: Option<PathBuf>,
    frames: VecDeque<Option<HandPose>>,
    total: usize,
}

impl ReplayLandmarker {
    pub fn from_frames(frames: Vec<Option<HandPose>>) -> Self {
        let total = frames.len();
        Self {
            source: None,
            frames: frames.into(),
            total,
        }
    }

    pub fn from_file(path: &Path) -> PoseResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PoseError::ModelLoadFailed(format!("Failed to read replay {}: {}", path.display(), e))
        })?;

        let frames: Vec<Option<HandPose>> = serde_json::from_str(&contents).map_err(|e| {
            PoseError::ModelLoadFailed(format!("Invalid replay {}: {}", path.display(), e))
        })?;

        let mut replay = Self::from_frames(frames);
        replay.source = Some(path.to_path_buf());
        Ok(replay)
    }

    /// Frames not yet consumed
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl HandLandmarker for ReplayLandmarker {
    /// Returns recorded poses in order, then `None` once the recording runs out
    fn detect(&mut self, _frame: &Frame, _timestamp_ms: i64) -> PoseResult<Option<HandPose>> {
        Ok(self.frames.pop_front().flatten())
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_model_info(&self) -> String {
        match &self.source {
            Some(path) => format!("Landmark replay from {} ({} frames)", path.display(), self.total),
            None => format!("In-memory landmark replay ({} frames)", self.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::{Handedness, Keypoint3D};
    use image::RgbImage;

    fn blank_frame() -> Frame {
        Frame::new(RgbImage::new(4, 4))
    }

    #[test]
    fn test_replay_yields_frames_in_order() {
        let pose = HandPose::from_landmarks(vec![Keypoint3D::new(0.5, 0.5, 0.0); 21], Handedness::Right, 0.8)
            .unwrap();
        let mut replay = ReplayLandmarker::from_frames(vec![None, Some(pose.clone())]);

        assert_eq!(replay.detect(&blank_frame(), 0).unwrap(), None);
        assert_eq!(replay.detect(&blank_frame(), 33).unwrap(), Some(pose));
        assert_eq!(replay.remaining(), 0);
        assert!(replay.is_initialized());
        assert_eq!(replay.detect(&blank_frame(), 66).unwrap(), None);
    }

    #[test]
    fn test_replay_from_file() {
        let dir = std::env::temp_dir().join("hand_mouse_replay_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("replay.json");

        let landmarks: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f32 / 20.0))
            .collect();
        let json = format!(
            r#"[null, {{"landmarks":[{}],"handedness":"left","confidence":0.7}}]"#,
            landmarks.join(",")
        );
        std::fs::write(&path, json).unwrap();

        let mut replay = ReplayLandmarker::from_file(&path).unwrap();
        assert_eq!(replay.total(), 2);
        assert!(replay.get_model_info().contains("replay.json"));

        assert!(replay.detect(&blank_frame(), 0).unwrap().is_none());
        let pose = replay.detect(&blank_frame(), 33).unwrap().unwrap();
        assert_eq!(pose.handedness, Handedness::Left);
        assert_eq!(pose.landmarks[20].x, 1.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_replay_rejects_short_landmark_arrays() {
        let dir = std::env::temp_dir().join("hand_mouse_replay_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("replay.json");
        std::fs::write(&path, r#"[{"landmarks":[{"x":0.1,"y":0.1,"z":0.0}]}]"#).unwrap();

        assert!(ReplayLandmarker::from_file(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
