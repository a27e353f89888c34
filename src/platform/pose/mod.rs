// Hand landmark platform integration
// Provides the MediaPipe bridge and a recorded replay source

pub mod mediapipe_bridge;
pub mod replay;

pub use mediapipe_bridge::{DefaultHandLandmarker, HandLandmarker};
pub use replay::ReplayLandmarker;
