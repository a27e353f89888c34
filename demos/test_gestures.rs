/// Example program that runs hand poses through the classifier and dispatcher
/// Run with: cargo run --example test_gestures

use hand_mouse_lib::core::gesture_classifier::{self, DEFAULT_PINCH_THRESHOLD};
use hand_mouse_lib::core::gesture_dispatcher::{dispatch, DispatchSettings, FrameGesture, GestureState};
use hand_mouse_lib::models::pose::{HandPose, Handedness, Keypoint3D};
use std::time::Duration;

/// Build a pose from which fingers are extended: thumb, index, middle, ring, pinky
fn pose(extended: [bool; 5], pinch: bool) -> HandPose {
    let mut landmarks = vec![Keypoint3D::new(0.5, 0.5, 0.0); 21];

    landmarks[3] = Keypoint3D::new(0.40, 0.60, 0.0);
    landmarks[4] = Keypoint3D::new(if extended[0] { 0.35 } else { 0.45 }, 0.62, 0.0);

    for (finger, (tip, pip)) in [(8, 6), (12, 10), (16, 14), (20, 18)].into_iter().enumerate() {
        let x = 0.45 + 0.05 * finger as f32;
        landmarks[pip] = Keypoint3D::new(x, 0.50, 0.0);
        let tip_y = if extended[finger + 1] { 0.40 } else { 0.55 };
        landmarks[tip] = Keypoint3D::new(x, tip_y, 0.0);
    }

    if pinch {
        let index_tip = landmarks[8];
        landmarks[4] = Keypoint3D::new(index_tip.x + 0.01, index_tip.y, 0.0);
    }

    HandPose::from_landmarks(landmarks, Handedness::Right, 0.9).expect("21 landmarks")
}

fn main() {
    println!("=== Gesture Classification Test ===\n");

    let poses = [
        ("Fist", pose([false; 5], false)),
        ("Open hand", pose([true; 5], false)),
        ("Peace sign", pose([false, true, true, false, false], false)),
        ("Pinch", pose([false; 5], true)),
    ];

    for (name, pose) in &poses {
        let labels = gesture_classifier::classify(pose, DEFAULT_PINCH_THRESHOLD);
        println!("{}:", name);
        println!("  Pinching: {}", labels.pinching);
        println!("  Peace sign: {}", labels.peace_sign);
        println!("  Extended fingers: {}", labels.extended_fingers);
        println!("  Active gesture: {:?}", labels.active_gesture());
        println!();
    }

    println!("=== Cooldown Test ===\n");
    println!("Holding a pinch for one second, one frame every 33 ms...");

    let settings = DispatchSettings::default();
    let pinch = pose([false; 5], true);
    let gesture = FrameGesture {
        labels: gesture_classifier::classify(&pinch, DEFAULT_PINCH_THRESHOLD),
        tracked_y: pinch.landmarks[8].y,
    };

    let mut state = GestureState::default();
    for frame in 0..31u64 {
        let now = Duration::from_millis(frame * 33);
        let (actions, next) = dispatch(Some(&gesture), now, state, &settings);
        state = next;
        for action in actions {
            println!("  {:>4} ms: {:?}", now.as_millis(), action);
        }
    }
    println!();

    println!("=== Scroll Test ===\n");
    let mut state = GestureState::default();
    let open = pose([true; 5], false);
    let labels = gesture_classifier::classify(&open, DEFAULT_PINCH_THRESHOLD);

    for (i, y) in [0.50, 0.52, 0.60, 0.55, 0.40].into_iter().enumerate() {
        let gesture = FrameGesture { labels, tracked_y: y };
        let (actions, next) = dispatch(Some(&gesture), Duration::from_millis(i as u64 * 33), state, &settings);
        state = next;
        let shown = if actions.is_empty() {
            "no scroll (dead zone or first frame)".to_string()
        } else {
            format!("{:?}", actions)
        };
        println!("  y = {:.2}: {}", y, shown);
    }

    println!("\n✓ Gesture test complete");
}
