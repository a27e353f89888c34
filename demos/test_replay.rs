/// Example program that writes a landmark recording and plays it back through
/// the full pipeline with a dry-run mouse
/// Run with: cargo run --example test_replay

use hand_mouse_lib::core::config::Config;
use hand_mouse_lib::models::pose::{HandPose, Handedness, Keypoint3D};
use hand_mouse_lib::RunOptions;

/// An open hand with the index tip at (x, y)
fn open_hand_at(x: f32, y: f32) -> HandPose {
    let mut landmarks = vec![Keypoint3D::new(x, y + 0.2, 0.0); 21];
    landmarks[3] = Keypoint3D::new(x - 0.10, y + 0.15, 0.0);
    landmarks[4] = Keypoint3D::new(x - 0.15, y + 0.15, 0.0);
    for (finger, (tip, pip)) in [(8, 6), (12, 10), (16, 14), (20, 18)].into_iter().enumerate() {
        let fx = x + 0.03 * finger as f32;
        landmarks[pip] = Keypoint3D::new(fx, y + 0.1, 0.0);
        landmarks[tip] = Keypoint3D::new(fx, y, 0.0);
    }
    HandPose::from_landmarks(landmarks, Handedness::Right, 0.9).expect("21 landmarks")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Landmark Replay Test ===\n");

    // Sweep right, lose the hand, then raise the open hand to scroll
    let mut frames: Vec<Option<HandPose>> = (0..30)
        .map(|i| Some(open_hand_at(0.2 + 0.02 * i as f32, 0.5)))
        .collect();
    frames.extend(std::iter::repeat(None).take(5));
    frames.extend((0..10).map(|i| Some(open_hand_at(0.5, 0.6 - 0.03 * i as f32))));

    let dir = std::env::temp_dir().join("hand_mouse_demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("replay.json");
    std::fs::write(&path, serde_json::to_string_pretty(&frames)?)?;
    println!("Wrote {} frames to {}\n", frames.len(), path.display());

    let config = Config {
        preview: false,
        ..Config::default()
    };

    let stats = hand_mouse_lib::run(RunOptions {
        config,
        dry_run: true,
        replay: Some(path),
        threaded_capture: false,
    })?;

    println!("\nFrames with hand: {}", stats.frames_with_hand);
    println!("Scroll events: {}", stats.scrolls);

    std::fs::remove_dir_all(&dir)?;
    println!("\n✓ Replay test complete");
    Ok(())
}
