/// Example program to test mouse injection
/// Run with: cargo run --example test_input --features native-input
///
/// Moves the cursor around a square in the middle of the screen. Without the
/// native-input feature the actions are only logged.

use hand_mouse_lib::models::input::{MouseAction, Point};
use hand_mouse_lib::platform::input::{self, InputSink};
use std::thread;
use std::time::Duration;

#[cfg(all(
    feature = "native-input",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
))]
fn open_sink() -> Result<Box<dyn InputSink>, Box<dyn std::error::Error>> {
    Ok(Box::new(input::NativeMouse::new()?))
}

#[cfg(not(all(
    feature = "native-input",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
)))]
fn open_sink() -> Result<Box<dyn InputSink>, Box<dyn std::error::Error>> {
    Ok(Box::new(input::DryRunSink::new(hand_mouse_lib::DRY_RUN_SCREEN)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Mouse Injection Test ===\n");
    println!(
        "Native input: {}",
        if input::native_input_available() { "✓ Available" } else { "✗ Not compiled in (dry run)" }
    );

    let mut sink = open_sink()?;
    let screen = sink.screen_size()?;
    println!("Screen: {}x{}\n", screen.width, screen.height);

    let cx = screen.width as i32 / 2;
    let cy = screen.height as i32 / 2;
    let corners = [
        Point::new(cx - 100, cy - 100),
        Point::new(cx + 100, cy - 100),
        Point::new(cx + 100, cy + 100),
        Point::new(cx - 100, cy + 100),
        Point::new(cx, cy),
    ];

    println!("Moving cursor around a square...");
    for target in corners {
        sink.perform(&MouseAction::Move { target })?;
        println!("  -> ({}, {})", target.x, target.y);
        thread::sleep(Duration::from_millis(300));
    }

    println!("\nScrolling up 3, then down 3...");
    sink.perform(&MouseAction::Scroll { amount: 3 })?;
    thread::sleep(Duration::from_millis(300));
    sink.perform(&MouseAction::Scroll { amount: -3 })?;

    println!("\n✓ Input test complete");
    Ok(())
}
