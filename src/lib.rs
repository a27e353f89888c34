pub mod core;
pub mod models;
pub mod platform;

use crate::core::config::Config;
use crate::core::control_loop::{ControlLoop, LoopOptions, RunStats, QUIT_KEY};
use crate::core::cursor_mapper::CursorMapper;
use crate::core::hand_tracker::HandTracker;
use crate::core::ml_models::{self, format_size_mb, ModelManager, HAND_LANDMARKER_URL};
use crate::models::input::ScreenSize;
use crate::platform::capture::{FrameSource, Preview, SyntheticCamera};
use crate::platform::input::{self as input_platform, DryRunSink, InputSink};
use crate::platform::pose::{DefaultHandLandmarker, HandLandmarker, ReplayLandmarker};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Screen assumed when actions are only logged
pub const DRY_RUN_SCREEN: ScreenSize = ScreenSize {
    width: 1920,
    height: 1080,
};

// Frame size produced for replays
const REPLAY_FRAME_SIZE: (u32, u32) = (320, 240);

/// Everything `run` needs beyond the configuration file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Config,
    /// Log actions instead of moving the real cursor
    pub dry_run: bool,
    /// Recorded landmarks to play back instead of camera + detector
    pub replay: Option<PathBuf>,
    pub threaded_capture: bool,
}

/// Track the hand and drive the mouse until quit, Ctrl-C or end of stream
pub fn run(options: RunOptions) -> Result<RunStats, Box<dyn std::error::Error>> {
    let config = options.config;
    config.validate()?;

    let sink = open_sink(options.dry_run)?;
    let screen = sink.screen_size()?;

    let landmarker: Box<dyn HandLandmarker>;
    let source: Box<dyn FrameSource + Send>;
    match &options.replay {
        Some(path) => {
            let replay = ReplayLandmarker::from_file(path)?;
            let (width, height) = REPLAY_FRAME_SIZE;
            source = Box::new(SyntheticCamera::new(width, height, Some(replay.total())));
            landmarker = Box::new(replay);
        }
        None => {
            landmarker = Box::new(DefaultHandLandmarker::new(&config.landmarker_config())?);
            source = open_camera(&config)?;
        }
    }

    println!("Landmarks: {}", landmarker.get_model_info());
    if !landmarker.is_initialized() {
        eprintln!("⚠ No hand model loaded; the cursor will not move");
    }
    println!("Frames: {}", source.describe());
    println!("Screen: {}x{}", screen.width, screen.height);
    print_controls(&config);

    let tracker = HandTracker::new(
        landmarker,
        CursorMapper::new(screen, config.smoothing),
        config.dispatch_settings(),
        config.pinch_threshold,
        config.gestures_enabled,
    );

    let mut control = ControlLoop::new(tracker, open_preview(&config), sink, LoopOptions::from_config(&config));
    stop_on_ctrl_c(control.stop_handle());

    let stats = if options.threaded_capture {
        control.run_threaded(source).clone()
    } else {
        let mut source = source;
        control.run(&mut source).clone()
    };

    println!("\nStopped. {}", stats.summary());
    if stats.failed_actions > 0 {
        eprintln!("{} mouse action(s) could not be injected", stats.failed_actions);
    }

    Ok(stats)
}

/// Fetch the hand landmarker model to `output`. Returns the path of the model file.
pub fn download_model(output: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let (manager, name) = ModelManager::for_path(output)?;
    let mut model = ml_models::mediapipe::hand_landmarker();
    model.name = name;
    let model_path = manager.get_model_path(&model.name);

    if manager.is_cached(&model) && !force {
        println!("Model already exists at {} (use --force to download again)", model_path.display());
        return Ok(model_path);
    }

    println!("Downloading hand landmarker model ({})...", model.version);
    match manager.fetch(&model) {
        Ok(bytes) => {
            println!("✓ Model saved to {} ({})", model_path.display(), format_size_mb(bytes));
            Ok(model_path)
        }
        Err(e) => {
            eprintln!("✗ Download failed: {}", e);
            eprintln!("Download it manually from:\n  {}", HAND_LANDMARKER_URL);
            eprintln!("and save it as {}", model_path.display());
            Err(e)
        }
    }
}

fn print_controls(config: &Config) {
    println!("\nHand mouse running ({} profile)", config.profile.to_string());
    println!("  Index finger  - move cursor");
    if config.gestures_enabled {
        println!("  Pinch         - left click");
        println!("  Peace sign    - right click");
        println!("  Open hand     - scroll (move up/down)");
    }
    println!("  '{}' or Ctrl-C - quit\n", QUIT_KEY);
}

fn open_sink(dry_run: bool) -> Result<Box<dyn InputSink>, Box<dyn std::error::Error>> {
    if dry_run {
        return Ok(Box::new(DryRunSink::new(DRY_RUN_SCREEN)));
    }

    if !input_platform::native_input_available() {
        log::warn!("Native input not compiled in; actions will only be logged");
        return Ok(Box::new(DryRunSink::new(DRY_RUN_SCREEN)));
    }

    native_sink()
}

#[cfg(all(
    feature = "native-input",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
))]
fn native_sink() -> Result<Box<dyn InputSink>, Box<dyn std::error::Error>> {
    Ok(Box::new(input_platform::NativeMouse::new()?))
}

#[cfg(not(all(
    feature = "native-input",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
)))]
fn native_sink() -> Result<Box<dyn InputSink>, Box<dyn std::error::Error>> {
    Err(crate::models::input::InputError::NotSupported.into())
}

#[cfg(feature = "camera-opencv")]
fn open_camera(config: &Config) -> Result<Box<dyn FrameSource + Send>, Box<dyn std::error::Error>> {
    println!("Connecting to {}...", config.camera);
    let camera = crate::platform::capture::PlatformCamera::open(&config.camera)?;
    println!("✓ Connected");
    Ok(Box::new(camera))
}

#[cfg(not(feature = "camera-opencv"))]
fn open_camera(_config: &Config) -> Result<Box<dyn FrameSource + Send>, Box<dyn std::error::Error>> {
    Err("Camera capture not compiled in (enable the 'camera-opencv' feature, or use --replay)".into())
}

#[cfg(feature = "camera-opencv")]
fn open_preview(config: &Config) -> Box<dyn Preview> {
    use crate::platform::capture::PlatformPreview;

    if config.preview {
        Box::new(PlatformPreview::window())
    } else {
        Box::new(PlatformPreview::headless())
    }
}

#[cfg(not(feature = "camera-opencv"))]
fn open_preview(config: &Config) -> Box<dyn Preview> {
    if config.preview {
        log::info!("Preview window needs the 'camera-opencv' feature");
    }
    Box::new(crate::platform::capture::NullPreview)
}

/// Set `stop` when Ctrl-C arrives
fn stop_on_ctrl_c(stop: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("Ctrl-C handler unavailable: {}", e);
                return;
            }
        };

        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::Relaxed);
            }
        });
    });
}
