// Dependency smoke test behind `hand-mouse doctor`

use crate::core::config::Config;
use crate::core::ml_models::{self, format_size_mb};
use crate::platform::input;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    /// Usable, with reduced functionality
    Warning,
    Missing,
}

impl CheckStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "✓",
            CheckStatus::Warning => "⚠",
            CheckStatus::Missing => "✗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }
}

/// Run every check against the given configuration
pub fn run_checks(config: &Config) -> Vec<CheckResult> {
    vec![
        CheckResult::new("hand-mouse", CheckStatus::Ok, env!("CARGO_PKG_VERSION")),
        check_image(),
        check_mediapipe(),
        check_opencv(),
        check_input(),
        check_model(config),
        check_config(config),
    ]
}

/// Print results in a table and return whether everything required is present
pub fn print_report(results: &[CheckResult]) -> bool {
    println!("=== Dependency Check ===\n");
    for result in results {
        println!("  {} {:<12} {}", result.status.symbol(), result.name, result.detail);
    }
    println!();

    let missing = results
        .iter()
        .filter(|r| r.status == CheckStatus::Missing)
        .count();

    if missing == 0 {
        println!("All dependencies available.");
    } else {
        println!("{} check(s) failed.", missing);
    }

    missing == 0
}

fn check_image() -> CheckResult {
    let mut image = image::RgbImage::new(2, 1);
    image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
    let flipped = image::imageops::flip_horizontal(&image);

    if flipped.get_pixel(1, 0) == &image::Rgb([255, 0, 0]) {
        CheckResult::new("image", CheckStatus::Ok, "frame buffers and mirroring work")
    } else {
        CheckResult::new("image", CheckStatus::Missing, "mirroring produced unexpected pixels")
    }
}

#[cfg(feature = "ml-pyo3")]
fn check_mediapipe() -> CheckResult {
    use crate::platform::pose::mediapipe_bridge::pyo3_backend;

    match pyo3_backend::runtime_versions() {
        Ok((python, mediapipe)) => CheckResult::new(
            "mediapipe",
            CheckStatus::Ok,
            format!("MediaPipe {} (Python {})", mediapipe, python.lines().next().unwrap_or("")),
        ),
        Err(e) => CheckResult::new("mediapipe", CheckStatus::Missing, e),
    }
}

#[cfg(not(feature = "ml-pyo3"))]
fn check_mediapipe() -> CheckResult {
    CheckResult::new(
        "mediapipe",
        CheckStatus::Warning,
        "not compiled in (enable 'ml-pyo3'); only --replay runs are possible",
    )
}

#[cfg(feature = "camera-opencv")]
fn check_opencv() -> CheckResult {
    match opencv::core::get_version_string() {
        Ok(version) => CheckResult::new("opencv", CheckStatus::Ok, format!("OpenCV {}", version)),
        Err(e) => CheckResult::new("opencv", CheckStatus::Missing, e.to_string()),
    }
}

#[cfg(not(feature = "camera-opencv"))]
fn check_opencv() -> CheckResult {
    CheckResult::new(
        "opencv",
        CheckStatus::Warning,
        "not compiled in (enable 'camera-opencv'); no camera or preview",
    )
}

fn check_input() -> CheckResult {
    if !input::native_input_available() {
        return CheckResult::new(
            "input",
            CheckStatus::Warning,
            "not compiled in (enable 'native-input'); actions are only logged",
        );
    }

    native_input_status()
}

#[cfg(all(
    feature = "native-input",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
))]
fn native_input_status() -> CheckResult {
    use crate::platform::input::{InputSink, NativeMouse};

    match NativeMouse::new().and_then(|mouse| mouse.screen_size()) {
        Ok(screen) => CheckResult::new(
            "input",
            CheckStatus::Ok,
            format!("native injection, screen {}x{}", screen.width, screen.height),
        ),
        Err(e) => CheckResult::new("input", CheckStatus::Missing, e.to_string()),
    }
}

#[cfg(not(all(
    feature = "native-input",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
)))]
fn native_input_status() -> CheckResult {
    CheckResult::new("input", CheckStatus::Warning, "no native backend for this platform")
}

fn check_model(config: &Config) -> CheckResult {
    let expected = ml_models::mediapipe::hand_landmarker();

    match std::fs::metadata(&config.model_path) {
        Ok(metadata) if metadata.is_file() && !expected.is_complete(metadata.len()) => CheckResult::new(
            "model",
            CheckStatus::Warning,
            format!(
                "{} is only {}, likely a truncated download; run `hand-mouse download-model --force`",
                config.model_path.display(),
                format_size_mb(metadata.len())
            ),
        ),
        Ok(metadata) if metadata.is_file() => CheckResult::new(
            "model",
            CheckStatus::Ok,
            format!(
                "{} ({}, {})",
                config.model_path.display(),
                format_size_mb(metadata.len()),
                expected.version
            ),
        ),
        _ => CheckResult::new(
            "model",
            CheckStatus::Missing,
            format!(
                "{} not found; run `hand-mouse download-model`",
                config.model_path.display()
            ),
        ),
    }
}

fn check_config(config: &Config) -> CheckResult {
    match config.validate() {
        Ok(()) => CheckResult::new(
            "config",
            CheckStatus::Ok,
            format!("{} profile, camera {}", config.profile.to_string(), config.camera),
        ),
        Err(e) => CheckResult::new("config", CheckStatus::Missing, e.to_string()),
    }
}
