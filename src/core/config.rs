use crate::core::cursor_mapper::DEFAULT_SMOOTHING;
use crate::core::gesture_classifier::DEFAULT_PINCH_THRESHOLD;
use crate::core::gesture_dispatcher::DispatchSettings;
use crate::models::capture::CameraSource;
use crate::models::pose::LandmarkerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CAMERA_URL: &str = "http://192.168.18.205:8080/video?320x240";

/// Trade-off between responsiveness and features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Smoothing, gestures and the preview window
    #[default]
    Standard,
    /// Cursor movement only, tuned for latency
    Fast,
}

impl Profile {
    pub fn to_string(&self) -> &'static str {
        match self {
            Profile::Standard => "standard",
            Profile::Fast => "fast",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Device index or http(s) stream URL
    pub camera: CameraSource,
    /// Hand landmarker model file
    pub model_path: PathBuf,
    pub profile: Profile,
    /// Thumb-to-index distance below which the hand is pinching
    pub pinch_threshold: f32,
    /// Weight of the previous cursor position (0.0 = no smoothing)
    pub smoothing: f64,
    pub click_cooldown_ms: u64,
    pub scroll_scale: f32,
    pub scroll_deadzone: i32,
    /// Buffered frames to discard per iteration
    pub drain_frames: u32,
    /// Drain before every read instead of after reads from a network stream
    pub drain_before_read: bool,
    /// Clicks and scrolling; when off only the cursor moves
    pub gestures_enabled: bool,
    pub min_hand_detection_confidence: f32,
    pub min_hand_presence_confidence: f32,
    pub min_tracking_confidence: f32,
    /// Show the annotated camera window
    pub preview: bool,
    /// Flip frames horizontally before detection
    pub mirror: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraSource::Url(DEFAULT_CAMERA_URL.to_string()),
            model_path: PathBuf::from("hand_landmarker.task"),
            profile: Profile::Standard,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            smoothing: DEFAULT_SMOOTHING,
            click_cooldown_ms: 500,
            scroll_scale: 500.0,
            scroll_deadzone: 10,
            drain_frames: 3,
            drain_before_read: false,
            gestures_enabled: true,
            min_hand_detection_confidence: 0.5,
            min_hand_presence_confidence: 0.5,
            min_tracking_confidence: 0.5,
            preview: true,
            mirror: true,
        }
    }
}

impl Config {
    /// Preset for a profile, keeping camera and model settings at their defaults
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self::default();
        config.apply_profile(profile);
        config
    }

    /// Overwrite the profile-controlled fields of an existing configuration
    pub fn apply_profile(&mut self, profile: Profile) {
        let preset = match profile {
            Profile::Standard => Self::default(),
            Profile::Fast => Self {
                smoothing: 0.0,
                drain_frames: 5,
                drain_before_read: true,
                gestures_enabled: false,
                min_hand_detection_confidence: 0.3,
                min_hand_presence_confidence: 0.3,
                min_tracking_confidence: 0.3,
                preview: false,
                mirror: false,
                ..Self::default()
            },
        };

        self.profile = profile;
        self.smoothing = preset.smoothing;
        self.drain_frames = preset.drain_frames;
        self.drain_before_read = preset.drain_before_read;
        self.gestures_enabled = preset.gestures_enabled;
        self.min_hand_detection_confidence = preset.min_hand_detection_confidence;
        self.min_hand_presence_confidence = preset.min_hand_presence_confidence;
        self.min_tracking_confidence = preset.min_tracking_confidence;
        self.preview = preset.preview;
        self.mirror = preset.mirror;
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            click_cooldown: Duration::from_millis(self.click_cooldown_ms),
            scroll_scale: self.scroll_scale,
            scroll_deadzone: self.scroll_deadzone,
        }
    }

    pub fn landmarker_config(&self) -> LandmarkerConfig {
        LandmarkerConfig {
            model_path: self.model_path.clone(),
            num_hands: 1,
            min_hand_detection_confidence: self.min_hand_detection_confidence,
            min_hand_presence_confidence: self.min_hand_presence_confidence,
            min_tracking_confidence: self.min_tracking_confidence,
        }
    }

    /// Load configuration from the default location, creating it with defaults if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !(self.pinch_threshold > 0.0 && self.pinch_threshold < 1.0) {
            return Err(format!(
                "Invalid pinch threshold: {}. Must be between 0.0 and 1.0 (exclusive)",
                self.pinch_threshold
            )
            .into());
        }

        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(format!(
                "Invalid smoothing: {}. Must be at least 0.0 and below 1.0",
                self.smoothing
            )
            .into());
        }

        if self.click_cooldown_ms > 10_000 {
            return Err(format!(
                "Invalid click cooldown: {} ms. Must be at most 10000",
                self.click_cooldown_ms
            )
            .into());
        }

        if !(self.scroll_scale > 0.0) {
            return Err(format!("Invalid scroll scale: {}. Must be positive", self.scroll_scale).into());
        }

        if self.scroll_deadzone < 0 {
            return Err(format!(
                "Invalid scroll dead zone: {}. Must not be negative",
                self.scroll_deadzone
            )
            .into());
        }

        if self.drain_frames > 30 {
            return Err(format!("Invalid drain frames: {}. Must be at most 30", self.drain_frames).into());
        }

        let confidences = [
            ("detection", self.min_hand_detection_confidence),
            ("presence", self.min_hand_presence_confidence),
            ("tracking", self.min_tracking_confidence),
        ];
        for (name, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!(
                    "Invalid {} confidence: {}. Must be between 0.0 and 1.0",
                    name, value
                )
                .into());
            }
        }

        if self.model_path.as_os_str().is_empty() {
            return Err("Model path cannot be empty".into());
        }

        if let CameraSource::Url(url) = &self.camera {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("Invalid camera URL: {}. Must be http(s)", url).into());
            }
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> Result<Self, Box<dyn std::error::Error>> {
        Self::reset_at(&Self::get_config_path()?)
    }

    pub fn reset_at(config_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::default();
        config.save_to(config_path)?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| "Could not determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".hand_mouse");
        path.push("settings.json");

        Ok(path)
    }
}
