// ML model download and cache utilities
// Fetches the hand landmarker task file and keeps it next to the app

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HAND_LANDMARKER_URL: &str =
    "https://storage.googleapis.com/mediapipe-models/hand_landmarker/hand_landmarker/float16/1/hand_landmarker.task";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// ML model metadata
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// File name inside the model directory
    pub name: String,
    pub version: String,
    pub url: String,
    /// Published size, used to spot truncated downloads
    pub size_bytes: Option<u64>,
}

impl ModelInfo {
    /// Whether a file of `actual` bytes can be the full model (at least half the published size)
    pub fn is_complete(&self, actual: u64) -> bool {
        match self.size_bytes {
            Some(expected) => actual >= expected / 2,
            None => actual > 0,
        }
    }
}

/// Manages model files inside a single directory
pub struct ModelManager {
    cache_dir: PathBuf,
}

impl ModelManager {
    /// Create a new model manager with cache directory
    pub fn new(cache_dir: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Manager for the directory containing `model_path`, plus the file name within it
    pub fn for_path(model_path: &Path) -> Result<(Self, String), Box<dyn std::error::Error>> {
        let name = model_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| format!("Model path has no file name: {}", model_path.display()))?
            .to_string();

        let dir = match model_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok((Self::new(dir)?, name))
    }

    /// Check if a model is cached
    pub fn is_cached(&self, model: &ModelInfo) -> bool {
        self.get_model_path(&model.name).is_file()
    }

    /// Get the local path for a model
    pub fn get_model_path(&self, model_name: &str) -> PathBuf {
        self.cache_dir.join(model_name)
    }

    /// Fetch a model, replacing any existing copy. Returns the number of bytes written.
    pub fn fetch(&self, model: &ModelInfo) -> Result<u64, Box<dyn std::error::Error>> {
        let model_path = self.get_model_path(&model.name);
        // Written under a temporary name so a failed download never looks like a model
        let partial_path = self.get_model_path(&format!("{}.part", model.name));

        log::info!("Fetching model {} ({}) from {}", model.name, model.version, model.url);

        let written = match download(&model.url, &partial_path) {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&partial_path);
                return Err(e);
            }
        };

        fs::rename(&partial_path, &model_path)?;
        Ok(written)
    }
}

fn download(url: &str, destination: &Path) -> Result<u64, Box<dyn std::error::Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;

    let mut response = client.get(url).send()?.error_for_status()?;

    let mut file = fs::File::create(destination)?;
    let written = response.copy_to(&mut file)?;
    file.flush()?;

    Ok(written)
}

/// Human readable size in megabytes, e.g. "7.5 MB"
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

// ==============================================================================
// Predefined Model Configurations
// ==============================================================================

/// MediaPipe task bundles
pub mod mediapipe {
    use super::*;

    pub fn hand_landmarker() -> ModelInfo {
        ModelInfo {
            name: "hand_landmarker.task".to_string(),
            version: "float16/1".to_string(),
            url: HAND_LANDMARKER_URL.to_string(),
            size_bytes: Some(7_800_000), // ~7.8 MB
        }
    }
}
