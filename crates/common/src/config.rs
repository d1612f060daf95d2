//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MoodscanError, MoodscanResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where analysis history is stored.
    pub data_dir: PathBuf,

    /// Camera capture settings.
    pub capture: CaptureDefaults,

    /// Text recognition settings.
    pub ocr: OcrConfig,

    /// Analysis behaviour.
    pub analysis: AnalysisConfig,

    /// User-facing notifications.
    pub notifications: NotificationConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Which way the camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user.
    User,
    /// Rear camera, facing away from the user.
    #[default]
    Environment,
}

/// Default camera parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Preferred stream width.
    pub width: u32,

    /// Preferred stream height.
    pub height: u32,

    /// Preferred camera direction.
    pub facing_mode: FacingMode,

    /// JPEG quality for captured frames (1-100).
    pub jpeg_quality: u8,
}

/// Text recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. "eng" or "eng+deu".
    pub language: String,

    /// Path or name of the tesseract executable.
    pub tesseract_path: PathBuf,
}

/// Analysis behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Persist every successful analysis to the history store.
    pub auto_save: bool,
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Whether notices are delivered at all.
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "moodscan=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            capture: CaptureDefaults::default(),
            ocr: OcrConfig::default(),
            analysis: AnalysisConfig::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing_mode: FacingMode::Environment,
            jpeg_quality: 80,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { auto_save: true }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        Self::try_load_from(config_path).unwrap_or_else(|e| {
            tracing::warn!("{e}");
            Self::default()
        })
    }

    /// Load config from an explicit path.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file
    /// is a `Config` error.
    pub fn try_load_from(config_path: &Path) -> MoodscanResult<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            MoodscanError::config(format!("failed to read {}: {e}", config_path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            MoodscanError::config(format!("failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Location of the analysis history file.
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.jsonl")
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("moodscan").join("config.json")
}

/// Default data directory.
fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("moodscan")
}
