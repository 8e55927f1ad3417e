// src/config.rs - Tunable thresholds and model settings, persisted as JSON
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "gesture_config.json";

/// Longest cooldown a config file may ask for.
pub const MAX_COOLDOWN_SECS: f64 = 60.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No suitable config directory available")]
    NoConfigDir,
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// 3D thumb-to-index distance below which the hand is pinching.
    pub pinch_threshold: f64,
    /// Vertical index-tip movement needed for one volume step.
    pub volume_move_threshold: f64,
    /// Minimum thumb-to-index distance for a fist.
    pub fist_distance_threshold: f64,
    /// Wrist-to-nose offset (both axes) under which a fist is vetoed.
    pub face_proximity_threshold: f64,
    pub cooldown_secs: f64,
    pub stability_frames: usize,
    pub smoothing_window: usize,
    pub buffer_size: usize,
    /// Frames between model inference attempts.
    pub inference_interval: u64,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: Option<PathBuf>,
    pub default_confidence: f64,
    /// Per-label confidence overrides, keyed by raw or cleaned label.
    pub gesture_thresholds: BTreeMap<String, f64>,
    /// Substrings marking background / negative training classes.
    pub negative_markers: Vec<String>,
    /// Training-time suffixes stripped from emitted labels.
    pub label_suffixes: Vec<String>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.045,
            volume_move_threshold: 0.025,
            fist_distance_threshold: 0.1,
            face_proximity_threshold: 0.25,
            cooldown_secs: 0.8,
            stability_frames: 5,
            smoothing_window: 3,
            buffer_size: 20,
            inference_interval: 5,
            model: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let mut gesture_thresholds = BTreeMap::new();
        gesture_thresholds.insert("play_pause".to_string(), 0.85);
        gesture_thresholds.insert("next_track".to_string(), 0.85);
        gesture_thresholds.insert("prev_track".to_string(), 0.9);

        Self {
            model_path: None,
            default_confidence: 0.8,
            gesture_thresholds,
            negative_markers: vec!["falso_positivo".to_string(), "no_accion".to_string()],
            label_suffixes: vec!["_INTENCIONAL".to_string(), "_INTENTIONAL".to_string()],
        }
    }
}

impl GestureConfig {
    /// Non-positive or NaN means no cooldown; anything too large for a
    /// `Duration` saturates instead of wrapping to zero.
    pub fn cooldown(&self) -> Duration {
        if self.cooldown_secs.is_nan() || self.cooldown_secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.cooldown_secs).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("pinch_threshold", self.pinch_threshold),
            ("volume_move_threshold", self.volume_move_threshold),
            ("fist_distance_threshold", self.fist_distance_threshold),
            ("face_proximity_threshold", self.face_proximity_threshold),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(0.0..=MAX_COOLDOWN_SECS).contains(&self.cooldown_secs) {
            return Err(ConfigError::Invalid(format!(
                "cooldown_secs must be within [0, {MAX_COOLDOWN_SECS}], got {}",
                self.cooldown_secs
            )));
        }

        let counts = [
            ("stability_frames", self.stability_frames),
            ("smoothing_window", self.smoothing_window),
            ("buffer_size", self.buffer_size),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        if self.inference_interval == 0 {
            return Err(ConfigError::Invalid("inference_interval must be at least 1".into()));
        }

        let confidences = std::iter::once(("default_confidence", self.model.default_confidence))
            .chain(
                self.model
                    .gesture_thresholds
                    .iter()
                    .map(|(label, value)| (label.as_str(), *value)),
            );
        for (name, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "confidence for {name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// `<platform config dir>/gesture_config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("com", "gesturecontrol", "gesture_server")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` (or the platform default). A missing file means defaults;
    /// a file that exists but is broken is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load(&path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
