//! TOML configuration
//!
//! Precedence is CLI > environment > file > defaults. The file is either
//! given explicitly or `vidpare.toml` in the working directory.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::adapters::FfmpegSettings;
use crate::engine::EngineSettings;
use crate::planner::{CutPolicy, PlannerSettings};
use crate::utils::logging::LogFormat;

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "vidpare.toml";

const MAX_CRF: u8 = 51;

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {origin}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// `[trim]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimSection {
    pub accuracy: CutPolicy,
    pub overwrite: bool,
    pub staging_dir: Option<PathBuf>,
    pub keyframe_tolerance: f64,
    pub min_copy_duration: f64,
}

impl Default for TrimSection {
    fn default() -> Self {
        let planner = PlannerSettings::default();
        Self {
            accuracy: planner.policy,
            overwrite: false,
            staging_dir: None,
            keyframe_tolerance: planner.keyframe_tolerance,
            min_copy_duration: planner.min_copy_duration,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub trim: TrimSection,
    pub ffmpeg: FfmpegSettings,
    pub logging: LoggingSection,
    /// File the values were loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "string")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&text, &format!("file {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load `explicit`, else the default file if present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply `VIDPARE_*` overrides read through `lookup`.
    ///
    /// Returns the names of the variables that were applied.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<Vec<&'static str>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();

        if let Some(value) = lookup("VIDPARE_FFMPEG_PATH") {
            self.ffmpeg.ffmpeg_path = PathBuf::from(value);
            applied.push("VIDPARE_FFMPEG_PATH");
        }
        if let Some(value) = lookup("VIDPARE_FFPROBE_PATH") {
            self.ffmpeg.ffprobe_path = PathBuf::from(value);
            applied.push("VIDPARE_FFPROBE_PATH");
        }
        if let Some(value) = lookup("VIDPARE_VIDEO_CODEC") {
            self.ffmpeg.video_codec = value;
            applied.push("VIDPARE_VIDEO_CODEC");
        }
        if let Some(value) = lookup("VIDPARE_CRF") {
            self.ffmpeg.crf = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("VIDPARE_CRF", format!("'{}' is not a number", value)))?;
            applied.push("VIDPARE_CRF");
        }
        if let Some(value) = lookup("VIDPARE_AUDIO_CODEC") {
            self.ffmpeg.audio_codec = value;
            applied.push("VIDPARE_AUDIO_CODEC");
        }
        if let Some(value) = lookup("VIDPARE_PRESET") {
            self.ffmpeg.preset = value;
            applied.push("VIDPARE_PRESET");
        }
        if let Some(value) = lookup("VIDPARE_THREADS") {
            self.ffmpeg.threads = value.trim().parse().map_err(|_| {
                ConfigError::invalid("VIDPARE_THREADS", format!("'{}' is not a thread count", value))
            })?;
            applied.push("VIDPARE_THREADS");
        }
        if let Some(value) = lookup("VIDPARE_OVERWRITE") {
            self.trim.overwrite = parse_flag(&value)
                .ok_or_else(|| ConfigError::invalid("VIDPARE_OVERWRITE", format!("'{}' is not a boolean", value)))?;
            applied.push("VIDPARE_OVERWRITE");
        }
        if let Some(value) = lookup("VIDPARE_STAGING_DIR") {
            self.trim.staging_dir = Some(PathBuf::from(value));
            applied.push("VIDPARE_STAGING_DIR");
        }

        self.validate()?;
        Ok(applied)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ffmpeg.crf > MAX_CRF {
            return Err(ConfigError::invalid(
                "ffmpeg.crf",
                format!("{} is out of range 0-{}", self.ffmpeg.crf, MAX_CRF),
            ));
        }
        if self.ffmpeg.threads == 0 {
            return Err(ConfigError::invalid("ffmpeg.threads", "must be at least 1"));
        }
        if self.ffmpeg.video_codec.trim().is_empty() {
            return Err(ConfigError::invalid("ffmpeg.video_codec", "must not be empty"));
        }
        if self.ffmpeg.audio_codec.trim().is_empty() {
            return Err(ConfigError::invalid("ffmpeg.audio_codec", "must not be empty"));
        }
        if !(self.trim.keyframe_tolerance.is_finite() && self.trim.keyframe_tolerance >= 0.0) {
            return Err(ConfigError::invalid(
                "trim.keyframe_tolerance",
                "must be a non-negative number of seconds",
            ));
        }
        if !(self.trim.min_copy_duration.is_finite() && self.trim.min_copy_duration >= 0.0) {
            return Err(ConfigError::invalid(
                "trim.min_copy_duration",
                "must be a non-negative number of seconds",
            ));
        }
        if self.logging.level.parse::<LevelFilter>().is_err() {
            return Err(ConfigError::invalid(
                "logging.level",
                format!("unknown level '{}'", self.logging.level),
            ));
        }
        Ok(())
    }

    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            policy: self.trim.accuracy,
            keyframe_tolerance: self.trim.keyframe_tolerance,
            min_copy_duration: self.trim.min_copy_duration,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            planner: self.planner_settings(),
            overwrite: self.trim.overwrite,
            staging_dir: self.trim.staging_dir.clone(),
        }
    }

    pub fn ffmpeg_settings(&self) -> FfmpegSettings {
        self.ffmpeg.clone()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
