use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::DEFAULT_MOVEMENT_THRESHOLD_MILES;
use crate::error::LiveRunError;
use crate::logging::LogConfig;
use crate::models::RunnerProfile;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Body measurements used for calorie estimation
    pub runner: RunnerProfile,

    /// Sample filtering and clock settings
    pub tracking: TrackingSettings,

    /// Log output settings
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Live tracking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSettings {
    /// Fixes closer than this to the previous fix are dropped as jitter
    pub movement_threshold_miles: f64,

    /// Countdown before the workout clock starts
    pub countdown_seconds: u64,

    /// Location polling cadence for live host adapters. Replays are driven by
    /// fix timestamps and do not poll.
    pub poll_interval_ms: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        TrackingSettings {
            movement_threshold_miles: DEFAULT_MOVEMENT_THRESHOLD_MILES,
            countdown_seconds: 10,
            poll_interval_ms: 1000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            runner: RunnerProfile::default(),
            tracking: TrackingSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LiveRunError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            LiveRunError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liverun")
            .join("config.toml")
    }

    /// Resolve the configuration to run with.
    ///
    /// An explicit `path` must load. Without one, the default file is used if
    /// it exists; a broken default file yields the built-in defaults together
    /// with the load error so the caller can report it once logging is up.
    pub fn load_or_default(
        path: Option<&Path>,
    ) -> crate::error::Result<(Self, Option<LiveRunError>)> {
        if let Some(path) = path {
            return Ok((Self::load_from_file(path)?, None));
        }

        let default_path = Self::default_config_path();
        if !default_path.exists() {
            return Ok((Self::default(), None));
        }

        match Self::load_from_file(&default_path) {
            Ok(config) => Ok((config, None)),
            Err(e) => Ok((Self::default(), Some(e))),
        }
    }

    /// Reject settings the calorie model, jitter filter or poller cannot use
    pub fn validate(&self) -> crate::error::Result<()> {
        let runner = &self.runner;
        if !(runner.height_cm > 0.0 && runner.weight_kg > 0.0 && runner.age_years > 0.0) {
            return Err(LiveRunError::Configuration(format!(
                "Runner height, weight and age must be positive (got {} cm, {} kg, {} years)",
                runner.height_cm, runner.weight_kg, runner.age_years
            )));
        }
        if !(self.tracking.movement_threshold_miles >= 0.0) {
            return Err(LiveRunError::Configuration(format!(
                "Movement threshold must be non-negative (got {})",
                self.tracking.movement_threshold_miles
            )));
        }
        if self.tracking.poll_interval_ms == 0 {
            return Err(LiveRunError::Configuration(
                "Poll interval must be at least 1 ms".to_string(),
            ));
        }
        Ok(())
    }
}
