use super::{ConfigError, GravityConfig, LoggingConfig, SnapshotConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub gravity: GravityConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(Path::new(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.telemetry;
        if t.max_log_age_hours == 0 {
            return Err(ConfigError::Validation(
                "telemetry.max_log_age_hours must be at least 1".to_string(),
            ));
        }
        if t.overtime_interval_secs == 0 || 3600 % t.overtime_interval_secs != 0 {
            return Err(ConfigError::Validation(format!(
                "telemetry.overtime_interval_secs ({}) must divide one hour",
                t.overtime_interval_secs
            )));
        }
        if t.gc_interval_secs == 0 || t.snapshot_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "telemetry intervals must be greater than zero".to_string(),
            ));
        }
        if t.gc_delay_secs.unsigned_abs() >= t.gc_interval_secs {
            return Err(ConfigError::Validation(
                "telemetry.gc_delay_secs must be shorter than the GC interval".to_string(),
            ));
        }
        if t.privacy_level > 4 {
            return Err(ConfigError::Validation(format!(
                "telemetry.privacy_level ({}) must be between 0 and 4",
                t.privacy_level
            )));
        }

        let g = &self.gravity;
        if g.database_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gravity.database_path cannot be empty".to_string(),
            ));
        }
        if g.reload_interval_secs == 0 || g.retry_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "gravity intervals must be greater than zero".to_string(),
            ));
        }

        if !self.logging.has_valid_level() {
            return Err(ConfigError::Validation(format!(
                "logging.level ({}) is not a known level",
                self.logging.level
            )));
        }

        if self.snapshot.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "snapshot.path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
