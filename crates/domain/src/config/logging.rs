use serde::{Deserialize, Serialize};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration, consumed by whoever installs the subscriber
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (default: "info")
    /// Options: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log every evicted query during garbage collection (default: false)
    #[serde(default)]
    pub debug_gc: bool,
}

impl LoggingConfig {
    pub fn has_valid_level(&self) -> bool {
        LEVELS.iter().any(|l| l.eq_ignore_ascii_case(&self.level))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug_gc: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
