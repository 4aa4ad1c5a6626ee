use serde::{Deserialize, Serialize};

/// Gravity list database and classification options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GravityConfig {
    /// Path to the gravity SQLite database (default: "/etc/pihole/gravity.db")
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// How long a lookup waits on a busy database, in milliseconds (default: 1000)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Compile regex entries case-insensitively (default: false)
    #[serde(default)]
    pub regex_ignore_case: bool,

    /// Classify every CNAME hop, not only the queried name (default: true)
    #[serde(default = "default_true")]
    pub cname_inspection: bool,

    /// Full list reload cadence in seconds (default: 3600)
    #[serde(default = "default_reload_interval")]
    pub reload_interval_secs: u64,

    /// Retry cadence for degraded list categories in seconds (default: 10)
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            regex_ignore_case: false,
            cname_inspection: true,
            reload_interval_secs: default_reload_interval(),
            retry_interval_secs: default_retry_interval(),
        }
    }
}

fn default_database_path() -> String {
    "/etc/pihole/gravity.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_reload_interval() -> u64 {
    3600
}

fn default_retry_interval() -> u64 {
    10
}
