use crate::query::PrivacyLevel;
use serde::{Deserialize, Serialize};

/// In-memory telemetry store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Hours of queries kept in memory (default: 24)
    #[serde(default = "default_max_log_age_hours")]
    pub max_log_age_hours: u32,

    /// Width of one OverTime slot in seconds (default: 600)
    #[serde(default = "default_overtime_interval")]
    pub overtime_interval_secs: u32,

    /// Garbage collection period in seconds (default: 3600)
    #[serde(default = "default_gc_interval")]
    pub gc_interval_secs: u64,

    /// Phase offset of the GC relative to the period boundary (default: -60)
    #[serde(default = "default_gc_delay")]
    pub gc_delay_secs: i64,

    /// Privacy level 0..=4 (default: 0, show everything)
    #[serde(default)]
    pub privacy_level: u8,

    /// Record AAAA queries (default: true)
    #[serde(default = "default_true")]
    pub analyze_aaaa: bool,

    /// Record only A and AAAA queries (default: false)
    #[serde(default)]
    pub analyze_only_a_aaaa: bool,

    /// Skip queries originating from the loopback address (default: false)
    #[serde(default)]
    pub ignore_localhost: bool,

    /// Snapshot persistence period in seconds (default: 60)
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_secs: u64,
}

impl TelemetryConfig {
    pub fn retention_secs(&self) -> i64 {
        i64::from(self.max_log_age_hours) * 3600
    }

    /// Slots needed to hold one full retention period plus one GC period of
    /// reserve.
    ///
    /// The window is only slid by the collector, so after a pass it must still
    /// reach past the next pass. Two extra slots cover the alignment of the
    /// oldest slot and a collector that wakes up late.
    pub fn overtime_slots(&self) -> usize {
        let width = u64::from(self.overtime_interval_secs.max(1));
        let retention = (self.retention_secs() as u64).div_ceil(width);
        let reserve = self.gc_interval_secs.div_ceil(width);
        (retention + reserve + 2) as usize
    }

    pub fn privacy(&self) -> PrivacyLevel {
        PrivacyLevel::from_level(self.privacy_level).unwrap_or(PrivacyLevel::Maximum)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_log_age_hours: default_max_log_age_hours(),
            overtime_interval_secs: default_overtime_interval(),
            gc_interval_secs: default_gc_interval(),
            gc_delay_secs: default_gc_delay(),
            privacy_level: 0,
            analyze_aaaa: true,
            analyze_only_a_aaaa: false,
            ignore_localhost: false,
            snapshot_interval_secs: default_snapshot_interval(),
        }
    }
}

fn default_max_log_age_hours() -> u32 {
    24
}

fn default_overtime_interval() -> u32 {
    600
}

fn default_gc_interval() -> u64 {
    3600
}

fn default_gc_delay() -> i64 {
    -60
}

fn default_true() -> bool {
    true
}

fn default_snapshot_interval() -> u64 {
    60
}
