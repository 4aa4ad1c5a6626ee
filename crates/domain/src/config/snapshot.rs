use serde::{Deserialize, Serialize};

/// Durable snapshot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotConfig {
    /// Path of the JSON snapshot file (default: "./sinkhole-snapshot.json")
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "./sinkhole-snapshot.json".to_string()
}
