//! Working-storage configuration.

use serde::{Deserialize, Serialize};

/// Working-storage configuration.
///
/// All artifacts live under `work_root` on local/ephemeral storage; nothing
/// is persisted beyond the retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for uploads, outputs, and scratch directories.
    #[serde(default = "default_work_root")]
    pub work_root: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Age in seconds after which the reaper deletes an artifact.
    ///
    /// Must exceed the maximum job lifetime (queue wait + execution
    /// ceiling); enforced by `AppConfig::validate`.
    #[serde(default = "default_retention")]
    pub retention_seconds: u64,
    /// Interval in seconds between reaper sweeps.
    #[serde(default = "default_reaper_interval")]
    pub reaper_interval_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            work_root: default_work_root(),
            max_upload_size_bytes: default_max_upload(),
            retention_seconds: default_retention(),
            reaper_interval_seconds: default_reaper_interval(),
        }
    }
}

fn default_work_root() -> String {
    "data/work".to_string()
}

fn default_max_upload() -> u64 {
    50 * 1024 * 1024
}

fn default_retention() -> u64 {
    600
}

fn default_reaper_interval() -> u64 {
    300
}
