//! Job admission and execution configuration.

use serde::{Deserialize, Serialize};

/// Admission-control and job-execution configuration.
///
/// `max_concurrent` is the slot count N: the hard bound on simultaneously
/// running conversion jobs. On the most memory-constrained deployment
/// target this is 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Maximum number of concurrently running jobs (N).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// How long a job may wait for a slot before being rejected, in seconds.
    #[serde(default = "default_queue_wait")]
    pub queue_wait_seconds: u64,
    /// Wall-clock execution ceiling for most job kinds, in seconds.
    #[serde(default = "default_execution_timeout")]
    pub execution_timeout_seconds: u64,
    /// Execution ceiling for document-conversion (pdf⇄word) jobs, in
    /// seconds. LibreOffice cold starts legitimately exceed the standard
    /// budget.
    #[serde(default = "default_office_timeout")]
    pub office_timeout_seconds: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_wait_seconds: default_queue_wait(),
            execution_timeout_seconds: default_execution_timeout(),
            office_timeout_seconds: default_office_timeout(),
        }
    }
}

fn default_max_concurrent() -> usize {
    1
}

fn default_queue_wait() -> u64 {
    30
}

fn default_execution_timeout() -> u64 {
    60
}

fn default_office_timeout() -> u64 {
    90
}
