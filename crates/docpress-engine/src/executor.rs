//! Job executor — runs one admitted job under a wall-clock budget with
//! unconditional artifact release.

use std::time::Duration;

use bytes::Bytes;

use docpress_core::config::jobs::JobsConfig;
use docpress_core::error::AppError;

use crate::artifacts::ArtifactSet;
use crate::job::Job;

/// The finished product of a successful job, fully read into memory so
/// every filesystem artifact can be deleted before the response is sent.
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// Filename offered to the client in the content-disposition header.
    pub filename: String,
    /// MIME type of the body.
    pub content_type: String,
    /// The output bytes.
    pub data: Bytes,
}

/// Runs one job to completion: delegates to the conversion future,
/// enforces the execution deadline, classifies the outcome, and releases
/// every registered artifact on every exit path.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    standard_budget: Duration,
    office_budget: Duration,
}

impl JobExecutor {
    /// Create an executor with budgets from config.
    pub fn new(config: &JobsConfig) -> Self {
        Self {
            standard_budget: Duration::from_secs(config.execution_timeout_seconds),
            office_budget: Duration::from_secs(config.office_timeout_seconds),
        }
    }

    /// Execution ceiling for a job kind.
    pub fn budget_for(&self, job: &Job) -> Duration {
        if job.kind.uses_office_budget() {
            self.office_budget
        } else {
            self.standard_budget
        }
    }

    /// Run `work` for an admitted job.
    ///
    /// On deadline expiry the work future is dropped, which kills any
    /// still-running collaborator process (spawned with `kill_on_drop`)
    /// best-effort, and the job is classified as timed out. Whatever the
    /// outcome — success, failure, or timeout — every artifact registered
    /// for the job is deleted before this returns, so no exit path can
    /// leak a file or scratch directory.
    pub async fn execute<F>(
        &self,
        job: &Job,
        artifacts: &ArtifactSet,
        work: F,
    ) -> Result<JobOutput, AppError>
    where
        F: std::future::Future<Output = Result<JobOutput, AppError>>,
    {
        let budget = self.budget_for(job);
        let started = std::time::Instant::now();

        let result = match tokio::time::timeout(budget, work).await {
            Ok(Ok(output)) => {
                tracing::info!(
                    job_id = %job.id,
                    kind = %job.kind,
                    duration_ms = started.elapsed().as_millis() as u64,
                    output_bytes = output.data.len(),
                    "Job succeeded"
                );
                Ok(output)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    job_id = %job.id,
                    kind = %job.kind,
                    error = %e,
                    "Job failed"
                );
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    job_id = %job.id,
                    kind = %job.kind,
                    budget_seconds = budget.as_secs(),
                    "Job timed out"
                );
                Err(AppError::timeout(format!(
                    "{} did not finish within {} seconds",
                    job.kind,
                    budget.as_secs()
                )))
            }
        };

        artifacts.release_all().await;
        result
    }
}
