//! Structured subprocess invocation for external converters.
//!
//! Arguments are passed as a discrete vector with no shell interpretation,
//! so user-controlled filenames and options cannot inject commands.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::ConversionError;

/// Parameters for one converter invocation.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// The command to execute.
    pub command: String,
    /// Discrete arguments, no shell involved.
    pub args: Vec<String>,
    /// Timeout for the process.
    pub timeout: Duration,
    /// Path where the converter is expected to write its output, if the
    /// caller wants existence verified.
    pub expected_output: Option<PathBuf>,
}

/// Runs external converter processes with timeout management and output
/// capturing.
#[derive(Debug, Clone, Default)]
pub struct ToolRunner;

impl ToolRunner {
    pub fn new() -> Self {
        Self
    }

    /// Execute a converter invocation.
    ///
    /// The child is spawned with `kill_on_drop`, so if the caller's future
    /// is dropped (execution deadline expiry) the process is signaled to
    /// stop best-effort without blocking the response.
    pub async fn run(&self, invocation: &ToolInvocation) -> Result<(), ConversionError> {
        let start = std::time::Instant::now();

        tracing::info!(
            command = %invocation.command,
            args = ?invocation.args,
            "Executing converter"
        );

        let output = Command::new(&invocation.command)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(invocation.timeout, output).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(command = %invocation.command, "Converter binary not found");
                return Err(ConversionError::CommandNotFound(invocation.command.clone()));
            }
            Ok(Err(e)) => return Err(ConversionError::Io(e)),
            Err(_) => {
                tracing::error!(
                    command = %invocation.command,
                    timeout_seconds = invocation.timeout.as_secs(),
                    "Converter timed out"
                );
                // Backstop for when the runner is used outside the
                // executor's own budget.
                return Err(ConversionError::Timeout(invocation.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                command = %invocation.command,
                exit_code = code,
                stderr = %stderr.chars().take(500).collect::<String>(),
                "Converter failed"
            );
            return Err(ConversionError::ProcessFailed {
                code,
                stderr: stderr.chars().take(2000).collect(),
            });
        }

        if let Some(ref expected) = invocation.expected_output {
            if !file_exists_nonempty(expected).await {
                tracing::error!(
                    command = %invocation.command,
                    "Converter succeeded but expected output is missing or empty"
                );
                return Err(ConversionError::OutputMissing);
            }
        }

        tracing::info!(
            command = %invocation.command,
            duration_ms = start.elapsed().as_millis() as u64,
            "Converter completed"
        );

        Ok(())
    }
}

async fn file_exists_nonempty(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(m) => m.is_file() && m.len() > 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(command: &str, args: &[&str]) -> ToolInvocation {
        ToolInvocation {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(5),
            expected_output: None,
        }
    }

    #[tokio::test]
    async fn missing_command_is_classified() {
        let err = ToolRunner::new()
            .run(&invocation("definitely-not-a-real-binary-51c2", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::CommandNotFound(_)));
    }

    #[tokio::test]
    async fn overrunning_process_is_classified_as_timeout() {
        let mut inv = invocation("sleep", &["5"]);
        inv.timeout = Duration::from_millis(50);
        let err = ToolRunner::new().run(&inv).await.unwrap_err();
        assert!(matches!(err, ConversionError::Timeout(_)));
    }

    #[tokio::test]
    async fn nonzero_exit_is_classified() {
        let err = ToolRunner::new()
            .run(&invocation("false", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::ProcessFailed { .. }));
    }

    #[tokio::test]
    async fn missing_expected_output_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let mut inv = invocation("true", &[]);
        inv.expected_output = Some(dir.path().join("never-written.pdf"));
        let err = ToolRunner::new().run(&inv).await.unwrap_err();
        assert!(matches!(err, ConversionError::OutputMissing));
    }

    #[tokio::test]
    async fn successful_run_with_output_passes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        tokio::fs::write(&out, b"data").await.unwrap();
        let mut inv = invocation("true", &[]);
        inv.expected_output = Some(out);
        assert!(ToolRunner::new().run(&inv).await.is_ok());
    }
}
