//! Capability detection for optional external converter binaries.

use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;

use docpress_core::config::tools::{ToolConfig, ToolsConfig};

/// How long a version query may run before the tool is declared absent.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Availability of each optional collaborator, for health reporting and
/// fallback dispatch.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolAvailability {
    pub ghostscript: bool,
    pub libreoffice: bool,
    pub pdftoppm: bool,
}

/// Probes optional external tools by running a trivial version query.
///
/// Results are not cached: re-probing per call tolerates a tool being
/// installed or removed without a restart, and one subprocess spawn is
/// negligible next to a conversion job.
#[derive(Debug, Clone)]
pub struct ToolProbe {
    tools: ToolsConfig,
}

impl ToolProbe {
    /// Create a probe over the configured tool set.
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    /// Whether Ghostscript can be invoked.
    pub async fn ghostscript_available(&self) -> bool {
        probe(&self.tools.ghostscript, &["--version"]).await
    }

    /// Whether LibreOffice can be invoked.
    pub async fn libreoffice_available(&self) -> bool {
        probe(&self.tools.libreoffice, &["--version"]).await
    }

    /// Whether pdftoppm can be invoked.
    pub async fn pdftoppm_available(&self) -> bool {
        probe(&self.tools.pdftoppm, &["-v"]).await
    }

    /// Availability of every optional tool.
    pub async fn availability(&self) -> ToolAvailability {
        ToolAvailability {
            ghostscript: self.ghostscript_available().await,
            libreoffice: self.libreoffice_available().await,
            pdftoppm: self.pdftoppm_available().await,
        }
    }
}

/// Run `command <args>` and report whether the tool is invokable.
///
/// Never errors: a missing binary, permission failure, crash (killed by
/// signal), or hang past the probe timeout all read as "not available".
/// A version query that exits with a non-zero code still ran, so it
/// counts as available.
async fn probe(tool: &ToolConfig, args: &[&str]) -> bool {
    if !tool.enabled {
        return false;
    }

    let status = Command::new(&tool.command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    match tokio::time::timeout(PROBE_TIMEOUT, status).await {
        Ok(Ok(status)) => status.code().is_some(),
        Ok(Err(e)) => {
            tracing::debug!(command = %tool.command, error = %e, "Tool probe failed to spawn");
            false
        }
        Err(_) => {
            tracing::warn!(command = %tool.command, "Tool probe timed out");
            false
        }
    }
}
