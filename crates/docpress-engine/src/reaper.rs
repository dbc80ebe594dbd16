//! Background reaper — backstop cleanup for artifacts that escaped
//! per-job release (e.g. the process was killed mid-job).

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;

use docpress_core::config::storage::StorageConfig;

use crate::workspace::Workspace;

/// Periodic sweep that deletes any entry under the working roots whose
/// last-modified time is older than the retention window.
///
/// The retention window must exceed the maximum job lifetime (enforced at
/// config load), so the reaper can never delete an artifact a running job
/// still needs. Per-item failures are logged and skipped; a sweep never
/// fails as a whole.
#[derive(Debug)]
pub struct Reaper {
    roots: Vec<PathBuf>,
    retention: Duration,
    interval: Duration,
}

impl Reaper {
    /// Create a reaper over the workspace roots.
    pub fn new(workspace: &Workspace, config: &StorageConfig) -> Self {
        Self {
            roots: workspace.roots().iter().map(|p| p.to_path_buf()).collect(),
            retention: Duration::from_secs(config.retention_seconds),
            interval: Duration::from_secs(config.reaper_interval_seconds),
        }
    }

    /// Run sweeps on the configured interval until the cancel signal.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            interval_seconds = self.interval.as_secs(),
            retention_seconds = self.retention.as_secs(),
            "Reaper started"
        );

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!("Reaper received shutdown signal");
                        break;
                    }
                }
                _ = tokio::time::sleep(self.interval) => {
                    let removed = self.sweep().await;
                    if removed > 0 {
                        tracing::info!(removed, "Reaper removed orphaned artifacts");
                    }
                }
            }
        }
    }

    /// Sweep all roots once, returning how many entries were removed.
    pub async fn sweep(&self) -> u64 {
        let mut removed = 0u64;

        for root in &self.roots {
            let mut entries = match tokio::fs::read_dir(root).await {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "Reaper failed to read root, skipping");
                    continue;
                }
            };

            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                let metadata = match entry.metadata().await {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Reaper failed to stat entry, skipping");
                        continue;
                    }
                };

                let age = metadata
                    .modified()
                    .ok()
                    .and_then(|m| m.elapsed().ok())
                    .unwrap_or_default();

                if age <= self.retention {
                    continue;
                }

                let result = if metadata.is_dir() {
                    tokio::fs::remove_dir_all(&path).await
                } else {
                    tokio::fs::remove_file(&path).await
                };

                match result {
                    Ok(()) => {
                        tracing::debug!(path = %path.display(), age_seconds = age.as_secs(), "Reaped orphaned artifact");
                        removed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Reaper failed to remove entry");
                    }
                }
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaper_with_retention(workspace: &Workspace, retention_seconds: u64) -> Reaper {
        Reaper::new(
            workspace,
            &StorageConfig {
                work_root: String::new(),
                max_upload_size_bytes: 0,
                retention_seconds,
                reaper_interval_seconds: 300,
            },
        )
    }

    #[tokio::test]
    async fn reaps_entries_older_than_retention() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.ensure_dirs().await.unwrap();

        let orphan = workspace.uploads().join("orphan.pdf");
        let scratch = workspace.office_profiles().join("profile__dead");
        tokio::fs::write(&orphan, b"x").await.unwrap();
        tokio::fs::create_dir(&scratch).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Zero retention: anything with a positive age is an orphan.
        let reaper = reaper_with_retention(&workspace, 0);
        let removed = reaper.sweep().await;

        assert_eq!(removed, 2);
        assert!(!orphan.exists());
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn leaves_entries_younger_than_retention() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.ensure_dirs().await.unwrap();

        let fresh = workspace.outputs().join("fresh.pdf");
        tokio::fs::write(&fresh, b"x").await.unwrap();

        let reaper = reaper_with_retention(&workspace, 3600);
        let removed = reaper.sweep().await;

        assert_eq!(removed, 0);
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn missing_root_is_skipped() {
        let workspace = Workspace::new("/nonexistent/docpress-test-root");
        let reaper = reaper_with_retention(&workspace, 0);
        assert_eq!(reaper.sweep().await, 0);
    }
}
