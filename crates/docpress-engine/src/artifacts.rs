//! Per-job artifact tracking with guaranteed, never-failing release.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::job::JobId;

/// Tracks every filesystem artifact (file or scratch directory) created in
/// service of one job, and deletes them exactly once.
///
/// `release_all` runs on cleanup paths where raising would mask the
/// original error, so deletion failures are logged and swallowed. The set
/// is drained on release, making a second call a no-op.
#[derive(Debug)]
pub struct ArtifactSet {
    job_id: JobId,
    paths: Mutex<BTreeSet<PathBuf>>,
}

impl ArtifactSet {
    /// Create an empty artifact set for a job.
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            paths: Mutex::new(BTreeSet::new()),
        }
    }

    /// Record an artifact path. Idempotent for the same path.
    pub fn register(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::trace!(job_id = %self.job_id, path = %path.display(), "Artifact registered");
        self.paths
            .lock()
            .expect("artifact set lock poisoned")
            .insert(path);
    }

    /// Number of currently tracked artifacts.
    pub fn len(&self) -> usize {
        self.paths.lock().expect("artifact set lock poisoned").len()
    }

    /// Whether no artifacts are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delete every registered artifact. Never fails; a second call is a
    /// no-op because the first drains the set.
    pub async fn release_all(&self) {
        let paths: Vec<PathBuf> = {
            let mut guard = self.paths.lock().expect("artifact set lock poisoned");
            std::mem::take(&mut *guard).into_iter().collect()
        };

        if paths.is_empty() {
            return;
        }

        let mut removed = 0usize;
        for path in &paths {
            if remove_path(path).await {
                removed += 1;
            }
        }

        tracing::debug!(
            job_id = %self.job_id,
            removed,
            tracked = paths.len(),
            "Artifacts released"
        );
    }
}

/// Remove one path, directories recursively. Returns whether something was
/// actually deleted.
async fn remove_path(path: &Path) -> bool {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(m) => m,
        // Already gone (e.g. a collaborator consumed it) — nothing to do.
        Err(_) => return false,
    };

    let result = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove artifact");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn releases_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("upload.pdf");
        let scratch = dir.path().join("profile");
        tokio::fs::write(&file, b"x").await.unwrap();
        tokio::fs::create_dir(&scratch).await.unwrap();
        tokio::fs::write(scratch.join("inner.tmp"), b"y")
            .await
            .unwrap();

        let artifacts = ArtifactSet::new(JobId::new());
        artifacts.register(&file);
        artifacts.register(&scratch);
        artifacts.release_all().await;

        assert!(!file.exists());
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn register_is_idempotent() {
        let artifacts = ArtifactSet::new(JobId::new());
        artifacts.register("/tmp/same-path");
        artifacts.register("/tmp/same-path");
        assert_eq!(artifacts.len(), 1);
    }

    #[tokio::test]
    async fn double_release_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("once.pdf");
        tokio::fs::write(&file, b"x").await.unwrap();

        let artifacts = ArtifactSet::new(JobId::new());
        artifacts.register(&file);
        artifacts.release_all().await;
        assert!(artifacts.is_empty());

        // Second call must not fail even though the file is gone.
        artifacts.release_all().await;
        assert!(artifacts.is_empty());
    }

    #[tokio::test]
    async fn missing_paths_are_swallowed() {
        let artifacts = ArtifactSet::new(JobId::new());
        artifacts.register("/nonexistent/never-created.pdf");
        artifacts.release_all().await;
    }
}
