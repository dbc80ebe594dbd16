//! Working-storage layout and collision-free artifact naming.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use docpress_core::error::AppError;

use crate::artifacts::ArtifactSet;

/// The working-storage roots every job's artifacts live under.
///
/// Uploads, generated outputs, and LibreOffice profile directories are kept
/// in separate subtrees so the reaper can sweep them uniformly.
#[derive(Debug, Clone)]
pub struct Workspace {
    uploads: PathBuf,
    outputs: PathBuf,
    office: PathBuf,
}

impl Workspace {
    /// Lay out the workspace under `work_root`.
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        let root = work_root.into();
        Self {
            uploads: root.join("uploads"),
            outputs: root.join("outputs"),
            office: root.join("office"),
        }
    }

    /// Create all working roots.
    pub async fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in self.roots() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::storage(format!("Failed to create working directory: {e}"))
            })?;
        }
        Ok(())
    }

    /// All roots, for the reaper sweep.
    pub fn roots(&self) -> [&Path; 3] {
        [&self.uploads, &self.outputs, &self.office]
    }

    /// Directory for staged upload files.
    pub fn uploads(&self) -> &Path {
        &self.uploads
    }

    /// Directory for generated output files.
    pub fn outputs(&self) -> &Path {
        &self.outputs
    }

    /// Directory for per-job LibreOffice profile directories.
    pub fn office_profiles(&self) -> &Path {
        &self.office
    }

    /// Write an uploaded file under the uploads root with a unique,
    /// sanitized name and register it as a job artifact.
    pub async fn stage_upload(
        &self,
        artifacts: &ArtifactSet,
        original_name: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<PathBuf, AppError> {
        let path = self.uploads.join(unique_filename(original_name, extension));
        artifacts.register(&path);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::storage(format!("Failed to stage upload: {e}")))?;
        Ok(path)
    }

    /// Reserve a unique output path under the outputs root and register it
    /// as a job artifact. The file itself is created by the collaborator.
    pub fn output_path(
        &self,
        artifacts: &ArtifactSet,
        original_name: &str,
        extension: &str,
    ) -> PathBuf {
        let path = self.outputs.join(unique_filename(original_name, extension));
        artifacts.register(&path);
        path
    }

    /// Create an empty per-job scratch directory under the office root and
    /// register it as a job artifact.
    pub async fn scratch_dir(
        &self,
        artifacts: &ArtifactSet,
        label: &str,
    ) -> Result<PathBuf, AppError> {
        let dir = self
            .office
            .join(format!("{}__{}", label, Uuid::now_v7().simple()));
        artifacts.register(&dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::storage(format!("Failed to create scratch directory: {e}")))?;
        Ok(dir)
    }
}

/// Sanitize a filename stem for safe filesystem usage. Strips path
/// components and anything outside alphanumerics, `-`, `_`, `.`.
pub fn sanitize_stem(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let sanitized: String = stem
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .take(120)
        .collect();

    if sanitized.is_empty() {
        "document".to_string()
    } else {
        sanitized
    }
}

/// Generate a unique filename: `[SanitizedStem]__[UUIDv7].[Extension]`.
///
/// Uniqueness is what keeps concurrent jobs' artifacts from colliding.
pub fn unique_filename(original_name: &str, extension: &str) -> String {
    format!(
        "{}__{}.{}",
        sanitize_stem(original_name),
        Uuid::now_v7().simple(),
        extension.trim_start_matches('.')
    )
}
