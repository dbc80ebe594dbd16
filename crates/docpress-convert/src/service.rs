//! Per-kind conversion orchestration.
//!
//! [`ConversionService`] owns the collaborator wiring: staging uploads into
//! working storage, dispatching to in-process (`lopdf`, `image`) or external
//! (Ghostscript, LibreOffice, pdftoppm) collaborators, falling back where a
//! degraded in-process path exists, and packaging multi-file results.
//! Every filesystem path it touches is registered on the job's
//! [`ArtifactSet`] before use, so the executor's unconditional release
//! covers it.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;

use docpress_core::config::jobs::JobsConfig;
use docpress_core::config::tools::ToolsConfig;
use docpress_core::error::AppError;
use docpress_engine::artifacts::ArtifactSet;
use docpress_engine::executor::JobOutput;
use docpress_engine::workspace::{Workspace, sanitize_stem};

use crate::error::ConversionError;
use crate::exec::ToolRunner;
use crate::ghostscript::{self, Quality};
use crate::{imaging, office, package, pdf, rasterize};

const PDF_MIME: &str = "application/pdf";
const ZIP_MIME: &str = "application/zip";
const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Office-document extensions accepted for word-to-pdf conversion.
const OFFICE_EXTENSIONS: &[&str] = &["doc", "docx", "odt", "rtf", "txt"];

/// One uploaded file, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename, unsanitized.
    pub original_name: String,
    /// File content.
    pub data: Bytes,
}

/// Client options for PDF compression.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    /// Explicit quality preset name; wins over `target_size_kb`.
    pub quality: Option<String>,
    /// Desired output size, used to derive a preset when no explicit
    /// quality is given.
    pub target_size_kb: Option<u64>,
}

/// Client options for PDF rasterization.
#[derive(Debug, Clone)]
pub struct RasterizeOptions {
    /// Render resolution in dots per inch.
    pub dpi: u32,
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        Self { dpi: 150 }
    }
}

/// Orchestrates one conversion per call, delegating to collaborators.
#[derive(Debug, Clone)]
pub struct ConversionService {
    workspace: Workspace,
    runner: ToolRunner,
    tools: ToolsConfig,
    standard_timeout: Duration,
    office_timeout: Duration,
}

impl ConversionService {
    pub fn new(workspace: Workspace, tools: ToolsConfig, jobs: &JobsConfig) -> Self {
        Self {
            workspace,
            runner: ToolRunner::new(),
            tools,
            standard_timeout: Duration::from_secs(jobs.execution_timeout_seconds),
            office_timeout: Duration::from_secs(jobs.office_timeout_seconds),
        }
    }

    /// Check a compress request. Runs before the job takes a slot.
    pub fn validate_compress(
        &self,
        file: &UploadedFile,
        options: &CompressOptions,
    ) -> Result<(), AppError> {
        ensure_pdf(file)?;
        resolve_quality(options, file.data.len() as u64)?;
        Ok(())
    }

    /// Check a merge request. Runs before the job takes a slot.
    pub fn validate_merge(&self, files: &[UploadedFile]) -> Result<(), AppError> {
        if files.len() < 2 {
            return Err(AppError::validation(
                "Merging requires at least two PDF files",
            ));
        }
        files.iter().try_for_each(ensure_pdf)
    }

    /// Check a split request. Runs before the job takes a slot.
    pub fn validate_split(&self, file: &UploadedFile) -> Result<(), AppError> {
        ensure_pdf(file)
    }

    /// Check an image-to-pdf request. Runs before the job takes a slot.
    pub fn validate_image_to_pdf(&self, files: &[UploadedFile]) -> Result<(), AppError> {
        if files.is_empty() {
            return Err(AppError::validation("At least one image is required"));
        }
        for file in files {
            if file.data.is_empty() {
                return Err(AppError::validation(format!(
                    "Uploaded file '{}' is empty",
                    sanitize_stem(&file.original_name)
                )));
            }
        }
        Ok(())
    }

    /// Check a pdf-to-image request. Runs before the job takes a slot.
    pub fn validate_pdf_to_image(
        &self,
        file: &UploadedFile,
        options: &RasterizeOptions,
    ) -> Result<(), AppError> {
        ensure_pdf(file)?;
        if !(30..=600).contains(&options.dpi) {
            return Err(AppError::validation("dpi must be between 30 and 600"));
        }
        if !self.tools.pdftoppm.enabled {
            return Err(AppError::feature_unavailable(
                "PDF rasterization is not enabled on this server",
            ));
        }
        Ok(())
    }

    /// Check a pdf-to-word request. Runs before the job takes a slot.
    pub fn validate_pdf_to_word(&self, file: &UploadedFile) -> Result<(), AppError> {
        ensure_pdf(file)?;
        self.ensure_office_enabled()
    }

    /// Check a word-to-pdf request. Runs before the job takes a slot.
    pub fn validate_word_to_pdf(&self, file: &UploadedFile) -> Result<(), AppError> {
        if file.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        let ext = extension_of(&file.original_name).ok_or_else(|| {
            AppError::validation("Uploaded file has no recognizable extension")
        })?;
        if !OFFICE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::validation(format!(
                "Unsupported document format '.{ext}'"
            )));
        }
        self.ensure_office_enabled()
    }

    fn ensure_office_enabled(&self) -> Result<(), AppError> {
        if !self.tools.libreoffice.enabled {
            return Err(AppError::feature_unavailable(
                "Document conversion is not enabled on this server",
            ));
        }
        Ok(())
    }

    /// Compress a PDF. Prefers Ghostscript; falls back to an in-process
    /// strip-and-resave when Ghostscript is disabled, missing, or fails.
    pub async fn compress(
        &self,
        artifacts: &ArtifactSet,
        file: UploadedFile,
        options: CompressOptions,
    ) -> Result<JobOutput, AppError> {
        self.validate_compress(&file, &options)?;
        let quality = resolve_quality(&options, file.data.len() as u64)?;
        let stem = sanitize_stem(&file.original_name);

        let data = if self.tools.ghostscript.enabled {
            match self.compress_with_ghostscript(artifacts, &file, quality).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Ghostscript compression unavailable, using in-process fallback"
                    );
                    self.compress_fallback(file.data.clone()).await?
                }
            }
        } else {
            self.compress_fallback(file.data.clone()).await?
        };

        Ok(JobOutput {
            filename: format!("{stem}_compressed.pdf"),
            content_type: PDF_MIME.to_string(),
            data,
        })
    }

    async fn compress_with_ghostscript(
        &self,
        artifacts: &ArtifactSet,
        file: &UploadedFile,
        quality: Quality,
    ) -> Result<Bytes, AppError> {
        let input = self
            .workspace
            .stage_upload(artifacts, &file.original_name, "pdf", &file.data)
            .await?;
        let output = self
            .workspace
            .output_path(artifacts, &file.original_name, "pdf");

        ghostscript::compress_pdf(
            &self.runner,
            &self.tools.ghostscript.command,
            &input,
            &output,
            quality,
            self.standard_timeout,
        )
        .await?;

        read_bytes(&output).await
    }

    async fn compress_fallback(&self, data: Bytes) -> Result<Bytes, AppError> {
        let out = run_blocking(move || pdf::strip_and_resave(&data)).await?;
        Ok(Bytes::from(out))
    }

    /// Merge two or more PDFs into one, preserving upload order.
    pub async fn merge(
        &self,
        _artifacts: &ArtifactSet,
        files: Vec<UploadedFile>,
    ) -> Result<JobOutput, AppError> {
        self.validate_merge(&files)?;

        let inputs: Vec<Vec<u8>> = files.iter().map(|f| f.data.to_vec()).collect();
        let merged = run_blocking(move || pdf::merge(&inputs)).await?;

        Ok(JobOutput {
            filename: "merged.pdf".to_string(),
            content_type: PDF_MIME.to_string(),
            data: Bytes::from(merged),
        })
    }

    /// Split a PDF into one file per page, packaged as a ZIP archive.
    pub async fn split(
        &self,
        _artifacts: &ArtifactSet,
        file: UploadedFile,
    ) -> Result<JobOutput, AppError> {
        self.validate_split(&file)?;
        let stem = sanitize_stem(&file.original_name);

        let data = file.data.clone();
        let entry_stem = stem.clone();
        let archive = run_blocking(move || {
            let pages = pdf::split(&data)?;
            let entries: Vec<(String, Vec<u8>)> = pages
                .into_iter()
                .enumerate()
                .map(|(i, page)| (format!("{}_page_{}.pdf", entry_stem, i + 1), page))
                .collect();
            package::zip_files(&entries)
        })
        .await?;

        Ok(JobOutput {
            filename: format!("{stem}_pages.zip"),
            content_type: ZIP_MIME.to_string(),
            data: Bytes::from(archive),
        })
    }

    /// Assemble one or more images into a single PDF, one page per image.
    pub async fn image_to_pdf(
        &self,
        _artifacts: &ArtifactSet,
        files: Vec<UploadedFile>,
    ) -> Result<JobOutput, AppError> {
        self.validate_image_to_pdf(&files)?;
        let stem = sanitize_stem(&files[0].original_name);

        let inputs: Vec<Vec<u8>> = files.iter().map(|f| f.data.to_vec()).collect();
        let out = run_blocking(move || imaging::images_to_pdf(&inputs)).await?;

        Ok(JobOutput {
            filename: format!("{stem}.pdf"),
            content_type: PDF_MIME.to_string(),
            data: Bytes::from(out),
        })
    }

    /// Rasterize every PDF page to PNG, packaged as a ZIP archive.
    pub async fn pdf_to_image(
        &self,
        artifacts: &ArtifactSet,
        file: UploadedFile,
        options: RasterizeOptions,
    ) -> Result<JobOutput, AppError> {
        self.validate_pdf_to_image(&file, &options)?;
        let stem = sanitize_stem(&file.original_name);

        let input = self
            .workspace
            .stage_upload(artifacts, &file.original_name, "pdf", &file.data)
            .await?;
        let outdir = self.workspace.scratch_dir(artifacts, "rasterize").await?;

        let pages = rasterize::pdf_to_images(
            &self.runner,
            &self.tools.pdftoppm.command,
            &input,
            &outdir,
            "page",
            options.dpi,
            self.standard_timeout,
        )
        .await
        .map_err(AppError::from)?;

        let mut entries = Vec::with_capacity(pages.len());
        for (i, path) in pages.iter().enumerate() {
            let bytes = read_bytes(path).await?;
            entries.push((format!("{}_page_{}.png", stem, i + 1), bytes.to_vec()));
        }
        let archive = run_blocking(move || package::zip_files(&entries)).await?;

        Ok(JobOutput {
            filename: format!("{stem}_images.zip"),
            content_type: ZIP_MIME.to_string(),
            data: Bytes::from(archive),
        })
    }

    /// Convert a PDF to a Word document via LibreOffice.
    pub async fn pdf_to_word(
        &self,
        artifacts: &ArtifactSet,
        file: UploadedFile,
    ) -> Result<JobOutput, AppError> {
        self.validate_pdf_to_word(&file)?;
        let stem = sanitize_stem(&file.original_name);
        let data = self.convert_with_office(artifacts, &file, "pdf", "docx").await?;

        Ok(JobOutput {
            filename: format!("{stem}.docx"),
            content_type: DOCX_MIME.to_string(),
            data,
        })
    }

    /// Convert an office document to PDF via LibreOffice.
    pub async fn word_to_pdf(
        &self,
        artifacts: &ArtifactSet,
        file: UploadedFile,
    ) -> Result<JobOutput, AppError> {
        self.validate_word_to_pdf(&file)?;
        let ext = extension_of(&file.original_name).ok_or_else(|| {
            AppError::validation("Uploaded file has no recognizable extension")
        })?;

        let stem = sanitize_stem(&file.original_name);
        let data = self.convert_with_office(artifacts, &file, &ext, "pdf").await?;

        Ok(JobOutput {
            filename: format!("{stem}.pdf"),
            content_type: PDF_MIME.to_string(),
            data,
        })
    }

    async fn convert_with_office(
        &self,
        artifacts: &ArtifactSet,
        file: &UploadedFile,
        source_ext: &str,
        target_ext: &str,
    ) -> Result<Bytes, AppError> {
        if !self.tools.libreoffice.enabled {
            return Err(AppError::feature_unavailable(
                "Document conversion is not enabled on this server",
            ));
        }

        let input = self
            .workspace
            .stage_upload(artifacts, &file.original_name, source_ext, &file.data)
            .await?;
        let scratch = self.workspace.scratch_dir(artifacts, "office").await?;
        let outdir = scratch.join("out");
        let profile = scratch.join("profile");
        for dir in [&outdir, &profile] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::storage(format!("Failed to create scratch directory: {e}")))?;
        }

        let produced = office::convert_document(
            &self.runner,
            &self.tools.libreoffice.command,
            &input,
            &outdir,
            &profile,
            target_ext,
            self.office_timeout,
        )
        .await?;

        read_bytes(&produced).await
    }
}

/// Reject inputs that are not PDF files before any collaborator runs.
fn ensure_pdf(file: &UploadedFile) -> Result<(), AppError> {
    if file.data.is_empty() {
        return Err(AppError::validation("Uploaded file is empty"));
    }
    if !file.data.starts_with(b"%PDF") {
        return Err(AppError::validation(format!(
            "File '{}' is not a PDF document",
            sanitize_stem(&file.original_name)
        )));
    }
    Ok(())
}

fn resolve_quality(options: &CompressOptions, input_len: u64) -> Result<Quality, AppError> {
    if let Some(ref name) = options.quality {
        return Quality::parse(name).ok_or_else(|| {
            AppError::validation(format!(
                "Unknown quality preset '{name}' (expected screen, ebook, printer, or prepress)"
            ))
        });
    }
    Ok(match options.target_size_kb {
        Some(target_kb) => Quality::for_target(input_len, target_kb),
        None => Quality::Ebook,
    })
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Run a CPU-bound conversion off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ConversionError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Conversion task failed: {e}")))?;
    result.map_err(AppError::from)
}

async fn read_bytes(path: &Path) -> Result<Bytes, AppError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::storage(format!("Failed to read conversion output: {e}")))?;
    Ok(Bytes::from(data))
}
