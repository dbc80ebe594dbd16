//! Conversion endpoint handlers.
//!
//! Every handler follows the same shape: read and validate the multipart
//! upload, then admit a job through the concurrency gate, and only then run
//! the conversion under the executor's budget. Validation failures never
//! consume a slot.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use docpress_convert::{CompressOptions, RasterizeOptions, UploadedFile};
use docpress_core::error::AppError;
use docpress_engine::artifacts::ArtifactSet;
use docpress_engine::executor::JobOutput;
use docpress_engine::job::{Job, JobKind};

use crate::dto::ApiError;
use crate::state::AppState;

/// POST /api/convert/compress
pub async fn compress(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, state.config.storage.max_upload_size_bytes).await?;
    let options = CompressOptions {
        quality: upload.fields.get("quality").cloned(),
        target_size_kb: upload.parse_field("target_size_kb")?,
    };
    let file = upload.single_file()?;
    state.service.validate_compress(&file, &options)?;

    let job = Job::new(JobKind::Compress);
    let _permit = state.admission.admit(&job).await?;
    let artifacts = ArtifactSet::new(job.id);
    let output = state
        .executor
        .execute(
            &job,
            &artifacts,
            state.service.compress(&artifacts, file, options),
        )
        .await?;
    download_response(output)
}

/// POST /api/convert/merge
pub async fn merge(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, state.config.storage.max_upload_size_bytes).await?;
    let files = upload.files;
    state.service.validate_merge(&files)?;

    let job = Job::new(JobKind::Merge);
    let _permit = state.admission.admit(&job).await?;
    let artifacts = ArtifactSet::new(job.id);
    let output = state
        .executor
        .execute(&job, &artifacts, state.service.merge(&artifacts, files))
        .await?;
    download_response(output)
}

/// POST /api/convert/split
pub async fn split(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, state.config.storage.max_upload_size_bytes).await?;
    let file = upload.single_file()?;
    state.service.validate_split(&file)?;

    let job = Job::new(JobKind::Split);
    let _permit = state.admission.admit(&job).await?;
    let artifacts = ArtifactSet::new(job.id);
    let output = state
        .executor
        .execute(&job, &artifacts, state.service.split(&artifacts, file))
        .await?;
    download_response(output)
}

/// POST /api/convert/image-to-pdf
pub async fn image_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, state.config.storage.max_upload_size_bytes).await?;
    let files = upload.files;
    state.service.validate_image_to_pdf(&files)?;

    let job = Job::new(JobKind::ImageToPdf);
    let _permit = state.admission.admit(&job).await?;
    let artifacts = ArtifactSet::new(job.id);
    let output = state
        .executor
        .execute(&job, &artifacts, state.service.image_to_pdf(&artifacts, files))
        .await?;
    download_response(output)
}

/// POST /api/convert/pdf-to-image
pub async fn pdf_to_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, state.config.storage.max_upload_size_bytes).await?;
    let options = match upload.parse_field::<u32>("dpi")? {
        Some(dpi) => RasterizeOptions { dpi },
        None => RasterizeOptions::default(),
    };
    let file = upload.single_file()?;
    state.service.validate_pdf_to_image(&file, &options)?;

    let job = Job::new(JobKind::PdfToImage);
    let _permit = state.admission.admit(&job).await?;
    let artifacts = ArtifactSet::new(job.id);
    let output = state
        .executor
        .execute(
            &job,
            &artifacts,
            state.service.pdf_to_image(&artifacts, file, options),
        )
        .await?;
    download_response(output)
}

/// POST /api/convert/pdf-to-word
pub async fn pdf_to_word(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, state.config.storage.max_upload_size_bytes).await?;
    let file = upload.single_file()?;
    state.service.validate_pdf_to_word(&file)?;

    let job = Job::new(JobKind::PdfToWord);
    let _permit = state.admission.admit(&job).await?;
    let artifacts = ArtifactSet::new(job.id);
    let output = state
        .executor
        .execute(&job, &artifacts, state.service.pdf_to_word(&artifacts, file))
        .await?;
    download_response(output)
}

/// POST /api/convert/word-to-pdf
pub async fn word_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, state.config.storage.max_upload_size_bytes).await?;
    let file = upload.single_file()?;
    state.service.validate_word_to_pdf(&file)?;

    let job = Job::new(JobKind::WordToPdf);
    let _permit = state.admission.admit(&job).await?;
    let artifacts = ArtifactSet::new(job.id);
    let output = state
        .executor
        .execute(&job, &artifacts, state.service.word_to_pdf(&artifacts, file))
        .await?;
    download_response(output)
}

/// Everything extracted from one multipart request.
struct Upload {
    files: Vec<UploadedFile>,
    fields: HashMap<String, String>,
}

impl Upload {
    /// Exactly one uploaded file, or a validation error.
    fn single_file(mut self) -> Result<UploadedFile, AppError> {
        match self.files.len() {
            1 => Ok(self.files.remove(0)),
            0 => Err(AppError::validation("A file upload is required")),
            _ => Err(AppError::validation(
                "Exactly one file is expected for this operation",
            )),
        }
    }

    /// Parse an optional text field.
    fn parse_field<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::validation(format!("Invalid value for '{name}'"))),
        }
    }
}

/// Read all multipart parts, enforcing the upload size ceiling per file.
async fn read_upload(mut multipart: Multipart, max_bytes: u64) -> Result<Upload, AppError> {
    let mut files = Vec::new();
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if let Some(file_name) = field.file_name().map(String::from) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Upload read error: {e}")))?;
            if data.len() as u64 > max_bytes {
                return Err(AppError::payload_too_large(format!(
                    "Uploaded file exceeds the {} MB limit",
                    max_bytes / (1024 * 1024)
                )));
            }
            files.push(UploadedFile {
                original_name: file_name,
                data,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("Field read error: {e}")))?;
            fields.insert(name, text);
        }
    }

    Ok(Upload { files, fields })
}

fn download_response(output: JobOutput) -> Result<Response, ApiError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", output.filename),
        )
        .header(header::CONTENT_LENGTH, output.data.len())
        .body(Body::from(output.data))
        .map_err(|e| ApiError(AppError::internal(format!("Response build failed: {e}"))))
}
