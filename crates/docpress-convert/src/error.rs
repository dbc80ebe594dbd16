//! Errors from conversion collaborators and their mapping into the
//! application error taxonomy.

use thiserror::Error;

use docpress_core::error::AppError;

/// Errors from a single conversion step.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter binary could not be spawned (missing or not executable).
    #[error("Conversion command not found: {0}")]
    CommandNotFound(String),

    /// The converter process exited with a non-zero code.
    #[error("Conversion failed with exit code {code}: {stderr}")]
    ProcessFailed {
        /// The exit code.
        code: i32,
        /// Standard error output, truncated.
        stderr: String,
    },

    /// The converter exited successfully but produced no output file.
    #[error("Expected output file not created")]
    OutputMissing,

    /// The converter ran past its time budget and was killed.
    #[error("Converter did not finish within {0} seconds")]
    Timeout(u64),

    /// The input could not be interpreted as the expected format.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The in-process PDF library raised.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The in-process image library raised.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error during conversion.
    #[error("IO error during conversion: {0}")]
    Io(#[from] std::io::Error),

    /// Packaging the multi-file output archive failed.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Map a conversion error into the application taxonomy. Client-facing
/// messages never include filesystem paths or raw tool stderr; those are
/// already logged at the invocation site.
impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::CommandNotFound(_) => AppError::with_source(
                docpress_core::error::ErrorKind::FeatureUnavailable,
                "The required converter is not installed on this server",
                err,
            ),
            ConversionError::ProcessFailed { code, .. } => AppError::with_source(
                docpress_core::error::ErrorKind::Conversion,
                format!("External converter failed (exit code {code})"),
                err,
            ),
            ConversionError::OutputMissing => AppError::with_source(
                docpress_core::error::ErrorKind::Conversion,
                "The converter produced no output",
                err,
            ),
            ConversionError::Timeout(seconds) => AppError::with_source(
                docpress_core::error::ErrorKind::Timeout,
                format!("The conversion did not finish within {seconds} seconds"),
                err,
            ),
            ConversionError::InvalidInput(ref msg) => {
                let msg = msg.clone();
                AppError::with_source(docpress_core::error::ErrorKind::Validation, msg, err)
            }
            ConversionError::Pdf(_) => AppError::with_source(
                docpress_core::error::ErrorKind::Conversion,
                "Failed to process the PDF document",
                err,
            ),
            ConversionError::Image(_) => AppError::with_source(
                docpress_core::error::ErrorKind::Conversion,
                "Failed to process the image",
                err,
            ),
            ConversionError::Io(_) => AppError::with_source(
                docpress_core::error::ErrorKind::Storage,
                "I/O failure during conversion",
                err,
            ),
            ConversionError::Zip(_) => AppError::with_source(
                docpress_core::error::ErrorKind::Internal,
                "Failed to package the output archive",
                err,
            ),
        }
    }
}
