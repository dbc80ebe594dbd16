//! Headless LibreOffice invocation for office-document conversion.
//!
//! LibreOffice names its output after the input stem inside `--outdir`, so
//! the expected path is derived rather than passed. Each invocation gets a
//! private `UserInstallation` profile directory; concurrent soffice
//! processes sharing a profile deadlock on the profile lock.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConversionError;
use crate::exec::{ToolInvocation, ToolRunner};

/// Convert `input` to the `target_ext` format (e.g. `pdf`, `docx`),
/// writing into `outdir`. Returns the path of the produced file.
pub async fn convert_document(
    runner: &ToolRunner,
    command: &str,
    input: &Path,
    outdir: &Path,
    profile: &Path,
    target_ext: &str,
    timeout: Duration,
) -> Result<PathBuf, ConversionError> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            ConversionError::InvalidInput("Input file has no usable name".to_string())
        })?;
    let expected = outdir.join(format!("{stem}.{target_ext}"));

    let invocation = ToolInvocation {
        command: command.to_string(),
        args: vec![
            "--headless".to_string(),
            "--norestore".to_string(),
            format!("-env:UserInstallation=file://{}", profile.display()),
            "--convert-to".to_string(),
            target_ext.to_string(),
            "--outdir".to_string(),
            outdir.display().to_string(),
            input.display().to_string(),
        ],
        timeout,
        expected_output: Some(expected.clone()),
    };
    runner.run(&invocation).await?;

    Ok(expected)
}
