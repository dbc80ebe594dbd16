//! PDF rasterization through `pdftoppm`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConversionError;
use crate::exec::{ToolInvocation, ToolRunner};

/// Render every page of `input` to PNG at `dpi`, writing files named
/// `{prefix}-{page}.png` into `outdir`. Returns the produced paths in page
/// order.
pub async fn pdf_to_images(
    runner: &ToolRunner,
    command: &str,
    input: &Path,
    outdir: &Path,
    prefix: &str,
    dpi: u32,
    timeout: Duration,
) -> Result<Vec<PathBuf>, ConversionError> {
    let invocation = ToolInvocation {
        command: command.to_string(),
        args: vec![
            "-png".to_string(),
            "-r".to_string(),
            dpi.to_string(),
            input.display().to_string(),
            outdir.join(prefix).display().to_string(),
        ],
        timeout,
        expected_output: None,
    };
    runner.run(&invocation).await?;

    let pages = collect_pages(outdir, prefix).await?;
    if pages.is_empty() {
        return Err(ConversionError::OutputMissing);
    }
    Ok(pages)
}

/// Gather `{prefix}-{N}.png` files and sort them by page number.
/// pdftoppm zero-pads the number to the page-count width, so a plain
/// lexicographic sort is wrong for unpadded single-digit runs.
async fn collect_pages(outdir: &Path, prefix: &str) -> Result<Vec<PathBuf>, ConversionError> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    let mut entries = tokio::fs::read_dir(outdir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(number) = page_number(name, prefix) else {
            continue;
        };
        pages.push((number, entry.path()));
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(name: &str, prefix: &str) -> Option<u32> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('-')?;
    rest.strip_suffix(".png")?.parse().ok()
}
