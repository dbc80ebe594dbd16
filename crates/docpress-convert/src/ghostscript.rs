//! Ghostscript invocation for PDF recompression.

use std::path::Path;
use std::time::Duration;

use crate::error::ConversionError;
use crate::exec::{ToolInvocation, ToolRunner};

/// Ghostscript `-dPDFSETTINGS` quality presets, strongest compression first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// 72 dpi images, smallest output.
    Screen,
    /// 150 dpi images, the default trade-off.
    Ebook,
    /// 300 dpi images.
    Printer,
    /// Minimal downsampling, largest output.
    Prepress,
}

impl Quality {
    pub fn as_setting(self) -> &'static str {
        match self {
            Quality::Screen => "/screen",
            Quality::Ebook => "/ebook",
            Quality::Printer => "/printer",
            Quality::Prepress => "/prepress",
        }
    }

    /// Parse a client-supplied preset name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "screen" => Some(Quality::Screen),
            "ebook" => Some(Quality::Ebook),
            "printer" => Some(Quality::Printer),
            "prepress" => Some(Quality::Prepress),
            _ => None,
        }
    }

    /// Choose a preset from a target size: the more aggressively the input
    /// must shrink, the lower the image resolution we keep.
    pub fn for_target(input_len: u64, target_kb: u64) -> Self {
        let target = target_kb.saturating_mul(1024);
        if target == 0 || input_len == 0 {
            return Quality::Ebook;
        }
        let ratio = target as f64 / input_len as f64;
        if ratio < 0.25 {
            Quality::Screen
        } else if ratio < 0.6 {
            Quality::Ebook
        } else {
            Quality::Printer
        }
    }
}

/// Compress `input` into `output` using Ghostscript's pdfwrite device.
pub async fn compress_pdf(
    runner: &ToolRunner,
    command: &str,
    input: &Path,
    output: &Path,
    quality: Quality,
    timeout: Duration,
) -> Result<(), ConversionError> {
    let invocation = ToolInvocation {
        command: command.to_string(),
        args: vec![
            "-sDEVICE=pdfwrite".to_string(),
            "-dCompatibilityLevel=1.4".to_string(),
            format!("-dPDFSETTINGS={}", quality.as_setting()),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-dBATCH".to_string(),
            format!("-sOutputFile={}", output.display()),
            input.display().to_string(),
        ],
        timeout,
        expected_output: Some(output.to_path_buf()),
    };
    runner.run(&invocation).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_parsing_covers_all_names() {
        assert_eq!(Quality::parse("screen"), Some(Quality::Screen));
        assert_eq!(Quality::parse("ebook"), Some(Quality::Ebook));
        assert_eq!(Quality::parse("printer"), Some(Quality::Printer));
        assert_eq!(Quality::parse("prepress"), Some(Quality::Prepress));
        assert_eq!(Quality::parse("maximum"), None);
    }

    #[test]
    fn target_ratio_picks_stronger_presets_for_smaller_targets() {
        // 10 MB input, 1 MB target: shrink hard.
        assert_eq!(Quality::for_target(10 * 1024 * 1024, 1024), Quality::Screen);
        // 2 MB input, 1 MB target: middle ground.
        assert_eq!(Quality::for_target(2 * 1024 * 1024, 1024), Quality::Ebook);
        // Target close to the input size: keep resolution.
        assert_eq!(Quality::for_target(1024 * 1024, 900), Quality::Printer);
    }

    #[test]
    fn degenerate_targets_fall_back_to_default() {
        assert_eq!(Quality::for_target(0, 1024), Quality::Ebook);
        assert_eq!(Quality::for_target(1024, 0), Quality::Ebook);
    }

    #[tokio::test]
    async fn missing_ghostscript_reports_command_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        tokio::fs::write(&input, b"%PDF-1.4").await.unwrap();
        let err = compress_pdf(
            &ToolRunner::new(),
            "no-such-ghostscript-3f8a",
            &input,
            &dir.path().join("out.pdf"),
            Quality::Ebook,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConversionError::CommandNotFound(_)));
    }
}
