//! External converter tool configuration.

use serde::{Deserialize, Serialize};

/// Settings for one optional external converter binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Command name or path used to invoke the tool.
    pub command: String,
    /// Whether this tool may be used at all. Disabling a tool makes the
    /// probe report it unavailable without spawning anything.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// External converter tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Ghostscript, the primary PDF compressor.
    #[serde(default = "default_ghostscript")]
    pub ghostscript: ToolConfig,
    /// LibreOffice, the pdf⇄word document converter.
    #[serde(default = "default_libreoffice")]
    pub libreoffice: ToolConfig,
    /// pdftoppm (poppler-utils), the PDF rasterizer.
    #[serde(default = "default_pdftoppm")]
    pub pdftoppm: ToolConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ghostscript: default_ghostscript(),
            libreoffice: default_libreoffice(),
            pdftoppm: default_pdftoppm(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ghostscript() -> ToolConfig {
    ToolConfig {
        command: "gs".to_string(),
        enabled: true,
    }
}

fn default_libreoffice() -> ToolConfig {
    ToolConfig {
        command: "soffice".to_string(),
        enabled: true,
    }
}

fn default_pdftoppm() -> ToolConfig {
    ToolConfig {
        command: "pdftoppm".to_string(),
        enabled: true,
    }
}
