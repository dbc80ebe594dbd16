//! Job descriptors and kind classification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newtype wrapper around [`uuid::Uuid`] identifying one conversion job.
///
/// Time-ordered (UUIDv7) so artifact names sort by submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Create a new random, time-ordered identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// The kind of transformation a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    Compress,
    Merge,
    Split,
    ImageToPdf,
    PdfToImage,
    PdfToWord,
    WordToPdf,
}

impl JobKind {
    /// Stable string name, used in logs and artifact prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::Merge => "merge",
            Self::Split => "split",
            Self::ImageToPdf => "image-to-pdf",
            Self::PdfToImage => "pdf-to-image",
            Self::PdfToWord => "pdf-to-word",
            Self::WordToPdf => "word-to-pdf",
        }
    }

    /// Whether this kind runs under the longer document-conversion
    /// execution ceiling instead of the standard one.
    pub fn uses_office_budget(&self) -> bool {
        matches!(self, Self::PdfToWord | Self::WordToPdf)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compress" => Ok(Self::Compress),
            "merge" => Ok(Self::Merge),
            "split" => Ok(Self::Split),
            "image-to-pdf" => Ok(Self::ImageToPdf),
            "pdf-to-image" => Ok(Self::PdfToImage),
            "pdf-to-word" => Ok(Self::PdfToWord),
            "word-to-pdf" => Ok(Self::WordToPdf),
            other => Err(format!("Unknown job kind '{other}'")),
        }
    }
}

/// One inbound request's unit of conversion work.
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// The transformation this job performs.
    pub kind: JobKind,
    /// When the request arrived.
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Create a job descriptor for a newly arrived request.
    pub fn new(kind: JobKind) -> Self {
        Self {
            id: JobId::new(),
            kind,
            submitted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            JobKind::Compress,
            JobKind::Merge,
            JobKind::Split,
            JobKind::ImageToPdf,
            JobKind::PdfToImage,
            JobKind::PdfToWord,
            JobKind::WordToPdf,
        ] {
            assert_eq!(kind.as_str().parse::<JobKind>().unwrap(), kind);
        }
    }

    #[test]
    fn office_budget_only_for_document_conversion() {
        assert!(JobKind::PdfToWord.uses_office_budget());
        assert!(JobKind::WordToPdf.uses_office_budget());
        assert!(!JobKind::Compress.uses_office_budget());
        assert!(!JobKind::PdfToImage.uses_office_budget());
    }
}
