//! # docpress-convert
//!
//! Collaborator shims for DocPress. Each transformation is an opaque
//! bytes-in/bytes-out operation delegated to the `lopdf` and `image`
//! crates in-process, or to external binaries (Ghostscript, LibreOffice,
//! pdftoppm) via structured subprocess invocation. The
//! [`service::ConversionService`] wires per-kind orchestration, including
//! fallback and feature-unavailable dispatch.

pub mod error;
pub mod exec;
pub mod ghostscript;
pub mod imaging;
pub mod office;
pub mod package;
pub mod pdf;
pub mod rasterize;
pub mod service;

pub use error::ConversionError;
pub use service::{CompressOptions, ConversionService, RasterizeOptions, UploadedFile};
