//! # docpress-api
//!
//! The HTTP surface of DocPress: route definitions, multipart handlers,
//! error-to-status mapping, and the server lifecycle (startup wiring,
//! background reaper, graceful shutdown).

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
