//! # docpress-core
//!
//! Core crate for DocPress. Contains configuration schemas and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other DocPress crates.

pub mod config;
pub mod error;

pub use error::AppError;
