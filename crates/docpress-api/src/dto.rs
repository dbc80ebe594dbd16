//! Response DTOs.

use serde::{Deserialize, Serialize};

use docpress_core::error::AppError;
use docpress_engine::admission::SlotOccupancy;
use docpress_engine::probe::ToolAvailability;

/// Newtype around [`AppError`] carrying the HTTP response mapping.
///
/// Handlers return `Result<_, ApiError>`; the `?` operator converts any
/// `AppError` through `From`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Whether retrying the same request later can succeed.
    pub retryable: bool,
}

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Resident set size of the server process, if readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_rss_bytes: Option<u64>,
    /// Execution slot occupancy and queue length.
    pub slots: SlotOccupancy,
    /// Availability of each external converter.
    pub tools: ToolAvailability,
}
