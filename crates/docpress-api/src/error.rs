//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use docpress_core::error::{AppError, ErrorKind};

use crate::dto::ApiErrorResponse;

impl IntoResponse for crate::dto::ApiError {
    fn into_response(self) -> Response {
        let error = self.0;
        let (status, error_code) = match &error.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "UPLOAD_TOO_LARGE"),
            ErrorKind::Busy => (StatusCode::SERVICE_UNAVAILABLE, "SERVER_BUSY"),
            ErrorKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, "CONVERSION_TIMEOUT"),
            ErrorKind::Conversion => (StatusCode::UNPROCESSABLE_ENTITY, "CONVERSION_FAILED"),
            ErrorKind::FeatureUnavailable => {
                (StatusCode::NOT_IMPLEMENTED, "FEATURE_UNAVAILABLE")
            }
            ErrorKind::Storage => {
                tracing::error!(error = %error.message, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            ErrorKind::Configuration => {
                tracing::error!(error = %error.message, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            ErrorKind::Internal => {
                tracing::error!(error = %error.message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: error.message.clone(),
            retryable: matches!(error.kind, ErrorKind::Busy),
        };

        let mut response = (status, Json(body)).into_response();
        if error.kind == ErrorKind::Busy {
            // Hint clients when to retry; matches the queue-wait window.
            if let Ok(value) = axum::http::HeaderValue::from_str("30") {
                response.headers_mut().insert("retry-after", value);
            }
        }
        response
    }
}

impl From<AppError> for crate::dto::ApiError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::ApiError;

    fn status_of(error: AppError) -> StatusCode {
        ApiError(error).into_response().status()
    }

    #[test]
    fn kinds_map_to_documented_statuses() {
        assert_eq!(
            status_of(AppError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::payload_too_large("big")),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(AppError::busy("busy")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AppError::timeout("slow")),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(AppError::conversion("broke")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::feature_unavailable("no tool")),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            status_of(AppError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn busy_response_carries_retry_after() {
        let response = ApiError(AppError::busy("busy")).into_response();
        assert!(response.headers().contains_key("retry-after"));
    }
}
