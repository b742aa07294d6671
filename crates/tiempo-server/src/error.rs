//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tiempo_core::{mock, WeatherError};

/// API errors.
///
/// Raw error details ride along only when verbose diagnostics were enabled
/// at conversion time; the log record always carries them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Postal code failed validation.
    #[error("{message}")]
    Validation {
        message: String,
        received: Option<String>,
    },

    /// Upstream has no data and no canned entry exists.
    #[error("no weather data found for postal code {postal_code}")]
    NotFound { postal_code: String },

    /// Connectivity failure with no canned entry to fall back on.
    #[error("weather service temporarily unavailable: upstream connectivity failure")]
    ServiceUnavailable { details: Option<String> },

    /// Upstream answered with an unexpected status.
    #[error("upstream error")]
    Upstream { status: u16, details: Option<String> },

    /// Anything unexpected.
    #[error("internal server error")]
    Internal { details: Option<String> },
}

impl ApiError {
    /// Converts a pipeline error, deciding here whether raw details are
    /// client-visible.
    pub fn from_weather(err: WeatherError, verbose: bool) -> Self {
        match err {
            WeatherError::MissingPostalCode => ApiError::Validation {
                message: err.to_string(),
                received: None,
            },
            WeatherError::PostalCodeTooShort { ref received } => ApiError::Validation {
                message: err.to_string(),
                received: Some(received.clone()),
            },
            WeatherError::NotFound { postal_code } => ApiError::NotFound { postal_code },
            WeatherError::Connectivity { message } => ApiError::ServiceUnavailable {
                details: verbose.then_some(message),
            },
            WeatherError::Upstream { status, message } => ApiError::Upstream {
                status,
                details: verbose.then_some(message),
            },
            WeatherError::Internal(message) => ApiError::Internal {
                details: verbose.then_some(message),
            },
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            ApiError::Upstream { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error"),
            ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let (received, suggestion, details) = match &self {
            ApiError::Validation { received, .. } => (received.clone(), None, None),
            ApiError::ServiceUnavailable { details } => (
                None,
                Some(format!(
                    "Check the proxy configuration or try postal codes with canned data: {}",
                    mock::known_codes().join(", ")
                )),
                details.clone(),
            ),
            ApiError::Upstream { details, .. } | ApiError::Internal { details } => {
                (None, None, details.clone())
            }
            ApiError::NotFound { .. } => (None, None, None),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
            received,
            suggestion,
            details,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
