//! Weather pipeline error types.

use thiserror::Error;

/// Errors raised by the weather pipeline.
///
/// The variants map one-to-one onto the outcome classes the API boundary
/// cares about: validation failures never reach the network, not-found means
/// the upstream has no record and no mock entry exists, connectivity errors
/// are the only class eligible for the mock fallback, and upstream errors
/// carry a non-2xx status that is not eligible for it.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Empty or whitespace-only postal code.
    #[error("postal code is required")]
    MissingPostalCode,

    /// Postal code shorter than the minimum length.
    #[error("invalid postal code {received:?}: at least 4 digits required")]
    PostalCodeTooShort { received: String },

    /// Upstream reported no data and no mock entry exists for the code.
    #[error("no weather data found for postal code {postal_code}")]
    NotFound { postal_code: String },

    /// DNS, connect, or timeout failure reaching the upstream.
    #[error("connectivity error reaching upstream: {message}")]
    Connectivity { message: String },

    /// Upstream returned a non-2xx, non-404 status.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Anything unexpected (client construction, body decoding).
    #[error("internal error: {0}")]
    Internal(String),
}

impl WeatherError {
    /// True for the connectivity class — the only class the mock fallback
    /// applies to.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, WeatherError::Connectivity { .. })
    }
}

/// Classifies a transport-level failure from the HTTP client.
///
/// Timeouts, connect failures, and other request-phase errors (DNS
/// resolution surfaces as the latter) count as connectivity; decode and
/// builder failures do not.
pub fn is_connectivity_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    err.is_request() && !err.is_decode() && !err.is_body() && !err.is_builder()
}

/// Result type for weather operations.
pub type Result<T> = std::result::Result<T, WeatherError>;
