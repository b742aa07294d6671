//! Tiempo Core - weather fetching, normalization, and the mock fallback.
//!
//! This crate owns the "get weather for postal code" pipeline:
//!
//! 1. validate the postal code (fail fast, no network);
//! 2. build the upstream URL and obtain a transport handle from
//!    [`tiempo_proxy`];
//! 3. perform the timed GET against the upstream provider;
//! 4. classify the outcome and normalize the upstream JSON into a
//!    [`WeatherReport`];
//! 5. apply the mock-data fallback on 404 or connectivity failure.
//!
//! No retries and no caching: the static mock table is the only resilience
//! mechanism.

pub mod error;
pub mod fetcher;
pub mod mock;
pub mod report;
pub mod upstream;

pub use error::{Result, WeatherError};
pub use fetcher::{
    ProbeResult, RawFetchOutcome, WeatherFetcher, DEFAULT_BASE_URL, REQUEST_TIMEOUT, USER_AGENT,
};
pub use report::{DataSource, FetchDiagnostics, TemperatureRange, WeatherReport, NOT_AVAILABLE};
pub use upstream::UpstreamWeatherRecord;
