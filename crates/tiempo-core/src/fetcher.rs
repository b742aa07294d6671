//! Upstream fetch orchestration and the mock fallback policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{header, Method, StatusCode};
use serde::Serialize;
use tiempo_proxy::{create_transport, ProxyConfig, TransportHandle, TransportKind};
use tracing::{debug, error, info, warn};

use crate::error::{is_connectivity_error, Result, WeatherError};
use crate::mock;
use crate::report::{FetchDiagnostics, WeatherReport};
use crate::upstream::UpstreamWeatherRecord;

/// Upstream endpoint template; the postal code is appended as the last path
/// segment.
pub const DEFAULT_BASE_URL: &str =
    "https://www.el-tiempo.net/api/json/v2/provincias/39/municipios";

/// Fixed timeout for the upstream call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Identifying User-Agent sent on every outbound request.
pub const USER_AGENT: &str = "WeatherApp/1.0";

/// Minimum accepted postal code length after trimming.
const MIN_POSTAL_CODE_LEN: usize = 4;

/// Note attached when canned data covers an upstream 404.
const NOTE_NOT_FOUND: &str = "Datos de prueba - Código postal no encontrado en API externa";

/// Note attached when canned data covers a connectivity failure.
const NOTE_CONNECTIVITY: &str = "Datos de prueba - Error de conectividad con API externa";

/// One reachability probe outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub duration: String,
    pub transport: TransportKind,
}

/// Raw upstream outcome for the direct-test diagnostic endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RawFetchOutcome {
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
    pub url: String,
    pub data: Option<serde_json::Value>,
    pub transport: TransportKind,
    #[serde(rename = "proxyUsed")]
    pub proxy_used: bool,
}

/// Fetches weather for a postal code from the upstream provider, falling back
/// to canned data when the upstream is unreachable or has no record.
///
/// One instance serves the whole process; each call builds its own transport
/// handle and client, so concurrent requests share nothing mutable but the
/// injected verbosity flag.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    proxy_config: ProxyConfig,
    base_url: String,
    timeout: Duration,
    verbose: Arc<AtomicBool>,
}

impl WeatherFetcher {
    /// Creates a fetcher against the default upstream endpoint.
    ///
    /// `verbose` is the process-wide diagnostics flag; when set, raw upstream
    /// payloads and underlying error messages are included in reports.
    pub fn new(proxy_config: ProxyConfig, verbose: Arc<AtomicBool>) -> Self {
        Self {
            proxy_config,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            verbose,
        }
    }

    /// Overrides the upstream endpoint. Used by tests to point at a stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the fixed call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy_config
    }

    fn verbose_enabled(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Fetches and normalizes weather for one postal code.
    ///
    /// Validation failures return before any transport is prepared or any
    /// network call is attempted. No retries: a connectivity failure either
    /// resolves to canned data or surfaces as an error.
    pub async fn get_weather(&self, postal_code: &str) -> Result<WeatherReport> {
        let code = validate_postal_code(postal_code)?;
        let url = format!("{}/{}", self.base_url, code);

        let handle = create_transport(&url, &self.proxy_config);
        info!(
            postal_code = %code,
            url = %url,
            transport = handle.kind().as_str(),
            proxy_used = handle.is_proxied(),
            "Requesting upstream weather"
        );

        let started = Instant::now();
        let response = self.send_get(&handle, &url).await;
        let elapsed_millis = started.elapsed().as_secs_f64() * 1000.0;

        match response {
            Ok(response) => {
                self.classify_response(response, &code, &handle, elapsed_millis)
                    .await
            }
            Err(err) => self.fallback_or_fail(err, &code),
        }
    }

    /// Runs one timed reachability probe through the proxy routing path.
    pub async fn probe(
        &self,
        name: &str,
        http_method: Method,
        url: &str,
        timeout: Duration,
    ) -> ProbeResult {
        let handle = create_transport(url, &self.proxy_config);
        let transport = handle.kind();
        let started = Instant::now();

        let outcome = match handle.build_client(timeout) {
            Ok(client) => {
                client
                    .request(http_method, url)
                    .header(header::USER_AGENT, USER_AGENT)
                    .send()
                    .await
                    .map(|r| r.status())
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };
        let duration = format!("{:.2}ms", started.elapsed().as_secs_f64() * 1000.0);

        match outcome {
            Ok(status) => {
                debug!(name, %status, %duration, "Probe completed");
                ProbeResult {
                    name: name.to_string(),
                    success: status.is_success(),
                    message: format!("HTTP {status}"),
                    duration,
                    transport,
                }
            }
            Err(message) => {
                warn!(name, %message, %duration, "Probe failed");
                ProbeResult {
                    name: name.to_string(),
                    success: false,
                    message,
                    duration,
                    transport,
                }
            }
        }
    }

    /// Calls the upstream without normalization or fallback, for diagnostics.
    pub async fn fetch_raw(&self, postal_code: &str) -> Result<RawFetchOutcome> {
        let code = validate_postal_code(postal_code)?;
        let url = format!("{}/{}", self.base_url, code);
        let handle = create_transport(&url, &self.proxy_config);

        let response = self.send_get(&handle, &url).await.map_err(|err| {
            if is_connectivity_error(&err) {
                WeatherError::Connectivity {
                    message: err.to_string(),
                }
            } else {
                WeatherError::Internal(err.to_string())
            }
        })?;

        let status = response.status();
        let data = if status.is_success() {
            response
                .json::<serde_json::Value>()
                .await
                .map(Some)
                .map_err(|e| WeatherError::Internal(e.to_string()))?
        } else {
            None
        };

        Ok(RawFetchOutcome {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
            url,
            data,
            transport: handle.kind(),
            proxy_used: handle.is_proxied(),
        })
    }

    async fn send_get(
        &self,
        handle: &TransportHandle,
        url: &str,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let client = handle.build_client(self.timeout)?;
        client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
    }

    async fn classify_response(
        &self,
        response: reqwest::Response,
        code: &str,
        handle: &TransportHandle,
        elapsed_millis: f64,
    ) -> Result<WeatherReport> {
        let status = response.status();
        debug!(
            postal_code = %code,
            %status,
            elapsed_millis,
            "Upstream response received"
        );

        if status.is_success() {
            let raw = match response.json::<serde_json::Value>().await {
                Ok(raw) => raw,
                Err(err) => return self.fallback_or_fail(err, code),
            };
            let record: UpstreamWeatherRecord = serde_json::from_value(raw.clone())
                .map_err(|e| WeatherError::Internal(format!("unexpected upstream shape: {e}")))?;

            let report = WeatherReport::from_upstream(
                &record,
                code,
                FetchDiagnostics {
                    proxy_used: handle.is_proxied(),
                    transport: handle.kind(),
                    processing_millis: elapsed_millis,
                    raw_data: self.verbose_enabled().then_some(raw),
                },
            );
            info!(
                postal_code = %code,
                municipio = %report.municipio,
                data_source = "external_api",
                "Weather normalized from upstream"
            );
            return Ok(report);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(entry) = mock::lookup(code) {
                info!(
                    postal_code = %code,
                    data_source = "mock_data",
                    "Postal code not found upstream, serving canned data"
                );
                return Ok(WeatherReport::from_mock(entry, code, NOTE_NOT_FOUND, None));
            }
            warn!(postal_code = %code, "Postal code not found upstream, no canned data");
            return Err(WeatherError::NotFound {
                postal_code: code.to_string(),
            });
        }

        let message = status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
        error!(postal_code = %code, %status, "Upstream returned an error status");
        Err(WeatherError::Upstream {
            status: status.as_u16(),
            message,
        })
    }

    /// Applies the fallback policy to a transport-level failure.
    fn fallback_or_fail(&self, err: reqwest::Error, code: &str) -> Result<WeatherReport> {
        if is_connectivity_error(&err) {
            let mock_entry = mock::lookup(code);
            warn!(
                postal_code = %code,
                error = %err,
                mock_available = mock_entry.is_some(),
                "Connectivity failure reaching upstream"
            );

            if let Some(entry) = mock_entry {
                let details = self.verbose_enabled().then(|| err.to_string());
                return Ok(WeatherReport::from_mock(
                    entry,
                    code,
                    NOTE_CONNECTIVITY,
                    details,
                ));
            }
            return Err(WeatherError::Connectivity {
                message: err.to_string(),
            });
        }

        error!(postal_code = %code, error = %err, "Unexpected failure fetching weather");
        Err(WeatherError::Internal(err.to_string()))
    }
}

/// Validates and trims a postal code. Fails fast, before any network work.
fn validate_postal_code(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::MissingPostalCode);
    }
    if trimmed.len() < MIN_POSTAL_CODE_LEN {
        return Err(WeatherError::PostalCodeTooShort {
            received: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
