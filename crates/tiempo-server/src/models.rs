//! API request and response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tiempo_core::ProbeResult;
use tiempo_proxy::{ProxyConfigSummary, TransportKind};

/// Upstream API settings echoed by health checks.
#[derive(Debug, Serialize)]
pub struct ApiConfigInfo {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
}

/// Process information included in health and debug payloads.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub version: String,
    #[serde(rename = "uptimeSecs")]
    pub uptime_secs: u64,
}

/// Response body for GET /api/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "debugMode")]
    pub debug_mode: bool,
    #[serde(rename = "mockDataAvailable")]
    pub mock_data_available: Vec<&'static str>,
    #[serde(rename = "proxyConfig")]
    pub proxy_config: ProxyConfigSummary,
    #[serde(rename = "apiConfig")]
    pub api_config: ApiConfigInfo,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// Request body for POST /api/debug.
#[derive(Debug, Deserialize)]
pub struct DebugToggleRequest {
    pub enabled: bool,
}

/// Response body for GET and POST /api/debug.
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub success: bool,
    #[serde(rename = "debugMode")]
    pub debug_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "proxyConfig")]
    pub proxy_config: ProxyConfigSummary,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// Pass/fail counts for the connectivity test battery.
#[derive(Debug, Serialize)]
pub struct ProbeSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Response body for GET /api/connectivity-test.
#[derive(Debug, Serialize)]
pub struct ConnectivityTestResponse {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "proxyConfig")]
    pub proxy_config: ProxyConfigSummary,
    pub tests: Vec<ProbeResult>,
    pub summary: ProbeSummary,
}

/// Response body for GET /api/test-direct/{codigo}.
///
/// Always HTTP 200; the success flag carries the outcome. This is a raw
/// diagnostic view, no normalization and no mock fallback.
#[derive(Debug, Serialize)]
pub struct DirectTestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(rename = "statusText", skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportKind>,
    #[serde(rename = "proxyUsed", skip_serializing_if = "Option::is_none")]
    pub proxy_used: Option<bool>,
    #[serde(rename = "proxyConfig")]
    pub proxy_config: ProxyConfigSummary,
}

/// Request echo in the unknown-route response.
#[derive(Debug, Serialize)]
pub struct RequestedRoute {
    pub method: String,
    pub path: String,
}

/// Response body for unknown routes.
#[derive(Debug, Serialize)]
pub struct UnknownRouteResponse {
    pub success: bool,
    pub error: String,
    pub requested: RequestedRoute,
    pub available: Vec<&'static str>,
}
