//! API route handlers.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use chrono::Utc;
use tracing::{debug, info};

use tiempo_core::{mock, WeatherReport};

use crate::error::{ApiError, Result};
use crate::models::{
    ApiConfigInfo, ConnectivityTestResponse, DebugResponse, DebugToggleRequest,
    DirectTestResponse, HealthResponse, ProbeSummary, RequestedRoute, ServerInfo,
    UnknownRouteResponse,
};
use crate::state::AppState;

/// Routes advertised by the unknown-route fallback.
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /api/health",
    "GET /api/debug",
    "POST /api/debug",
    "GET /api/connectivity-test",
    "GET /api/weather/{codigoPostal}",
    "GET /api/test-direct/{codigo}",
];

/// Reachability reference probed alongside the upstream API.
const CONNECTIVITY_PROBE_URL: &str = "https://www.google.com";
const CONNECTIVITY_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// GET /api/weather/{codigo_postal} - Fetch weather for a postal code.
pub async fn get_weather(
    State(state): State<AppState>,
    Path(codigo_postal): Path<String>,
) -> Result<Json<WeatherReport>> {
    debug!(postal_code = %codigo_postal, "Weather lookup requested");

    state
        .fetcher
        .get_weather(&codigo_postal)
        .await
        .map(Json)
        .map_err(|err| ApiError::from_weather(err, state.verbose_enabled()))
}

/// GET /api/health - Service health and configuration snapshot.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        debug_mode: state.verbose_enabled(),
        mock_data_available: mock::known_codes(),
        proxy_config: state.fetcher.proxy_config().summary(),
        api_config: ApiConfigInfo {
            base_url: state.fetcher.base_url().to_string(),
            timeout_secs: state.fetcher.timeout().as_secs(),
            user_agent: tiempo_core::USER_AGENT.to_string(),
        },
        server_info: server_info(&state),
    })
}

/// GET /api/debug - Current verbosity flag.
pub async fn get_debug(State(state): State<AppState>) -> Json<DebugResponse> {
    Json(DebugResponse {
        success: true,
        debug_mode: state.verbose_enabled(),
        message: None,
        proxy_config: state.fetcher.proxy_config().summary(),
        server_info: server_info(&state),
    })
}

/// POST /api/debug - Toggle verbose diagnostics.
pub async fn set_debug(
    State(state): State<AppState>,
    Json(req): Json<DebugToggleRequest>,
) -> Json<DebugResponse> {
    let previous = state.set_verbose(req.enabled);
    info!(previous, enabled = req.enabled, "Debug mode changed");

    Json(DebugResponse {
        success: true,
        debug_mode: req.enabled,
        message: Some(format!(
            "Debug mode {}",
            if req.enabled { "enabled" } else { "disabled" }
        )),
        proxy_config: state.fetcher.proxy_config().summary(),
        server_info: server_info(&state),
    })
}

/// GET /api/connectivity-test - Probe egress through the proxy routing path.
pub async fn connectivity_test(State(state): State<AppState>) -> Json<ConnectivityTestResponse> {
    info!("Running connectivity tests");

    let upstream_url = format!("{}/39001", state.fetcher.base_url());
    let tests = vec![
        state
            .fetcher
            .probe(
                "Google.com (HTTPS)",
                Method::HEAD,
                CONNECTIVITY_PROBE_URL,
                CONNECTIVITY_PROBE_TIMEOUT,
            )
            .await,
        state
            .fetcher
            .probe(
                "El-Tiempo.net API (HTTPS)",
                Method::GET,
                &upstream_url,
                state.fetcher.timeout(),
            )
            .await,
    ];

    let passed = tests.iter().filter(|t| t.success).count();
    let summary = ProbeSummary {
        total: tests.len(),
        passed,
        failed: tests.len() - passed,
    };
    info!(
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        "Connectivity tests completed"
    );

    Json(ConnectivityTestResponse {
        success: true,
        timestamp: Utc::now(),
        proxy_config: state.fetcher.proxy_config().summary(),
        tests,
        summary,
    })
}

/// GET /api/test-direct/{codigo} - Raw upstream call, no fallback.
///
/// Always answers 200; the success flag carries the outcome.
pub async fn test_direct(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Json<DirectTestResponse> {
    info!(postal_code = %codigo, "Direct upstream test requested");
    let proxy_config = state.fetcher.proxy_config().summary();

    match state.fetcher.fetch_raw(&codigo).await {
        Ok(outcome) => Json(DirectTestResponse {
            success: (200..300).contains(&outcome.status),
            status: Some(outcome.status),
            status_text: Some(outcome.status_text),
            url: outcome.url,
            data: outcome.data,
            error: None,
            transport: Some(outcome.transport),
            proxy_used: Some(outcome.proxy_used),
            proxy_config,
        }),
        Err(err) => Json(DirectTestResponse {
            success: false,
            status: None,
            status_text: None,
            url: format!("{}/{}", state.fetcher.base_url(), codigo.trim()),
            data: None,
            error: Some(err.to_string()),
            transport: None,
            proxy_used: None,
            proxy_config,
        }),
    }
}

/// Fallback for unknown routes.
pub async fn unknown_route(
    http_method: Method,
    uri: Uri,
) -> (StatusCode, Json<UnknownRouteResponse>) {
    debug!(method = %http_method, path = %uri.path(), "Unknown endpoint requested");

    (
        StatusCode::NOT_FOUND,
        Json(UnknownRouteResponse {
            success: false,
            error: "endpoint not found".to_string(),
            requested: RequestedRoute {
                method: http_method.to_string(),
                path: uri.path().to_string(),
            },
            available: AVAILABLE_ENDPOINTS.to_vec(),
        }),
    )
}

fn server_info(state: &AppState) -> ServerInfo {
    ServerInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    }
}
