//! Tiempo Server - HTTP API server.
//!
//! This crate provides the HTTP API for the Tiempo weather service.
//!
//! ## Endpoints
//!
//! - `GET /api/weather/{codigoPostal}` - Weather for a postal code
//! - `GET /api/health` - Health and configuration snapshot
//! - `GET /api/debug` - Current verbose-diagnostics flag
//! - `POST /api/debug` - Toggle verbose diagnostics
//! - `GET /api/connectivity-test` - Egress reachability probes
//! - `GET /api/test-direct/{codigo}` - Raw upstream call diagnostics
//!
//! ## Example
//!
//! ```no_run
//! use tiempo_proxy::ProxyConfig;
//! use tiempo_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::new(ServerConfig::default(), ProxyConfig::from_env()).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod error;
mod handlers;
pub mod models;
pub mod state;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use tiempo_proxy::ProxyConfig;

pub use error::{ApiError, Result};
pub use state::AppState;

/// Default server port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default server host (localhost only).
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1).
    pub host: String,
    /// Port to bind to (default: 3001).
    pub port: u16,
    /// Start with verbose diagnostics enabled.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Sets the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables verbose diagnostics at startup.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("failed to bind to {0}: {1}")]
    BindError(SocketAddr, std::io::Error),

    /// Server runtime error.
    #[error("server error: {0}")]
    Runtime(String),
}

/// The HTTP API server.
pub struct Server {
    router: Router,
    addr: SocketAddr,
}

impl Server {
    /// Creates a new server from the given configuration and the
    /// environment-sourced proxy settings.
    pub fn new(
        config: ServerConfig,
        proxy_config: ProxyConfig,
    ) -> std::result::Result<Self, ServerError> {
        let state = AppState::new(proxy_config, config.debug);
        Self::with_state(config, state)
    }

    /// Creates a server with custom application state.
    pub fn with_state(
        config: ServerConfig,
        state: AppState,
    ) -> std::result::Result<Self, ServerError> {
        // The browser UI is served from a different origin
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = router(state).layer(cors).layer(TraceLayer::new_for_http());

        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ServerError::Runtime(format!("invalid address: {}", e)))?;

        Ok(Self { router, addr })
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the router for testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Runs the server until shutdown.
    pub async fn run(self) -> std::result::Result<(), ServerError> {
        info!("Starting Tiempo API server on {}", self.addr);

        // Create socket with SO_REUSEADDR to allow binding even when sockets
        // are lingering in TIME_WAIT
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        socket
            .set_reuse_address(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        socket
            .bind(&self.addr.into())
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .listen(128)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        // Set non-blocking for tokio
        socket
            .set_nonblocking(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        let std_listener: std::net::TcpListener = socket.into();
        let listener = tokio::net::TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        axum::serve(listener, self.router)
            .await
            .map_err(|e| ServerError::Runtime(e.to_string()))?;

        Ok(())
    }
}

/// Builds the API router over the given state.
fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/weather/{codigo_postal}", get(handlers::get_weather))
        .route("/api/health", get(handlers::health))
        .route("/api/debug", get(handlers::get_debug))
        .route("/api/debug", post(handlers::set_debug))
        .route("/api/connectivity-test", get(handlers::connectivity_test))
        .route("/api/test-direct/{codigo}", get(handlers::test_direct))
        .fallback(handlers::unknown_route)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use tiempo_core::WeatherFetcher;

    /// Connections to this address are refused immediately, simulating an
    /// unreachable upstream.
    const UNREACHABLE_BASE: &str = "http://127.0.0.1:1";

    fn create_test_app() -> Router {
        let fetcher = WeatherFetcher::new(ProxyConfig::default(), Arc::new(AtomicBool::new(false)))
            .with_base_url(UNREACHABLE_BASE)
            .with_timeout(Duration::from_secs(2));
        let verbose = Arc::new(AtomicBool::new(false));
        router(AppState::with_fetcher(fetcher, verbose))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_weather_short_code_is_rejected() {
        let app = create_test_app();

        let request = Request::builder()
            .uri("/api/weather/39")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "validation_error");
        assert_eq!(json["received"], "39");
    }

    #[tokio::test]
    async fn test_weather_falls_back_to_mock_when_unreachable() {
        let app = create_test_app();

        let request = Request::builder()
            .uri("/api/weather/39001")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["dataSource"], "mock_data");
        assert_eq!(json["municipio"], "Alfoz de Lloredo");
        assert!(json["note"].is_string());
    }

    #[tokio::test]
    async fn test_weather_unknown_code_unreachable_is_503() {
        let app = create_test_app();

        let request = Request::builder()
            .uri("/api/weather/39999")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = body_json(response).await;
        assert_eq!(json["code"], "service_unavailable");
        assert!(json["suggestion"].as_str().unwrap().contains("39001"));
        // Not verbose: raw details stay out of the payload
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_test_app();

        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["debugMode"], false);
        assert_eq!(
            json["mockDataAvailable"],
            serde_json::json!(["39001", "39002", "39003"])
        );
        assert!(json["serverInfo"]["version"].is_string());
    }

    #[tokio::test]
    async fn test_debug_toggle_round_trip() {
        let app = create_test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/debug")
            .header("content-type", "application/json")
            .body(Body::from(json!({"enabled": true}).to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["debugMode"], true);

        let request = Request::builder()
            .uri("/api/debug")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["debugMode"], true);
    }

    #[tokio::test]
    async fn test_verbose_mode_exposes_error_details() {
        let fetcher = WeatherFetcher::new(ProxyConfig::default(), Arc::new(AtomicBool::new(true)))
            .with_base_url(UNREACHABLE_BASE)
            .with_timeout(Duration::from_secs(2));
        let app = router(AppState::with_fetcher(
            fetcher,
            Arc::new(AtomicBool::new(true)),
        ));

        let request = Request::builder()
            .uri("/api/weather/39999")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = body_json(response).await;
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn test_test_direct_reports_failure_with_200() {
        let app = create_test_app();

        let request = Request::builder()
            .uri("/api/test-direct/39001")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
        assert!(json["proxyConfig"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_lists_endpoints() {
        let app = create_test_app();

        let request = Request::builder()
            .uri("/api/nope")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["requested"]["path"], "/api/nope");
        assert!(json["available"].as_array().unwrap().len() >= 5);
    }

    #[tokio::test]
    async fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.debug);
    }

    #[tokio::test]
    async fn test_server_config_builders() {
        let config = ServerConfig::default()
            .with_host("0.0.0.0")
            .with_port(9000)
            .with_debug(true);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(config.debug);
    }
}
