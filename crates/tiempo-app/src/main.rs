//! Tiempo - proxy-aware weather lookup service.
//!
//! This binary wires the pieces together: reads the proxy configuration from
//! the environment, initializes logging, and runs the HTTP API server until
//! a shutdown signal arrives.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tiempo_core::mock;
use tiempo_proxy::ProxyConfig;
use tiempo_server::{Server, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

/// Tiempo - weather lookup service with proxy-aware egress
#[derive(Parser, Debug)]
#[command(name = "tiempo", version, about)]
struct Args {
    /// Host to bind the API server to
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind (falls back to the PORT environment variable, then 3001)
    #[arg(long)]
    port: Option<u16>,

    /// Start with verbose diagnostics enabled
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn resolved_port(&self) -> u16 {
        self.port
            .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_PORT)
    }
}

/// Get the logs directory path.
fn logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "tiempo", "Tiempo").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging with optional file rotation.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,tiempo_app={level},tiempo_server={level},tiempo_core={level},tiempo_proxy={level}",
            level = log_level
        ))
    });

    if let Some(log_dir) = logs_dir() {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("tiempo")
                .filename_suffix("log")
                .build(&log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(std::io::stdout))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }
    }

    // Fallback: console logging only
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::warn!("File logging unavailable, using console only");
    None
}

/// Completes on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install ctrl-c handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Keep the guard alive for the duration of the program
    let _log_guard = init_logging(&args);

    tracing::info!("Starting Tiempo...");
    tracing::info!("Args: {:?}", args);

    let proxy_config = ProxyConfig::from_env();
    tracing::info!(
        http_proxy = proxy_config.http_proxy.as_deref().unwrap_or("not configured"),
        https_proxy = proxy_config.https_proxy.as_deref().unwrap_or("not configured"),
        no_proxy = proxy_config.no_proxy.as_deref().unwrap_or("not configured"),
        service_ip = ?proxy_config.local_address,
        "Proxy configuration loaded"
    );

    let config = ServerConfig::default()
        .with_host(args.host.clone())
        .with_port(args.resolved_port())
        .with_debug(args.debug);

    let server = Server::new(config, proxy_config).context("failed to create API server")?;
    let addr = server.addr();

    tracing::info!(
        upstream = tiempo_core::DEFAULT_BASE_URL,
        mock_codes = %mock::known_codes().join(", "),
        debug_mode = args.debug,
        "Service configuration"
    );
    tracing::info!("Health check: http://{}/api/health", addr);
    tracing::info!("Weather lookup: http://{}/api/weather/{{codigoPostal}}", addr);
    tracing::info!("Connectivity test: http://{}/api/connectivity-test", addr);

    tokio::select! {
        result = server.run() => result.context("server exited with error")?,
        _ = shutdown_signal() => tracing::info!("Shutdown signal received"),
    }

    tracing::info!("Tiempo shutting down");
    Ok(())
}
