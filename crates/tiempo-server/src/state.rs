//! Application state for the API server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tiempo_core::WeatherFetcher;
use tiempo_proxy::ProxyConfig;

/// Shared application state.
///
/// Everything here is read-only configuration except the verbosity flag,
/// which is an injected read-mostly atomic — handlers toggle it, the fetcher
/// and the error mapper read it. No locking anywhere.
#[derive(Clone)]
pub struct AppState {
    /// Weather pipeline, one instance for the process.
    pub fetcher: Arc<WeatherFetcher>,
    /// Process-wide verbose-diagnostics flag.
    pub verbose: Arc<AtomicBool>,
    /// Server start time, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Creates state from the environment-sourced proxy configuration.
    pub fn new(proxy_config: ProxyConfig, verbose_initial: bool) -> Self {
        let verbose = Arc::new(AtomicBool::new(verbose_initial));
        Self {
            fetcher: Arc::new(WeatherFetcher::new(proxy_config, Arc::clone(&verbose))),
            verbose,
            started_at: Instant::now(),
        }
    }

    /// Creates state around an existing fetcher sharing `verbose`.
    ///
    /// Used by tests to point the fetcher at a stub upstream.
    pub fn with_fetcher(fetcher: WeatherFetcher, verbose: Arc<AtomicBool>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            verbose,
            started_at: Instant::now(),
        }
    }

    pub fn verbose_enabled(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Sets the verbosity flag, returning the previous value.
    pub fn set_verbose(&self, enabled: bool) -> bool {
        self.verbose.swap(enabled, Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
