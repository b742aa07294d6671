//! Environment-sourced proxy configuration.

use std::net::IpAddr;

use serde::Serialize;
use tracing::warn;

/// Proxy settings for outbound calls.
///
/// Read once from the environment at process start and treated as immutable
/// for the process lifetime. Both upper- and lower-case variable spellings
/// are honored, upper-case winning.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Proxy URL for plain HTTP targets (`HTTP_PROXY`).
    pub http_proxy: Option<String>,
    /// Proxy URL for HTTPS targets (`HTTPS_PROXY`).
    pub https_proxy: Option<String>,
    /// Comma-separated exclusion patterns (`NO_PROXY`).
    pub no_proxy: Option<String>,
    /// Local egress address to bind outbound sockets to (`SERVICE_IP`).
    pub local_address: Option<IpAddr>,
}

impl ProxyConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        let local_address = env_var("SERVICE_IP").and_then(|raw| match raw.parse() {
            Ok(addr) => Some(addr),
            Err(_) => {
                warn!(service_ip = %raw, "Ignoring unparseable SERVICE_IP");
                None
            }
        });

        Self {
            http_proxy: env_var("HTTP_PROXY"),
            https_proxy: env_var("HTTPS_PROXY"),
            no_proxy: env_var("NO_PROXY"),
            local_address,
        }
    }

    /// Returns true if any proxy URL is configured.
    pub fn has_proxy(&self) -> bool {
        self.http_proxy.is_some() || self.https_proxy.is_some()
    }

    /// Sets the HTTP proxy URL.
    pub fn with_http_proxy(mut self, url: impl Into<String>) -> Self {
        self.http_proxy = Some(url.into());
        self
    }

    /// Sets the HTTPS proxy URL.
    pub fn with_https_proxy(mut self, url: impl Into<String>) -> Self {
        self.https_proxy = Some(url.into());
        self
    }

    /// Sets the exclusion pattern list.
    pub fn with_no_proxy(mut self, patterns: impl Into<String>) -> Self {
        self.no_proxy = Some(patterns.into());
        self
    }

    /// Sets the local egress address.
    pub fn with_local_address(mut self, addr: IpAddr) -> Self {
        self.local_address = Some(addr);
        self
    }

    /// Snapshot of the configuration for health/debug payloads.
    pub fn summary(&self) -> ProxyConfigSummary {
        ProxyConfigSummary {
            http_proxy: self.http_proxy.clone(),
            https_proxy: self.https_proxy.clone(),
            no_proxy: self.no_proxy.clone(),
            service_ip: self.local_address.map(|a| a.to_string()),
        }
    }
}

/// Serializable view of the proxy configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyConfigSummary {
    #[serde(rename = "httpProxy")]
    pub http_proxy: Option<String>,
    #[serde(rename = "httpsProxy")]
    pub https_proxy: Option<String>,
    #[serde(rename = "noProxy")]
    pub no_proxy: Option<String>,
    #[serde(rename = "serviceIp")]
    pub service_ip: Option<String>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .or_else(|_| std::env::var(name.to_lowercase()))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_proxy() {
        let config = ProxyConfig::default();
        assert!(!config.has_proxy());
        assert!(config.no_proxy.is_none());
        assert!(config.local_address.is_none());
    }

    #[test]
    fn builders_set_fields() {
        let config = ProxyConfig::default()
            .with_http_proxy("http://proxy.example.com:8080")
            .with_https_proxy("http://proxy.example.com:8080")
            .with_no_proxy("localhost,*.local")
            .with_local_address("192.168.1.100".parse().unwrap());

        assert!(config.has_proxy());
        assert_eq!(config.no_proxy.as_deref(), Some("localhost,*.local"));
        assert_eq!(
            config.local_address,
            Some("192.168.1.100".parse().unwrap())
        );
    }

    #[test]
    fn summary_reflects_config() {
        let summary = ProxyConfig::default()
            .with_https_proxy("http://proxy:3128")
            .summary();

        assert_eq!(summary.https_proxy.as_deref(), Some("http://proxy:3128"));
        assert!(summary.http_proxy.is_none());
        assert!(summary.service_ip.is_none());
    }
}
