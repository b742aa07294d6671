//! Per-call transport handles.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::{Client, Proxy};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ProxyConfig;
use crate::exclusions::should_bypass;

/// Egress kind, fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    DirectHttp,
    DirectHttps,
    ProxiedHttp,
    ProxiedHttps,
}

impl TransportKind {
    /// Stable tag for diagnostics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::DirectHttp => "direct-http",
            TransportKind::DirectHttps => "direct-https",
            TransportKind::ProxiedHttp => "proxied-http",
            TransportKind::ProxiedHttps => "proxied-https",
        }
    }

    pub fn is_proxied(&self) -> bool {
        matches!(
            self,
            TransportKind::ProxiedHttp | TransportKind::ProxiedHttps
        )
    }
}

/// Egress configuration for one outbound call.
///
/// Created per call, owned exclusively by that call, and discarded when the
/// call completes. Holding one performs no network I/O; the actual connection
/// is made by the client it builds.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    kind: TransportKind,
    proxy: Option<Proxy>,
    proxy_url: Option<String>,
    local_address: Option<IpAddr>,
}

impl TransportHandle {
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn is_proxied(&self) -> bool {
        self.kind.is_proxied()
    }

    /// The configured proxy URL, for diagnostics.
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    pub fn local_address(&self) -> Option<IpAddr> {
        self.local_address
    }

    /// Builds an HTTP client carrying this handle's egress configuration and
    /// the caller's timeout.
    pub fn build_client(&self, timeout: Duration) -> reqwest::Result<Client> {
        let mut builder = Client::builder().timeout(timeout);

        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy.clone());
        }
        if let Some(addr) = self.local_address {
            builder = builder.local_address(addr);
        }

        builder.build()
    }
}

/// Prepares the transport handle for an outbound call to `url`.
///
/// The proxy applies when the exclusion list does not bypass the target AND a
/// proxy URL is configured for the target's scheme. This operation never
/// fails: with nothing configured (or an unparseable proxy URL) it falls back
/// to a direct handle, optionally bound to the local egress address.
pub fn create_transport(url: &str, config: &ProxyConfig) -> TransportHandle {
    let is_https = url.starts_with("https://");
    let proxy_url = if is_https {
        config.https_proxy.as_deref()
    } else {
        config.http_proxy.as_deref()
    };

    let bypass = should_bypass(url, config.no_proxy.as_deref());

    if let Some(proxy_url) = proxy_url.filter(|_| !bypass) {
        // Scheme-matched: HTTPS targets tunnel through the proxy, HTTP
        // targets use the plain proxy path.
        let proxy = if is_https {
            Proxy::https(proxy_url)
        } else {
            Proxy::http(proxy_url)
        };

        match proxy {
            Ok(proxy) => {
                let kind = if is_https {
                    TransportKind::ProxiedHttps
                } else {
                    TransportKind::ProxiedHttp
                };
                debug!(
                    target_url = url,
                    transport = kind.as_str(),
                    proxy_url,
                    local_address = ?config.local_address,
                    "Prepared proxied transport"
                );
                return TransportHandle {
                    kind,
                    proxy: Some(proxy),
                    proxy_url: Some(proxy_url.to_string()),
                    local_address: config.local_address,
                };
            }
            Err(err) => {
                warn!(proxy_url, error = %err, "Invalid proxy URL, using direct transport");
            }
        }
    }

    let kind = if is_https {
        TransportKind::DirectHttps
    } else {
        TransportKind::DirectHttp
    };
    debug!(
        target_url = url,
        transport = kind.as_str(),
        bypassed = bypass,
        local_address = ?config.local_address,
        "Prepared direct transport"
    );
    TransportHandle {
        kind,
        proxy: None,
        proxy_url: None,
        local_address: config.local_address,
    }
}
