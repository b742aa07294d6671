//! Tiempo Proxy - outbound proxy routing for upstream API calls.
//!
//! This crate decides whether a configured HTTP/HTTPS proxy applies to a
//! target URL (honoring `NO_PROXY`-style exclusion patterns) and produces a
//! per-call transport handle, direct or proxied, optionally bound to a local
//! egress address.
//!
//! ## Architecture
//!
//! ```text
//! Target URL → should_bypass? ──yes──→ direct handle
//!                   │
//!                   no
//!                   ▼
//!        proxy configured for scheme? ──no──→ direct handle
//!                   │
//!                   yes
//!                   ▼
//!            proxied handle (scheme-matched tunnel)
//! ```
//!
//! No network I/O happens here; a handle only prepares the egress
//! configuration for the call that owns it.

mod config;
mod exclusions;
mod transport;

pub use config::{ProxyConfig, ProxyConfigSummary};
pub use exclusions::should_bypass;
pub use transport::{create_transport, TransportHandle, TransportKind};
