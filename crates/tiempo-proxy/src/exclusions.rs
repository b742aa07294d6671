//! Exclusion pattern matching for proxy bypass decisions.
//!
//! Patterns come from the `NO_PROXY` environment variable as a
//! comma-separated list. Three pattern forms are supported:
//!
//! - literal hostnames (`localhost`, `api.internal.example`)
//! - domain suffixes (`*.local` matches `foo.local` and `local` itself)
//! - general globs (`10.*`, `192.168.*`) matched against the whole hostname

use regex::Regex;
use reqwest::Url;

/// Decides whether the proxy should be bypassed for `url`.
///
/// With no exclusion list configured the answer is always "do not bypass".
/// A URL that fails to parse, or has no hostname, also does not bypass: the
/// conservative outcome is to attempt the call through the proxy rather than
/// silently going direct.
///
/// # Examples
///
/// ```
/// use tiempo_proxy::should_bypass;
///
/// assert!(should_bypass("https://internal.local/api", Some("*.local")));
/// assert!(!should_bypass("https://example.com/api", Some("*.local")));
/// assert!(!should_bypass("https://example.com/api", None));
/// ```
pub fn should_bypass(url: &str, exclusions: Option<&str>) -> bool {
    let Some(exclusions) = exclusions else {
        return false;
    };

    let hostname = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_string(),
            None => return false,
        },
        Err(_) => return false,
    };

    exclusions
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .any(|pattern| hostname_matches(&hostname, pattern))
}

/// Evaluates one exclusion pattern against a hostname.
fn hostname_matches(hostname: &str, pattern: &str) -> bool {
    // Exact hostname match
    if hostname == pattern {
        return true;
    }

    // Domain suffix pattern (*.domain)
    if let Some(domain) = pattern.strip_prefix("*.") {
        return hostname == domain || hostname.ends_with(&format!(".{domain}"));
    }

    // General glob over the whole hostname (10.*, 192.168.*)
    if pattern.contains('*') {
        return glob_matches(hostname, pattern);
    }

    false
}

/// Translates a `*`-glob into an anchored regex and tests the hostname.
///
/// Everything except `*` is literal; a pattern that fails to compile matches
/// nothing.
fn glob_matches(hostname: &str, pattern: &str) -> bool {
    let translated = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{translated}$"))
        .map(|re| re.is_match(hostname))
        .unwrap_or(false)
}
