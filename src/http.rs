//! Outbound HTTP client
//!
//! Provides a reqwest::Client configured with a timeout, a service user agent
//! and proxy settings taken from the environment.

use crate::error::AppError;
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// Build a reqwest Client with the given timeout.
///
/// Proxy variables:
/// - HTTPS_PROXY / https_proxy for https URLs
/// - HTTP_PROXY / http_proxy for http URLs
/// - ALL_PROXY / all_proxy as the fallback for both
/// - NO_PROXY / no_proxy hosts that bypass the proxy
pub fn client_with_timeout(timeout: Duration) -> Result<Client, AppError> {
    let mut builder = Client::builder().timeout(timeout);

    let fallback = getenv_first(&["ALL_PROXY", "all_proxy"]);
    let proxies = ProxySettings {
        https: getenv_first(&["HTTPS_PROXY", "https_proxy"]).or_else(|| fallback.clone()),
        http: getenv_first(&["HTTP_PROXY", "http_proxy"]).or(fallback),
        bypass: parse_no_proxy(&getenv_first(&["NO_PROXY", "no_proxy"]).unwrap_or_default()),
    };

    if proxies.https.is_some() || proxies.http.is_some() {
        builder = builder.proxy(Proxy::custom(move |url: &Url| proxies.select(url)));
    }

    builder
        .user_agent(concat!("seniors-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

fn getenv_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| std::env::var(k).ok())
        .find(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default)]
struct ProxySettings {
    https: Option<String>,
    http: Option<String>,
    bypass: Vec<BypassRule>,
}

impl ProxySettings {
    /// Proxy URL for a request, or `None` to connect directly
    fn select(&self, url: &Url) -> Option<String> {
        let host = url.host_str().unwrap_or("");
        if self.bypass.iter().any(|rule| rule.matches(host)) {
            return None;
        }
        match url.scheme() {
            "https" => self.https.clone().or_else(|| self.http.clone()),
            "http" => self.http.clone().or_else(|| self.https.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BypassRule {
    Everything,
    /// Host and all of its subdomains
    Domain(String),
    Exact(String),
}

impl BypassRule {
    fn matches(&self, host: &str) -> bool {
        if host.is_empty() {
            return false;
        }
        let host = host.to_ascii_lowercase();
        match self {
            BypassRule::Everything => true,
            BypassRule::Exact(h) => host == *h,
            BypassRule::Domain(d) => host == *d || host.ends_with(&format!(".{}", d)),
        }
    }
}

fn parse_no_proxy(raw: &str) -> Vec<BypassRule> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            if token == "*" {
                return BypassRule::Everything;
            }
            let token = token.to_ascii_lowercase();
            if let Some(domain) = token.strip_prefix('.') {
                BypassRule::Domain(domain.to_string())
            } else if token == "localhost" || token.parse::<std::net::IpAddr>().is_ok() {
                BypassRule::Exact(token)
            } else {
                BypassRule::Domain(token)
            }
        })
        .collect()
}
