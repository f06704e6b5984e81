//! Request metadata extraction for click recording.

use axum::http::{HeaderMap, header};
use std::net::SocketAddr;

/// Country header values meaning "the edge could not geolocate".
const UNKNOWN_COUNTRY_VALUES: &[&str] = &["XX", "T1"];

/// Settings controlling how client metadata is read from a request.
#[derive(Debug, Clone)]
pub struct ClientInfoConfig {
    /// Trust `X-Forwarded-For` / `X-Real-IP`.
    pub behind_proxy: bool,
    /// Edge country headers, checked in order.
    pub country_headers: Vec<String>,
}

impl Default for ClientInfoConfig {
    fn default() -> Self {
        Self {
            behind_proxy: false,
            country_headers: default_country_headers(),
        }
    }
}

/// Country headers set by common CDNs and edge platforms.
pub fn default_country_headers() -> Vec<String> {
    [
        "cf-ipcountry",
        "x-vercel-ip-country",
        "cloudfront-viewer-country",
        "x-country-code",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Metadata captured for a human click.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
}

impl ClientInfo {
    /// Reads client metadata from request headers and the socket peer.
    pub fn from_request(
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        config: &ClientInfoConfig,
    ) -> Self {
        Self {
            ip: client_ip(headers, peer, config.behind_proxy),
            user_agent: header_str(headers, header::USER_AGENT.as_str()),
            referrer: header_str(headers, header::REFERER.as_str()),
            country: client_country(headers, &config.country_headers),
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolves the client IP.
///
/// Behind a proxy the first `X-Forwarded-For` entry wins, then `X-Real-IP`.
/// Otherwise only the socket peer is used.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> Option<String> {
    if behind_proxy {
        let forwarded = header_str(headers, "x-forwarded-for").and_then(|v| {
            v.split(',')
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string)
        });

        if let Some(ip) = forwarded.or_else(|| header_str(headers, "x-real-ip")) {
            return Some(ip);
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

/// Returns the country from the first configured header with a usable value.
pub fn client_country(headers: &HeaderMap, country_headers: &[String]) -> Option<String> {
    country_headers.iter().find_map(|name| {
        header_str(headers, name)
            .map(|v| v.to_ascii_uppercase())
            .filter(|v| !UNKNOWN_COUNTRY_VALUES.contains(&v.as_str()))
    })
}
