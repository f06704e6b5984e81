//! Destination URL validation and normalization.
//!
//! Tracking links only wrap absolute http/https URLs with a host. Accepted
//! URLs are stored in canonical form.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Destination URL is required")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a destination URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. Only HTTP and HTTPS with a non-empty host are allowed
/// 3. Hostname is lowercased
/// 4. Default ports (80, 443) are removed
/// 5. Fragments are removed
/// 6. Path and query are preserved as-is
///
/// # Errors
///
/// Returns [`UrlNormalizationError`] describing the first rule violated.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlNormalizationError::MissingHost)?
        .to_ascii_lowercase();

    url.set_host(Some(&host)).map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
    })?;

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_host_and_keeps_path_case() {
        assert_eq!(
            normalize_url("HTTPS://WWW.Amazon.COM/dp/B0ABC").unwrap(),
            "https://www.amazon.com/dp/B0ABC"
        );
    }

    #[test]
    fn test_normalize_strips_default_port_and_fragment() {
        assert_eq!(
            normalize_url("https://shop.example.com:443/item?ref=tw#reviews").unwrap(),
            "https://shop.example.com/item?ref=tw"
        );
        assert_eq!(
            normalize_url("http://example.com:80").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_normalize_keeps_custom_port() {
        assert_eq!(
            normalize_url("http://localhost:8080/p").unwrap(),
            "http://localhost:8080/p"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_url("  https://example.com/x \n").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(matches!(normalize_url("   "), Err(UrlNormalizationError::Empty)));
    }

    #[test]
    fn test_normalize_rejects_space_in_host() {
        assert!(matches!(
            normalize_url("https://not a url"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_relative() {
        assert!(matches!(
            normalize_url("example.com/path"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_other_schemes() {
        for input in [
            "ftp://example.com/file",
            "javascript:alert(1)",
            "mailto:a@example.com",
            "file:///etc/passwd",
        ] {
            assert!(
                matches!(
                    normalize_url(input),
                    Err(UrlNormalizationError::UnsupportedProtocol)
                ),
                "{input} should be rejected"
            );
        }
    }
}
