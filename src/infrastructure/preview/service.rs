//! Preview fetcher trait and error types.

use async_trait::async_trait;

use crate::domain::entities::LinkPreview;

/// Errors that can occur while fetching preview metadata.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("Preview request failed: {0}")]
    Request(String),

    #[error("Preview fetch returned status {0}")]
    Status(u16),

    #[error("Preview fetching is disabled")]
    Disabled,
}

/// Result type for preview operations.
pub type PreviewResult<T> = Result<T, PreviewError>;

/// Fetches Open Graph metadata for a destination URL.
///
/// Callers treat every error as "no preview": link creation never fails
/// because a destination page could not be fetched.
///
/// # Implementations
///
/// - [`crate::infrastructure::preview::HttpPreviewFetcher`] - reqwest-based fetch with bounded time and size
/// - [`crate::infrastructure::preview::NullPreviewFetcher`] - disabled fetching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreviewFetcher: Send + Sync {
    /// Fetches and parses the preview metadata of `url`.
    async fn fetch(&self, url: &str) -> PreviewResult<LinkPreview>;
}
