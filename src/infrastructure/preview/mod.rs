//! Social-preview metadata fetching.
//!
//! Provides a [`PreviewFetcher`] trait with two implementations:
//! - [`HttpPreviewFetcher`] - Fetches the destination page and extracts Open Graph tags
//! - [`NullPreviewFetcher`] - No-op implementation when fetching is disabled

mod http_fetcher;
mod null_fetcher;
mod service;

pub use http_fetcher::{HttpPreviewFetcher, parse_preview};
pub use null_fetcher::NullPreviewFetcher;
pub use service::{PreviewError, PreviewFetcher, PreviewResult};

#[cfg(test)]
pub use service::MockPreviewFetcher;
