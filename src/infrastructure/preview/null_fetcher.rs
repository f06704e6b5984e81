//! No-op preview fetcher for disabled outbound fetches and tests.

use super::service::{PreviewError, PreviewFetcher, PreviewResult};
use crate::domain::entities::LinkPreview;
use async_trait::async_trait;
use tracing::debug;

/// A fetcher that never performs network requests.
///
/// Used when `PREVIEW_FETCH_ENABLED=false` and in integration tests.
pub struct NullPreviewFetcher;

impl NullPreviewFetcher {
    pub fn new() -> Self {
        debug!("Using NullPreviewFetcher (preview fetching disabled)");
        Self
    }
}

impl Default for NullPreviewFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreviewFetcher for NullPreviewFetcher {
    async fn fetch(&self, _url: &str) -> PreviewResult<LinkPreview> {
        Err(PreviewError::Disabled)
    }
}
