//! Tracking link creation, retrieval and deletion.

use std::sync::Arc;

use futures_util::{StreamExt, stream};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::services::ClickService;
use crate::domain::entities::{Link, LinkPreview, NewLink};
use crate::domain::platform::detect_platform;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::preview::{PreviewError, PreviewFetcher};
use crate::utils::code_generator::generate_code;
use crate::utils::url_normalizer::normalize_url;

/// Maximum number of URLs accepted by one bulk request.
pub const MAX_BULK_URLS: usize = 100;

/// Bulk items processed at once; each one may wait on a preview fetch.
const BULK_CONCURRENCY: usize = 8;

/// Input for [`LinkService::create_link`].
///
/// Empty `name` and `platform` are derived from the destination.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub name: String,
    pub destination: String,
    pub platform: String,
}

/// Outcome of one URL in a bulk creation.
#[derive(Debug)]
pub struct BulkItem {
    /// The URL as submitted.
    pub destination: String,
    pub platform: String,
    pub result: Result<Link, AppError>,
}

/// Service for creating and managing tracking links.
///
/// Handles URL normalization, code generation with collision retry,
/// best-effort preview fetching, and cascading deletes into the click store.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<ClickService>,
    preview: Arc<dyn PreviewFetcher>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<ClickService>,
        preview: Arc<dyn PreviewFetcher>,
    ) -> Self {
        Self {
            links,
            clicks,
            preview,
        }
    }

    /// Creates a tracking link.
    ///
    /// # Code Generation
    ///
    /// A random code is generated and inserted. If the store rejects it as a
    /// duplicate, a new code is generated, up to 10 attempts. An existing
    /// link is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the destination is missing or not
    /// an absolute http/https URL.
    ///
    /// Returns [`AppError::Internal`] if no free code was found.
    pub async fn create_link(&self, input: CreateLink) -> Result<Link, AppError> {
        let destination = normalize_url(&input.destination).map_err(|e| {
            AppError::bad_request(
                "Invalid destination URL",
                json!({ "destination": input.destination, "reason": e.to_string() }),
            )
        })?;

        let platform = match input.platform.trim() {
            "" => detect_platform(&destination).to_string(),
            p => p.to_ascii_lowercase(),
        };

        let preview = self.fetch_preview(&destination).await;

        let name = match input.name.trim() {
            "" if !preview.title.is_empty() => preview.title.clone(),
            "" => url::Url::parse(&destination)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| destination.clone()),
            n => n.to_string(),
        };

        const MAX_ATTEMPTS: usize = 10;

        for attempt in 1..=MAX_ATTEMPTS {
            let new_link = NewLink {
                short_code: generate_code()?,
                destination: destination.clone(),
                name: name.clone(),
                platform: platform.clone(),
                preview: preview.clone(),
            };

            match self.links.insert(new_link).await {
                Ok(link) => {
                    info!(short_code = %link.short_code, platform = %link.platform, "Link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    debug!(attempt, "Short code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Creates one link per URL. Failures are isolated per item.
    ///
    /// Names and platforms are always derived from the destination. Up to
    /// eight items are created concurrently; results keep the input order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `urls` is empty or longer than
    /// [`MAX_BULK_URLS`].
    pub async fn create_links_bulk(&self, urls: Vec<String>) -> Result<Vec<BulkItem>, AppError> {
        if urls.is_empty() || urls.len() > MAX_BULK_URLS {
            return Err(AppError::bad_request(
                format!("Provide between 1 and {MAX_BULK_URLS} URLs"),
                json!({ "count": urls.len() }),
            ));
        }

        let items = stream::iter(urls)
            .map(|url| async move {
                let result = self
                    .create_link(CreateLink {
                        destination: url.clone(),
                        ..Default::default()
                    })
                    .await;

                if let Err(e) = &result {
                    warn!(destination = %url, error = %e, "Bulk item failed");
                }

                BulkItem {
                    platform: detect_platform(url.trim()).to_string(),
                    destination: url,
                    result,
                }
            })
            .buffered(BULK_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        Ok(items)
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn get_by_short_code(&self, short_code: &str) -> Result<Link, AppError> {
        self.links
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "shortCode": short_code }))
            })
    }

    /// Retrieves a link by its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn get_by_id(&self, id: i64) -> Result<Link, AppError> {
        self.links
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    /// Lists every link, newest first.
    pub async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        self.links.list_all().await
    }

    /// Deletes a link and all of its click data in both click backends.
    ///
    /// Idempotent: an unknown code succeeds. Returns whether a link record
    /// existed.
    ///
    /// The link row goes first so no new redirect can resolve the code while
    /// its clicks are being removed.
    pub async fn delete_by_short_code(&self, short_code: &str) -> Result<bool, AppError> {
        let existed = self.links.delete_by_code(short_code).await?;
        let removed_clicks = self.clicks.delete_all_for_link(short_code).await?;

        info!(short_code, existed, removed_clicks, "Link deleted");

        Ok(existed)
    }

    /// Re-fetches preview metadata for an existing link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn refresh_preview(&self, id: i64) -> Result<Link, AppError> {
        let link = self.get_by_id(id).await?;
        let preview = self.fetch_preview(&link.destination).await;

        self.links
            .update_preview(id, preview)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    /// Returns `true` if the link store answers.
    pub async fn health_check(&self) -> bool {
        self.links.health_check().await
    }

    /// Fetches preview metadata; any failure yields empty fields.
    async fn fetch_preview(&self, destination: &str) -> LinkPreview {
        match self.preview.fetch(destination).await {
            Ok(preview) => preview,
            Err(PreviewError::Disabled) => LinkPreview::default(),
            Err(e) => {
                metrics::counter!("preview_fetch_failures_total").increment(1);
                warn!(destination, error = %e, "Preview fetch failed");
                LinkPreview::default()
            }
        }
    }
}
