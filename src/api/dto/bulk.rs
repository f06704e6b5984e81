//! DTOs for bulk link creation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::link::tracking_url;
use crate::application::services::link_service::BulkItem;
use crate::error::ErrorInfo;

/// Request body of `POST /api/links/bulk`.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCreateRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "urls must contain between 1 and 100 entries"
    ))]
    pub urls: Vec<String>,
}

/// Outcome for one URL of a bulk request.
///
/// Failed items carry `error` and no tracking URL or preview fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResponse {
    pub destination: String,
    pub platform: String,
    pub name: String,
    pub tracking_id: Option<String>,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_price: Option<String>,
}

impl BulkItemResponse {
    pub fn from_item(item: BulkItem, public_base_url: &str) -> Self {
        match item.result {
            Ok(link) => Self {
                destination: link.destination,
                platform: link.platform,
                name: link.name,
                tracking_url: Some(tracking_url(public_base_url, &link.short_code)),
                tracking_id: Some(link.short_code),
                success: true,
                error: None,
                og_title: Some(link.preview.title),
                og_description: Some(link.preview.description),
                og_image: Some(link.preview.image),
                og_price: Some(link.preview.price),
            },
            Err(e) => Self {
                destination: item.destination,
                platform: item.platform,
                name: String::new(),
                tracking_id: None,
                success: false,
                tracking_url: None,
                error: Some(e.to_error_info()),
                og_title: None,
                og_description: None,
                og_image: None,
                og_price: None,
            },
        }
    }
}
