//! DTOs for link creation and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::link_service::CreateLink;
use crate::application::services::stats_service::{ANALYTICS_DAYS, LinkAnalytics};
use crate::domain::entities::Link;

/// Request body of `POST /api/links`.
///
/// `name` and `platform` may be omitted; the service derives them.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 2048,
        message = "destination must be between 1 and 2048 characters"
    ))]
    pub destination: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "platform must be at most 32 characters"))]
    pub platform: String,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        Self {
            name: req.name,
            destination: req.destination,
            platform: req.platform,
        }
    }
}

/// A link as returned by the dashboard API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub tracking_url: String,
    pub destination: String,
    pub name: String,
    pub platform: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub og_price: String,
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicks: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_clicks: Option<[i64; ANALYTICS_DAYS]>,
}

impl LinkResponse {
    pub fn from_link(link: Link, public_base_url: &str) -> Self {
        Self {
            id: link.id,
            tracking_url: tracking_url(public_base_url, &link.short_code),
            short_code: link.short_code,
            destination: link.destination,
            name: link.name,
            platform: link.platform,
            og_title: link.preview.title,
            og_description: link.preview.description,
            og_image: link.preview.image,
            og_price: link.preview.price,
            created_at: link.created_at,
            clicks: None,
            daily_clicks: None,
        }
    }

    pub fn with_analytics(mut self, analytics: LinkAnalytics) -> Self {
        self.clicks = Some(analytics.clicks);
        self.daily_clicks = Some(analytics.daily_clicks);
        self
    }
}

/// Public redirect URL for a short code.
pub fn tracking_url(public_base_url: &str, short_code: &str) -> String {
    format!("{}/r/{}", public_base_url.trim_end_matches('/'), short_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LinkPreview;

    #[test]
    fn test_link_response_shape() {
        let link = Link {
            id: 7,
            short_code: "abc123".to_string(),
            destination: "https://example.com/".to_string(),
            name: "Example".to_string(),
            platform: "other".to_string(),
            preview: LinkPreview {
                title: "T".to_string(),
                ..Default::default()
            },
            created_at: Utc::now(),
        };

        let body = serde_json::to_value(LinkResponse::from_link(link, "https://lp.test/")).unwrap();

        assert_eq!(body["trackingUrl"], "https://lp.test/r/abc123");
        assert_eq!(body["shortCode"], "abc123");
        assert_eq!(body["ogTitle"], "T");
        assert_eq!(body["ogPrice"], "");
        assert!(body.get("clicks").is_none());
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateLinkRequest {
            name: String::new(),
            destination: String::new(),
            platform: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
