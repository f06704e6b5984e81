//! Link entity representing a tracking link.

use chrono::{DateTime, Utc};

/// Social-preview metadata scraped from a link's destination page.
///
/// Every field is an empty string when the fetch failed or the page did not
/// declare the corresponding Open Graph tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPreview {
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: String,
}

impl LinkPreview {
    /// Returns true if no preview field was populated.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.image.is_empty()
            && self.price.is_empty()
    }
}

/// A tracking link wrapping a destination URL.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub destination: String,
    pub name: String,
    pub platform: String,
    pub preview: LinkPreview,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Host part of the destination, if it parses.
    pub fn destination_host(&self) -> Option<String> {
        url::Url::parse(&self.destination)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// Input data for persisting a new link.
///
/// The repository assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub destination: String,
    pub name: String,
    pub platform: String,
    pub preview: LinkPreview,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_link() -> Link {
        Link {
            id: 1,
            short_code: "abc123".to_string(),
            destination: "https://www.amazon.com/dp/B000".to_string(),
            name: "Headphones".to_string(),
            platform: "amazon".to_string(),
            preview: LinkPreview::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_preview_is_empty() {
        assert!(LinkPreview::default().is_empty());

        let preview = LinkPreview {
            title: "Title".to_string(),
            ..Default::default()
        };
        assert!(!preview.is_empty());
    }

    #[test]
    fn test_destination_host() {
        let link = sample_link();
        assert_eq!(link.destination_host().as_deref(), Some("www.amazon.com"));
    }

    #[test]
    fn test_destination_host_invalid_url() {
        let link = Link {
            destination: "not a url".to_string(),
            ..sample_link()
        };
        assert!(link.destination_host().is_none());
    }
}
