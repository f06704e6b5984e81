//! reqwest-backed preview fetcher with Open Graph extraction.

use super::service::{PreviewError, PreviewFetcher, PreviewResult};
use crate::domain::entities::LinkPreview;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, redirect::Policy};
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Maximum redirects followed for one fetch.
pub const MAX_REDIRECTS: usize = 5;

/// Maximum body bytes read from the destination page.
pub const MAX_BODY_BYTES: usize = 512 * 1024;

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("valid meta regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attribute regex")
});

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));

/// Fetches destination pages over HTTP and parses their preview tags.
///
/// Requests are bounded by a total timeout, at most [`MAX_REDIRECTS`]
/// redirects, and [`MAX_BODY_BYTES`] of body.
pub struct HttpPreviewFetcher {
    client: Client,
}

impl HttpPreviewFetcher {
    /// Builds a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, PreviewError> {
        let client = Client::builder()
            .user_agent(concat!("linkpulse-preview/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| PreviewError::Request(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PreviewFetcher for HttpPreviewFetcher {
    async fn fetch(&self, url: &str) -> PreviewResult<LinkPreview> {
        let mut response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| PreviewError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::Status(status.as_u16()));
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PreviewError::Request(e.to_string()))?
        {
            let remaining = MAX_BODY_BYTES - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                debug!(url, "Preview body truncated at {} bytes", MAX_BODY_BYTES);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(parse_preview(&String::from_utf8_lossy(&body)))
    }
}

/// Extracts preview metadata from an HTML document.
///
/// Reads `og:title`, `og:description`, `og:image` and the product price
/// tags. The title falls back to `twitter:title` and then `<title>`, the
/// description to `twitter:description` and `description`.
pub fn parse_preview(html: &str) -> LinkPreview {
    let mut meta: HashMap<String, String> = HashMap::new();

    for tag in META_TAG.find_iter(html) {
        let mut key = None;
        let mut content = None;

        for cap in ATTRIBUTE.captures_iter(tag.as_str()) {
            let name = cap[1].to_ascii_lowercase();
            let value = cap.get(2).or_else(|| cap.get(3)).map_or("", |m| m.as_str());
            match name.as_str() {
                "property" | "name" | "itemprop" => {
                    key.get_or_insert_with(|| value.trim().to_ascii_lowercase());
                }
                "content" => content = Some(decode_entities(value.trim())),
                _ => {}
            }
        }

        if let (Some(key), Some(content)) = (key, content)
            && !content.is_empty()
        {
            meta.entry(key).or_insert(content);
        }
    }

    let first = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| meta.get(*k).cloned())
            .unwrap_or_default()
    };

    let title = match first(&["og:title", "twitter:title"]) {
        t if t.is_empty() => TITLE_TAG
            .captures(html)
            .map(|c| decode_entities(c[1].trim()))
            .unwrap_or_default(),
        t => t,
    };

    let amount = first(&["og:price:amount", "product:price:amount", "price"]);
    let currency = first(&["og:price:currency", "product:price:currency", "pricecurrency"]);
    let price = match (amount.is_empty(), currency.is_empty()) {
        (true, _) => String::new(),
        (false, true) => amount,
        (false, false) => format!("{amount} {currency}"),
    };

    LinkPreview {
        title,
        description: first(&["og:description", "twitter:description", "description"]),
        image: first(&["og:image", "og:image:url", "twitter:image"]),
        price,
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
