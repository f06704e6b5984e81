//! Handler for tracking link redirects and crawler previews.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{debug, error};

use crate::domain::entities::{Link, NewClick};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::ClientInfo;
use crate::utils::code_generator::is_well_formed;

/// Social preview page served to crawlers.
///
/// Renders `templates/preview.html` with Open Graph and Twitter card tags,
/// a meta refresh and a plain link to the destination.
#[derive(Template, WebTemplate)]
#[template(path = "preview.html")]
pub struct PreviewPage {
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: String,
    pub price_amount: String,
    pub price_currency: String,
    pub destination: String,
    pub tracking_url: String,
}

impl PreviewPage {
    /// Builds the page from a link, falling back to its name for the title.
    pub fn for_link(link: &Link, tracking_url: String) -> Self {
        let preview = &link.preview;
        let title = if preview.title.is_empty() {
            link.name.clone()
        } else {
            preview.title.clone()
        };
        let (price_amount, price_currency) = match preview.price.split_once(' ') {
            Some((amount, currency)) => (amount.to_string(), currency.to_string()),
            None => (preview.price.clone(), String::new()),
        };

        Self {
            title,
            description: preview.description.clone(),
            image: preview.image.clone(),
            price: preview.price.clone(),
            price_amount,
            price_currency,
            destination: link.destination.clone(),
            tracking_url,
        }
    }
}

/// Resolves a tracking link.
///
/// # Endpoint
///
/// `GET /r/{code}` and the alias `GET /{code}`
///
/// # Request Flow
///
/// 1. Look up the link; unknown codes get a JSON 404 and nothing is recorded
/// 2. Classify the `User-Agent`
/// 3. Crawlers get a 200 HTML preview page, no click is recorded
/// 4. Humans get a click recorded, then `302 Found` to the destination
///
/// Click recording never fails the redirect: the click service absorbs
/// storage errors into its fallback.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 500 if the link store itself is unavailable.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    if !is_well_formed(&code) {
        return Err(link_not_found(&code));
    }

    let link = match state.link_service.get_by_short_code(&code).await {
        Ok(link) => link,
        Err(AppError::NotFound { .. }) => return Err(link_not_found(&code)),
        Err(e) => {
            error!(short_code = %code, error = %e, "Link lookup failed during redirect");
            return Err(AppError::internal(
                "Service temporarily unavailable",
                json!({}),
            ));
        }
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    if state.crawler_detector.is_crawler(user_agent) {
        debug!(short_code = %code, user_agent, "Serving crawler preview");
        metrics::counter!("crawler_previews_total").increment(1);

        let page = PreviewPage::for_link(&link, state.tracking_url(&link.short_code));
        return Ok(page.into_response());
    }

    let client = ClientInfo::from_request(&headers, Some(addr), &state.client_info);

    let mut new_click = NewClick::new(link.short_code.as_str(), link.destination.as_str())
        .with_country(client.country);
    new_click.ip = client.ip;
    new_click.user_agent = client.user_agent;
    new_click.referrer = client.referrer;

    state.click_service.record(new_click).await;

    Ok(found(&link.destination))
}

fn link_not_found(code: &str) -> AppError {
    AppError::not_found("Link not found", json!({ "shortCode": code }))
}

/// `302 Found` with caching disabled so every visit reaches the tracker.
fn found(destination: &str) -> Response {
    match HeaderValue::from_str(destination) {
        Ok(location) => (
            StatusCode::FOUND,
            [
                (header::LOCATION, location),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
            ],
        )
            .into_response(),
        Err(_) => AppError::internal(
            "Destination is not a valid Location header",
            json!({ "destination": destination }),
        )
        .into_response(),
    }
}
