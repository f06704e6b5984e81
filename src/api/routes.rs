//! Dashboard API route configuration.
//!
//! All endpoints are protected by [`crate::api::middleware::auth`] when
//! dashboard tokens are configured.

use crate::api::handlers::{
    bulk_create_handler, click_stats_handler, create_link_handler, delete_link_handler,
    delete_link_post_handler, get_link_handler, link_clicks_handler, list_links_handler,
    refresh_preview_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Dashboard routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET    /links`                      - List links with click analytics
/// - `POST   /links`                      - Create a tracking link
/// - `POST   /links/bulk`                 - Create up to 100 links at once
/// - `GET    /links/{id}`                 - Single link with click analytics
/// - `GET    /links/{id}/clicks`          - Click events, newest first
/// - `POST   /links/{id}/refresh-preview` - Re-fetch Open Graph metadata
/// - `GET    /click-stats`                - Aggregated click statistics
/// - `DELETE /delete-link/{code}`         - Cascading delete
/// - `POST   /delete-link`                - Cascading delete via JSON body
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route("/links/bulk", post(bulk_create_handler))
        .route("/links/{id}", get(get_link_handler))
        .route("/links/{id}/clicks", get(link_clicks_handler))
        .route("/links/{id}/refresh-preview", post(refresh_preview_handler))
        .route("/click-stats", get(click_stats_handler))
        .route("/delete-link", post(delete_link_post_handler))
        .route("/delete-link/{code}", delete(delete_link_handler))
}
