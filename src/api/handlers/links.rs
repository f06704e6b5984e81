//! Handlers for link management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::bulk::{BulkCreateRequest, BulkItemResponse};
use crate::api::dto::clicks::{ClickInfo, ClicksQuery};
use crate::api::dto::link::{CreateLinkRequest, LinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists all links, newest first, with click analytics.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// Each item carries `clicks` and `dailyClicks` (trailing 9 days, oldest
/// first). A click store outage zeroes the analytics instead of failing.
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list_all().await?;
    let mut analytics = state.stats_service.link_analytics(&links).await;

    let items = links
        .into_iter()
        .map(|link| {
            let a = analytics.remove(&link.short_code).unwrap_or_default();
            LinkResponse::from_link(link, &state.public_base_url).with_analytics(a)
        })
        .collect();

    Ok(Json(items))
}

/// Returns a single link with click analytics.
///
/// # Endpoint
///
/// `GET /api/links/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if no link has this id.
pub async fn get_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_by_id(id).await?;
    let analytics = state
        .stats_service
        .link_analytics(std::slice::from_ref(&link))
        .await
        .remove(&link.short_code)
        .unwrap_or_default();

    Ok(Json(
        LinkResponse::from_link(link, &state.public_base_url).with_analytics(analytics),
    ))
}

/// Creates a tracking link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Summer sale",                 // optional
///   "destination": "https://example.com",
///   "platform": "other"                    // optional, detected when empty
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.create_link(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.public_base_url)),
    ))
}

/// Creates tracking links for many destinations at once.
///
/// # Endpoint
///
/// `POST /api/links/bulk`
///
/// # Batch Processing
///
/// Processes URLs independently. If one fails, others continue processing.
/// Each result includes either the created link or error information.
///
/// # Errors
///
/// Returns 400 Bad Request if `urls` is empty or has more than 100 entries.
pub async fn bulk_create_handler(
    State(state): State<AppState>,
    Json(payload): Json<BulkCreateRequest>,
) -> Result<Json<Vec<BulkItemResponse>>, AppError> {
    payload.validate()?;

    let items = state.link_service.create_links_bulk(payload.urls).await?;

    Ok(Json(
        items
            .into_iter()
            .map(|item| BulkItemResponse::from_item(item, &state.public_base_url))
            .collect(),
    ))
}

/// Returns a link's click events, newest first, as a JSON array.
///
/// # Endpoint
///
/// `GET /api/links/{id}/clicks?limit=100`
///
/// # Errors
///
/// Returns 400 if `limit` is below 1.
/// Returns 404 if no link has this id.
pub async fn link_clicks_handler(
    Path(id): Path<i64>,
    Query(query): Query<ClicksQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClickInfo>>, AppError> {
    let limit = query.resolve_limit()?;
    let link = state.link_service.get_by_id(id).await?;

    let events = state
        .click_service
        .list_events(&link.short_code, limit)
        .await?;

    Ok(Json(events.into_iter().map(ClickInfo::from).collect()))
}

/// Re-fetches the Open Graph preview for a link.
///
/// # Endpoint
///
/// `POST /api/links/{id}/refresh-preview`
///
/// # Errors
///
/// Returns 404 if no link has this id.
pub async fn refresh_preview_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.refresh_preview(id).await?;

    Ok(Json(LinkResponse::from_link(link, &state.public_base_url)))
}
