//! Handler for aggregated click statistics.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::stats::{StatsQuery, StatsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns per-link click statistics merged over both click stores.
///
/// # Endpoint
///
/// `GET /api/click-stats`
///
/// # Query Parameters
///
/// - `dateFrom`, `dateTo` - inclusive day range (`YYYY-MM-DD` or RFC 3339)
/// - `recent` - number of newest events attached per row (0 to 50)
///
/// # Degraded Mode
///
/// When the primary click store fails, rows are built from the fallback
/// and `meta.degraded` is `true`.
///
/// # Errors
///
/// Returns 400 for invalid parameters or an inverted date range.
/// Returns 500 if the primary store fails and the fallback holds no data.
pub async fn click_stats_handler(
    Query(query): Query<StatsQuery>,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let filter = query.into_filter()?;
    let report = state.stats_service.get_stats(filter).await?;

    Ok(Json(report.into()))
}
