//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All stores healthy
/// - **503 Service Unavailable**: One or more stores degraded
///
/// A failing primary click store still means clicks are being captured by
/// the fallback, but the service reports itself degraded until it recovers.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "linkStore": { "status": "ok", "message": "Reachable" },
///     "clickStore": { "status": "ok", "message": "Reachable" },
///     "fallbackStore": { "status": "ok", "message": "Reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (link_ok, click_ok, fallback_ok) = tokio::join!(
        state.link_service.health_check(),
        state.click_service.primary().health_check(),
        state.click_service.fallback().health_check(),
    );

    let checks = HealthChecks {
        link_store: check(link_ok, "Link store unreachable"),
        click_store: check(click_ok, "Click store unreachable, clicks go to fallback"),
        fallback_store: check(fallback_ok, "Fallback click store unavailable"),
    };

    let all_healthy =
        checks.link_store.is_ok() && checks.click_store.is_ok() && checks.fallback_store.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

fn check(healthy: bool, failure: &str) -> CheckStatus {
    if healthy {
        CheckStatus::ok("Reachable")
    } else {
        CheckStatus::error(failure)
    }
}
