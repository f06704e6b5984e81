//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /r/{code}`    - Tracking redirect or crawler preview (public)
//! - `GET  /{code}`      - Alias of `/r/{code}` (public)
//! - `GET  /health`      - Store health checks (public)
//! - `/api/*`            - Dashboard API (Bearer token when configured)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Catch panic** - Handler panics become a JSON 500
//! - **Rate limiting** - Per-IP token bucket on `/api`
//! - **Authentication** - Bearer token on `/api`
//! - **Path normalization** - Trailing slash handling

use std::any::Any;

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::error::AppError;
use crate::state::AppState;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Router, middleware};
use serde_json::json;
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and middleware, without path
/// normalization.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting keys on `X-Forwarded-For` /
///   `X-Real-IP` instead of the peer socket address
pub fn router(state: AppState, behind_proxy: bool) -> Router {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::layer(behind_proxy));

    Router::new()
        .route("/r/{code}", get(redirect_handler))
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(tracing::layer())
}

/// Constructs the application service: [`router`] with trailing slashes
/// trimmed before routing.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, behind_proxy))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    ::tracing::error!(panic = detail, "Handler panicked");

    AppError::internal("Internal server error", json!({})).into_response()
}
