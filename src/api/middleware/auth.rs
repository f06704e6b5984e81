//! Bearer token authentication for the dashboard API.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Authenticates dashboard requests using Bearer tokens.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// When no token hashes are configured authentication is disabled and every
/// request passes through untouched.
///
/// # Errors
///
/// Returns `401 Unauthorized` (with `WWW-Authenticate: Bearer`) if the
/// header is missing, malformed, or the token's hash is not configured.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !st.auth_service.is_enabled() {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    st.auth_service.authenticate(&token)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
