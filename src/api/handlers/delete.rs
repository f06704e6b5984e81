//! Handlers for cascading link deletion.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::delete::{DeleteLinkRequest, DeleteLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Deletes a link and all of its click data.
///
/// # Endpoint
///
/// `DELETE /api/delete-link/{code}`
///
/// Idempotent: deleting an unknown code succeeds.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteLinkResponse>, AppError> {
    delete_link(&state, &code).await.map(Json)
}

/// Same as [`delete_link_handler`] for clients that cannot send `DELETE`.
///
/// # Endpoint
///
/// `POST /api/delete-link`
///
/// # Request Body
///
/// ```json
/// { "action": "delete", "shortCode": "abc123" }
/// ```
///
/// # Errors
///
/// Returns 400 if `action` is not `"delete"` or `shortCode` is missing.
pub async fn delete_link_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<DeleteLinkRequest>,
) -> Result<Json<DeleteLinkResponse>, AppError> {
    payload.validate()?;

    if payload.action != "delete" {
        return Err(AppError::bad_request(
            "Unsupported action",
            json!({ "action": payload.action }),
        ));
    }

    delete_link(&state, payload.short_code.trim()).await.map(Json)
}

async fn delete_link(state: &AppState, code: &str) -> Result<DeleteLinkResponse, AppError> {
    let existed = state.link_service.delete_by_short_code(code).await?;

    let message = if existed {
        format!("Link {code} and its click data were deleted")
    } else {
        format!("Link {code} did not exist; nothing to delete")
    };

    Ok(DeleteLinkResponse {
        success: true,
        message,
    })
}
