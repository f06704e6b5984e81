//! DTOs for link deletion endpoints.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Body of `POST /api/delete-link`, for hosts that mangle `DELETE`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLinkRequest {
    pub action: String,

    #[validate(
        length(min = 1, max = 64, message = "shortCode is required"),
        custom(function = "not_blank")
    )]
    pub short_code: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteLinkResponse {
    pub success: bool,
    pub message: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("shortCode is required".into()));
    }
    Ok(())
}
