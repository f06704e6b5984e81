//! Short code generation.
//!
//! Codes are random, URL-safe, and never chosen by users. Uniqueness is
//! enforced by the link store; callers retry on collision.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of random bytes before base64 encoding.
const CODE_LENGTH_BYTES: usize = 6;

/// Length of a generated short code.
pub const CODE_LENGTH: usize = 8;

/// Generates a cryptographically secure random short code.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing an 8-character code.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_code() -> Result<String, AppError> {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Checks that `code` has the shape of a generated short code.
///
/// Used by the redirect path to reject obviously bogus codes before touching
/// storage.
pub fn is_well_formed(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
