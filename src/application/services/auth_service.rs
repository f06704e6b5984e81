//! Dashboard bearer-token authentication.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashSet;

use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses this
/// to produce values for `DASHBOARD_TOKEN_HASHES`.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Service answering "is this dashboard request authenticated?".
///
/// Only HMAC hashes of tokens are configured, never the tokens themselves.
/// With no hashes configured, authentication is disabled and every request
/// is accepted.
pub struct AuthService {
    token_hashes: HashSet<String>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `token_hashes` - hex HMAC-SHA256 hashes of accepted tokens
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new<I, S>(token_hashes: I, signing_secret: String) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            token_hashes: token_hashes
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            signing_secret,
        }
    }

    /// An auth service that accepts every request.
    pub fn disabled() -> Self {
        Self {
            token_hashes: HashSet::new(),
            signing_secret: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.token_hashes.is_empty()
    }

    /// Authenticates a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token's hash is not configured.
    pub fn authenticate(&self, token: &str) -> Result<(), AppError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let token_hash = hash_token(&self.signing_secret, token);

        if !self.token_hashes.contains(&token_hash) {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    #[test]
    fn test_authenticate_success() {
        let hash = hash_token(&test_secret(), "valid-token");
        let service = AuthService::new([hash.to_uppercase()], test_secret());

        assert!(service.is_enabled());
        assert!(service.authenticate("valid-token").is_ok());
    }

    #[test]
    fn test_authenticate_invalid_token() {
        let hash = hash_token(&test_secret(), "valid-token");
        let service = AuthService::new([hash], test_secret());

        let result = service.authenticate("invalid-token");

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let service = AuthService::new(["", "  "], test_secret());

        assert!(!service.is_enabled());
        assert!(service.authenticate("anything").is_ok());
        assert!(AuthService::disabled().authenticate("").is_ok());
    }

    #[test]
    fn test_hash_token_consistency() {
        let hash1 = hash_token(&test_secret(), "test-token");
        let hash2 = hash_token(&test_secret(), "test-token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, hash_token(&test_secret(), "other-token"));
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(hash_token("secret-a", "token"), hash_token("secret-b", "token"));
    }
}
