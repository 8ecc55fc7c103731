//! Authentication service for the shared access token.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Checks request tokens against the single configured `APP_TOKEN`.
///
/// The configured token is kept only as an HMAC-SHA256 tag under a random
/// per-process key. Presented tokens are MAC'd under the same key and
/// compared with [`Mac::verify_slice`], which runs in constant time.
pub struct AuthService {
    key: [u8; 32],
    expected_tag: Vec<u8>,
}

impl AuthService {
    /// Creates an authentication service for `app_token`.
    pub fn new(app_token: &str) -> Self {
        let key: [u8; 32] = rand::random();
        let expected_tag = Self::mac(&key, app_token).finalize().into_bytes().to_vec();

        Self { key, expected_tag }
    }

    fn mac(key: &[u8; 32], token: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        mac
    }

    /// Authenticates the `token` query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is missing or empty.
    /// Returns [`AppError::Forbidden`] if it does not match.
    pub fn authenticate(&self, token: Option<&str>) -> Result<(), AppError> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            AppError::unauthorized("Token is required", json!({ "field": "token" }))
        })?;

        Self::mac(&self.key, token)
            .verify_slice(&self.expected_tag)
            .map_err(|_| AppError::forbidden("Invalid token", json!({})))
    }
}
