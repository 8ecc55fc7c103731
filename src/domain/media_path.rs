//! Validated object path and the cache key derived from it.

use crate::error::AppError;
use crate::infrastructure::storage::object_key;
use serde_json::json;

/// Namespace prefix for every link cache key.
pub const CACHE_KEY_PREFIX: &str = "media_cache:";

/// An object path as supplied by the caller, naming a non-empty object key.
///
/// The path is kept verbatim for signing; the signer strips a leading `/`
/// itself. The cache key is built from the stripped form so that `/a.jpg`
/// and `a.jpg` share one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPath(String);

impl MediaPath {
    /// Validates a raw `path` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the path is empty or is a bare
    /// `/`, which would address the bucket itself rather than an object.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if object_key(raw).is_empty() {
            return Err(AppError::bad_request(
                "Missing path",
                json!({ "field": "path" }),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache key for this path: `media_cache:<object key>`.
    ///
    /// Scoped by path only. The caller's token gates access but does not
    /// partition the cache.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, object_key(&self.0))
    }
}
