//! Cache-backed signed link issuance.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::MediaPath;
use crate::error::AppError;
use crate::infrastructure::cache::LinkCache;
use crate::infrastructure::storage::UrlSigner;

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the link cache; no signing call was made.
    Cached(String),
    /// Freshly signed on this request.
    Signed(String),
}

impl Resolution {
    pub fn url(&self) -> &str {
        match self {
            Resolution::Cached(url) | Resolution::Signed(url) => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Resolution::Cached(url) | Resolution::Signed(url) => url,
        }
    }
}

/// Decides, per request, whether to serve a cached link or sign a new one.
///
/// # Request Flow
///
/// 1. With `fresh`, clear the entry first (failure aborts the request)
/// 2. Look up the cache; a hit returns immediately
/// 3. On a miss, sign the path (failure aborts the request)
/// 4. Write the new link back to the cache (failure is logged and ignored)
///
/// There is no single-flight: two concurrent misses for one path both sign
/// and both write, and the last write wins.
pub struct LinkResolver {
    cache: Arc<dyn LinkCache>,
    signer: Arc<dyn UrlSigner>,
}

impl LinkResolver {
    /// Creates a resolver over a cache backend and a signer.
    pub fn new(cache: Arc<dyn LinkCache>, signer: Arc<dyn UrlSigner>) -> Self {
        Self { cache, signer }
    }

    /// Resolves `path` to a signed URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if:
    /// - clearing the entry for a forced refresh fails
    /// - the cache backend fails on read (a miss is not a failure)
    /// - signing fails
    pub async fn resolve(&self, path: &MediaPath, fresh: bool) -> Result<Resolution, AppError> {
        let key = path.cache_key();

        if fresh {
            self.clear_key(&key).await?;
        }

        match self.cache.get(&key).await {
            Ok(Some(url)) => return Ok(Resolution::Cached(url)),
            Ok(None) => {}
            Err(e) => {
                error!("Cache read failed for {}: {}", key, e);
                return Err(AppError::internal(
                    "Failed to read link cache",
                    json!({}),
                ));
            }
        }

        let url = self.signer.sign(path.as_str()).await.map_err(|e| {
            error!("Signing failed for {}: {}", path.as_str(), e);
            AppError::internal("Failed to generate signed URL", json!({}))
        })?;

        if let Err(e) = self.cache.set(&key, &url).await {
            warn!("Failed to cache signed URL for {}: {}", key, e);
        }

        Ok(Resolution::Signed(url))
    }

    /// Drops any cached link for `path` without signing a new one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the cache backend fails.
    pub async fn invalidate(&self, path: &MediaPath) -> Result<(), AppError> {
        self.clear_key(&path.cache_key()).await
    }

    async fn clear_key(&self, key: &str) -> Result<(), AppError> {
        self.cache.clear(key).await.map_err(|e| {
            error!("Cache clear failed for {}: {}", key, e);
            AppError::internal("Failed to clear cache", json!({}))
        })?;
        debug!("Cleared cache entry {}", key);
        Ok(())
    }
}
