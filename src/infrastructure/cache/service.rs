//! Link cache trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// A missing or expired entry is never an error; see [`LinkCache::get`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store for issued signed links.
///
/// Every entry expires one configured window after the `set` call that wrote
/// it. The window is fixed at construction and is the same window the signer
/// uses, so a cached link never outlives its own lifetime by more than the
/// sign-to-write latency.
///
/// Implementations must be thread-safe; they are shared as
/// `Arc<dyn LinkCache>` across all request handlers.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - native `EX` expiry
/// - [`crate::infrastructure::cache::SqliteCache`] - expiry column checked on read
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkCache: Send + Sync {
    /// Looks up a cached link.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on a live hit
    /// - `Ok(None)` if the key is absent or its entry has expired
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] only when the backend itself fails (broken
    /// connection, I/O error). Callers must not treat that as a miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Inserts or replaces an entry, expiring one window from now.
    ///
    /// Setting the same key twice replaces the value and restarts the expiry
    /// from the second call.
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Removes an entry. Removing an absent key succeeds.
    async fn clear(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    ///
    /// Used by the health endpoint and the admin CLI.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
