//! SQLite-backed link cache.
//!
//! Entries live in a single table:
//!
//! ```sql
//! CREATE TABLE cache (
//!     key    TEXT PRIMARY KEY,
//!     value  TEXT NOT NULL,
//!     expiry INTEGER NOT NULL  -- absolute, epoch seconds
//! )
//! ```
//!
//! SQLite has no native expiry, so [`LinkCache::get`] compares the stored
//! expiry with the current time and deletes the row when it has passed.

use super::service::{CacheError, CacheResult, LinkCache};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Embedded link cache stored in a SQLite database file.
pub struct SqliteCache {
    pool: Pool<Sqlite>,
    ttl_seconds: i64,
}

fn op_err(e: sqlx::Error) -> CacheError {
    CacheError::OperationError(format!("SQLite query failed: {}", e))
}

impl SqliteCache {
    /// Opens (creating if missing) the database file at `path` and ensures
    /// the cache table exists.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the file cannot be opened or
    /// the table cannot be created.
    pub async fn connect(path: &str, ttl_seconds: u64) -> CacheResult<Self> {
        info!("Opening SQLite cache at {}", path);

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .map_err(|e| CacheError::ConnectionError(format!("Invalid SQLite path: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // Concurrent writers wait for the lock instead of failing with "database is locked".
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Failed to open SQLite: {}", e)))?;

        let cache = Self::from_pool(pool, ttl_seconds);
        cache.migrate().await?;

        info!("✓ SQLite cache ready");
        Ok(cache)
    }

    /// Creates a private in-memory cache with the table already in place.
    ///
    /// Each connection to `sqlite::memory:` is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory(ttl_seconds: u64) -> CacheResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Failed to open SQLite: {}", e)))?;

        let cache = Self::from_pool(pool, ttl_seconds);
        cache.migrate().await?;
        Ok(cache)
    }

    /// Wraps an existing pool. Call [`Self::migrate`] before first use.
    pub fn from_pool(pool: Pool<Sqlite>, ttl_seconds: u64) -> Self {
        Self {
            pool,
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Creates the cache table if it does not exist.
    pub async fn migrate(&self) -> CacheResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expiry INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CacheError::ConnectionError(format!("Failed to create cache table: {}", e)))?;

        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Deletes every row whose expiry has passed.
    ///
    /// Returns the number of rows removed.
    pub async fn purge_expired(&self) -> CacheResult<u64> {
        let now = Utc::now().timestamp();

        let result = sqlx::query("DELETE FROM cache WHERE expiry < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(op_err)?;

        let purged = result.rows_affected();
        if purged > 0 {
            info!("Purged {} expired cache entries", purged);
        }
        Ok(purged)
    }
}

#[async_trait]
impl LinkCache for SqliteCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT value, expiry FROM cache WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(op_err)?;

        let Some((value, expiry)) = row else {
            debug!("Cache MISS: {}", key);
            return Ok(None);
        };

        if Utc::now().timestamp() <= expiry {
            debug!("Cache HIT: {}", key);
            return Ok(Some(value));
        }

        // Matching on expiry leaves a row rewritten by a concurrent `set` in place.
        if let Err(e) = sqlx::query("DELETE FROM cache WHERE key = ? AND expiry = ?")
            .bind(key)
            .bind(expiry)
            .execute(&self.pool)
            .await
        {
            warn!("Failed to delete expired cache entry {}: {}", key, e);
        }

        debug!("Cache EXPIRED: {}", key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let expiry = Utc::now().timestamp().saturating_add(self.ttl_seconds);

        sqlx::query(
            "INSERT INTO cache (key, value, expiry) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expiry = excluded.expiry",
        )
        .bind(key)
        .bind(value)
        .bind(expiry)
        .execute(&self.pool)
        .await
        .map_err(op_err)?;

        debug!("Cache SET: {} (expires at {})", key, expiry);
        Ok(())
    }

    async fn clear(&self, key: &str) -> CacheResult<()> {
        let result = sqlx::query("DELETE FROM cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(op_err)?;

        if result.rows_affected() > 0 {
            debug!("Cache CLEAR: {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
