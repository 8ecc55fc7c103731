//! Redis-backed link cache.

use super::service::{CacheError, CacheResult, LinkCache};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis cache relying on native key expiry.
///
/// Uses `ConnectionManager` for automatic reconnection; each operation is a
/// single round trip. Unlike a fail-open cache, errors are returned to the
/// caller so that a broken connection is distinguishable from a miss.
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `ttl_seconds` - expiry applied to every entry written by [`LinkCache::set`]
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl LinkCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::OperationError(format!("Redis GET failed: {}", e)))?;

        match value {
            Some(_) => debug!("Cache HIT: {}", key),
            None => debug!("Cache MISS: {}", key),
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(key, value, self.ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("Redis SET failed: {}", e)))?;

        debug!("Cache SET: {} (TTL: {}s)", key, self.ttl_seconds);
        Ok(())
    }

    async fn clear(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(key)
            .await
            .map_err(|e| CacheError::OperationError(format!("Redis DEL failed: {}", e)))?;

        if deleted > 0 {
            debug!("Cache CLEAR: {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
