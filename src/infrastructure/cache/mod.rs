//! Link cache for issued signed URLs.
//!
//! Provides a [`LinkCache`] trait with two implementations, chosen once at
//! startup from `CACHE_DRIVER`:
//! - [`RedisCache`] - networked store with native TTL
//! - [`SqliteCache`] - embedded store with an expiry column checked on read

mod redis_cache;
mod service;
mod sqlite_cache;

pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, LinkCache};
pub use sqlite_cache::SqliteCache;

#[cfg(test)]
pub use service::MockLinkCache;
