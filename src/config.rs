//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup, validated, and then passed by value
//! into the components that need it. Nothing reads the environment after that.
//!
//! ## Example
//!
//! ```bash
//! export APP_TOKEN="secret"
//! export S3_BUCKET="media"
//! export S3_REGION="us-east-1"
//! export S3_ENDPOINT="http://localhost:9000"
//! export AWS_ACCESS_KEY="minioadmin"
//! export AWS_SECRET_KEY="minioadmin"
//!
//! export CACHE_DRIVER="redis"          # or "sqlite"
//! export REDIS_URL="redis://localhost:6379/0"
//! export CACHE_EXPIRY_HOURS="24"
//! ```
//!
//! ## Required Variables
//!
//! - `APP_TOKEN` - Shared secret expected in the `token` query parameter
//! - `S3_BUCKET`, `AWS_ACCESS_KEY`, `AWS_SECRET_KEY`
//! - `CACHE_DRIVER` - `redis` or `sqlite`
//! - `REDIS_URL` / `REDIS_HOST` when `CACHE_DRIVER=redis`
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:$SERVER_PORT`, port default `8080`)
//! - `S3_REGION` - Signing region (default: `us-east-1`)
//! - `S3_ENDPOINT` - Custom S3-compatible endpoint (AWS when unset)
//! - `S3_PATH_STYLE` - Path-style addressing (default: `true` with a custom endpoint)
//! - `SQLITE_PATH` - Cache database file (default: `./cache.db`)
//! - `CACHE_EXPIRY_SECONDS` / `CACHE_EXPIRY_HOURS` - Link lifetime (default: 24 hours)
//! - `RATE_LIMIT_REQUESTS_PER_SECOND` - Token refill rate (default: 5)
//! - `RATE_LIMIT_BURST_SIZE` - Bucket capacity (default: 10)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Longest lifetime S3 accepts for a SigV4 presigned URL (7 days).
pub const MAX_EXPIRY_SECONDS: u64 = 604_800;

const DEFAULT_EXPIRY_HOURS: u64 = 24;
const DEFAULT_RATE_PER_SECOND: u32 = 5;
const DEFAULT_BURST_SIZE: u32 = 10;

/// Which backend holds cached links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDriver {
    Redis,
    Sqlite,
}

impl FromStr for CacheDriver {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "sqlite" => Ok(Self::Sqlite),
            other => anyhow::bail!("CACHE_DRIVER must be 'redis' or 'sqlite', got '{}'", other),
        }
    }
}

impl fmt::Display for CacheDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => f.write_str("redis"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Object store connection settings.
#[derive(Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &"***")
            .field("secret_key", &"***")
            .field("path_style", &self.path_style)
            .finish()
    }
}

/// Token bucket parameters for the process-wide rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_RATE_PER_SECOND,
            burst_size: DEFAULT_BURST_SIZE,
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// Shared secret compared against the `token` query parameter.
    pub app_token: String,
    pub s3: S3Config,
    pub cache_driver: CacheDriver,
    pub redis_url: Option<String>,
    pub sqlite_path: String,
    /// Lifetime of both the signed URL and its cache entry.
    pub expiry_seconds: u64,
    pub rate_limit: RateLimitConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("app_token", &"***")
            .field("s3", &self.s3)
            .field("cache_driver", &self.cache_driver)
            .field("redis_url", &self.redis_url.as_deref().map(mask_connection_string))
            .field("sqlite_path", &self.sqlite_path)
            .field("expiry_seconds", &self.expiry_seconds)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Numeric variables that fail to parse fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or `CACHE_DRIVER`
    /// names an unknown backend.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| {
            let port = env::var("SERVER_PORT").unwrap_or_else(|_| "8080".to_string());
            format!("0.0.0.0:{}", port)
        });
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let app_token = env::var("APP_TOKEN").context("APP_TOKEN must be set")?;

        let s3 = Self::load_s3().context("Failed to load object storage configuration")?;

        let cache_driver: CacheDriver = env::var("CACHE_DRIVER")
            .context("CACHE_DRIVER must be set")?
            .parse()?;

        let redis_url = Self::load_redis_url();
        let sqlite_path = env::var("SQLITE_PATH").unwrap_or_else(|_| "./cache.db".to_string());

        let expiry_seconds = Self::load_expiry_seconds();

        let rate_limit = RateLimitConfig {
            requests_per_second: parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", DEFAULT_RATE_PER_SECOND),
            burst_size: parse_or("RATE_LIMIT_BURST_SIZE", DEFAULT_BURST_SIZE),
        };

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            app_token,
            s3,
            cache_driver,
            redis_url,
            sqlite_path,
            expiry_seconds,
            rate_limit,
        })
    }

    fn load_s3() -> Result<S3Config> {
        let bucket = env::var("S3_BUCKET").context("S3_BUCKET must be set")?;
        let region = env::var("S3_REGION")
            .ok()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "us-east-1".to_string());
        let endpoint = env::var("S3_ENDPOINT").ok().filter(|e| !e.is_empty());
        let access_key = env::var("AWS_ACCESS_KEY").context("AWS_ACCESS_KEY must be set")?;
        let secret_key = env::var("AWS_SECRET_KEY").context("AWS_SECRET_KEY must be set")?;

        let path_style = env::var("S3_PATH_STYLE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(endpoint.is_some());

        Ok(S3Config {
            bucket,
            region,
            endpoint,
            access_key,
            secret_key,
            path_style,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// `REDIS_HOST` may carry its own port (`localhost:6379`), in which case
    /// `REDIS_PORT` is ignored.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok().filter(|h| !h.is_empty())?;
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let address = if host.contains(':') {
            host
        } else {
            let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
            format!("{}:{}", host, port)
        };

        let url = match env::var("REDIS_PASSWORD") {
            Ok(pwd) if !pwd.is_empty() => format!("redis://:{}@{}/{}", pwd, address, db),
            _ => format!("redis://{}/{}", address, db),
        };

        Some(url)
    }

    /// `CACHE_EXPIRY_SECONDS` wins over `CACHE_EXPIRY_HOURS`; 24 hours otherwise.
    fn load_expiry_seconds() -> u64 {
        if let Some(seconds) = env::var("CACHE_EXPIRY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            return seconds;
        }

        parse_or("CACHE_EXPIRY_HOURS", DEFAULT_EXPIRY_HOURS).saturating_mul(3600)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `app_token` or any required S3 field is empty
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` has no port
    /// - the expiry window is zero or longer than [`MAX_EXPIRY_SECONDS`]
    /// - the Redis driver is selected without a valid Redis URL
    /// - a rate limit parameter is zero
    pub fn validate(&self) -> Result<()> {
        if self.app_token.is_empty() {
            anyhow::bail!("APP_TOKEN must not be empty");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.s3.bucket.is_empty() {
            anyhow::bail!("S3_BUCKET must not be empty");
        }
        if self.s3.access_key.is_empty() || self.s3.secret_key.is_empty() {
            anyhow::bail!("AWS_ACCESS_KEY and AWS_SECRET_KEY must not be empty");
        }
        if let Some(ref endpoint) = self.s3.endpoint {
            url::Url::parse(endpoint)
                .with_context(|| format!("S3_ENDPOINT is not a valid URL: '{}'", endpoint))?;
        }

        if self.expiry_seconds == 0 || self.expiry_seconds > MAX_EXPIRY_SECONDS {
            anyhow::bail!(
                "Cache expiry must be between 1 and {} seconds, got {}",
                MAX_EXPIRY_SECONDS,
                self.expiry_seconds
            );
        }

        if self.cache_driver == CacheDriver::Redis {
            match self.redis_url {
                None => anyhow::bail!("REDIS_URL or REDIS_HOST must be set when CACHE_DRIVER=redis"),
                Some(ref redis_url)
                    if !redis_url.starts_with("redis://") && !redis_url.starts_with("rediss://") =>
                {
                    anyhow::bail!(
                        "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                        mask_connection_string(redis_url)
                    );
                }
                Some(_) => {}
            }
        }

        if self.cache_driver == CacheDriver::Sqlite && self.sqlite_path.is_empty() {
            anyhow::bail!("SQLITE_PATH must not be empty");
        }

        if self.rate_limit.requests_per_second == 0 {
            anyhow::bail!("RATE_LIMIT_REQUESTS_PER_SECOND must be at least 1");
        }
        if self.rate_limit.burst_size == 0 {
            anyhow::bail!("RATE_LIMIT_BURST_SIZE must be at least 1");
        }

        Ok(())
    }

    /// Expiry window as a [`Duration`].
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_seconds)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!(
            "  Object store: bucket={} region={} endpoint={}",
            self.s3.bucket,
            self.s3.region,
            self.s3.endpoint.as_deref().unwrap_or("aws")
        );

        match self.cache_driver {
            CacheDriver::Redis => tracing::info!(
                "  Cache: redis ({})",
                self.redis_url
                    .as_deref()
                    .map(mask_connection_string)
                    .unwrap_or_default()
            ),
            CacheDriver::Sqlite => tracing::info!("  Cache: sqlite ({})", self.sqlite_path),
        }

        tracing::info!("  Link expiry: {}s", self.expiry_seconds);
        tracing::info!(
            "  Rate limit: {}/s, burst {}",
            self.rate_limit.requests_per_second,
            self.rate_limit.burst_size
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:8080".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        app_token: "secret".to_string(),
        s3: S3Config {
            bucket: "media".to_string(),
            region: "us-east-1".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
        },
        cache_driver: CacheDriver::Sqlite,
        redis_url: None,
        sqlite_path: "./cache.db".to_string(),
        expiry_seconds: 3600,
        rate_limit: RateLimitConfig::default(),
    }
}
