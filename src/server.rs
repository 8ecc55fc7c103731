//! HTTP server initialization and runtime setup.
//!
//! Handles signer construction, cache backend selection, and the Axum server
//! lifecycle.

use crate::config::{CacheDriver, Config};
use crate::infrastructure::cache::{LinkCache, RedisCache, SqliteCache};
use crate::infrastructure::storage::S3Signer;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - S3 presigning client
/// - Cache backend selected by `CACHE_DRIVER`
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The signer cannot be configured
/// - The cache backend is unreachable
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let signer = S3Signer::new(&config.s3, config.expiry_seconds)
        .context("Failed to configure S3 signer")?;
    tracing::info!("Signer ready for bucket {}", config.s3.bucket);

    let cache = connect_cache(&config).await?;

    let state = AppState::new(
        cache,
        Arc::new(signer),
        &config.app_token,
        config.rate_limit,
    );

    let app = NormalizePathLayer::trim_trailing_slash().layer(app_router(state));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Opens the cache backend named by `CACHE_DRIVER`.
///
/// There is no fallback: a service whose cache is unreachable refuses to
/// start.
pub async fn connect_cache(config: &Config) -> Result<Arc<dyn LinkCache>> {
    let cache: Arc<dyn LinkCache> = match config.cache_driver {
        CacheDriver::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required when CACHE_DRIVER=redis")?;
            Arc::new(
                RedisCache::connect(url, config.expiry_seconds)
                    .await
                    .context("Failed to connect to Redis")?,
            )
        }
        CacheDriver::Sqlite => Arc::new(
            SqliteCache::connect(&config.sqlite_path, config.expiry_seconds)
                .await
                .context("Failed to open SQLite cache")?,
        ),
    };

    tracing::info!("Cache enabled ({})", cache.backend());
    Ok(cache)
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, initiating shutdown..."),
    }
}
