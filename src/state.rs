//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::api::middleware::rate_limit::RateLimiter;
use crate::application::services::{AuthService, LinkResolver};
use crate::config::RateLimitConfig;
use crate::infrastructure::cache::LinkCache;
use crate::infrastructure::storage::UrlSigner;

/// Handles built once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<LinkResolver>,
    pub auth_service: Arc<AuthService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cache: Arc<dyn LinkCache>,
}

impl AppState {
    /// Wires the resolver, auth service and rate limiter around a cache
    /// backend and a signer.
    pub fn new(
        cache: Arc<dyn LinkCache>,
        signer: Arc<dyn UrlSigner>,
        app_token: &str,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            resolver: Arc::new(LinkResolver::new(cache.clone(), signer)),
            auth_service: Arc::new(AuthService::new(app_token)),
            rate_limiter: Arc::new(RateLimiter::new(rate_limit)),
            cache,
        }
    }
}
