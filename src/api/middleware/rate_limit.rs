//! Process-wide rate limiting using a token bucket.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use tracing::debug;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

/// One token bucket shared by every request, regardless of client.
///
/// Refills `requests_per_second` tokens per second up to `burst_size`.
/// The bucket is lock-free; [`RateLimiter::allow`] is safe to call from any
/// number of handlers at once.
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
}

impl RateLimiter {
    /// Creates a limiter. Zero values are raised to one.
    pub fn new(config: RateLimitConfig) -> Self {
        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);

        Self {
            inner: DefaultDirectRateLimiter::direct(Quota::per_second(rate).allow_burst(burst)),
        }
    }

    /// Takes one token; `false` when the bucket is empty.
    pub fn allow(&self) -> bool {
        self.inner.check().is_ok()
    }
}

/// Rejects requests once the shared bucket is exhausted.
///
/// Applied outside authentication so that admission is decided before any
/// other processing.
///
/// # Errors
///
/// Returns `429 Too Many Requests` when no token is available.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/media", get(media_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !st.rate_limiter.allow() {
        debug!("Rate limit exceeded for {}", req.uri().path());
        return Err(AppError::rate_limited(
            "Too many requests, please try again later.",
            serde_json::json!({}),
        ));
    }

    Ok(next.run(req).await)
}
