//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /`              - Landing page (rate limited)
//! - `GET /media`         - Signed redirect (rate limited, token required)
//! - `GET /media/refresh` - Cache invalidation (rate limited, token required)
//! - `GET /health`        - Cache backend health (public)
//!
//! # Middleware
//!
//! Applied outermost first:
//!
//! - **Tracing** - Structured request/response logging, path only
//! - **Rate limiting** - One token bucket for the whole process
//! - **Authentication** - `token` query parameter

use crate::api;
use crate::api::handlers::{health_handler, home_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
///
/// Trailing-slash normalization wraps the whole router and is applied in
/// [`crate::server::run`].
pub fn app_router(state: AppState) -> Router {
    let media_router = api::routes::media_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let limited = Router::new()
        .route("/", get(home_handler))
        .merge(media_router)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    Router::new()
        .merge(limited)
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer())
}
