//! API route configuration.
//!
//! Every media endpoint requires the `token` query parameter, checked by
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{media_handler, refresh_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Media routes, protected by query token authentication.
///
/// # Endpoints
///
/// - `GET /media`         - Redirect to a signed URL (cached or fresh)
/// - `GET /media/refresh` - Drop the cached link for a path
pub fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/media", get(media_handler))
        .route("/media/refresh", get(refresh_handler))
}
