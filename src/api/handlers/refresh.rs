//! Handler for explicit cache invalidation.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::api::dto::media::{MessageResponse, RefreshQuery};
use crate::domain::MediaPath;
use crate::error::AppError;
use crate::state::AppState;

/// Drops the cached link for an object. No new link is signed.
///
/// # Endpoint
///
/// `GET /media/refresh?token=<token>&path=<path>`
///
/// # Response
///
/// ```json
/// { "message": "Cache cleared successfully" }
/// ```
///
/// Clearing a path that has no cached link also succeeds.
///
/// # Errors
///
/// Returns 400 Bad Request if `path` is missing, empty, or a bare `/`, or if
/// the query string cannot be parsed.
/// Returns 500 Internal Server Error if the cache backend fails.
pub async fn refresh_handler(
    State(state): State<AppState>,
    query: Result<Query<RefreshQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let path = MediaPath::parse(query.path.as_deref().unwrap_or_default())?;

    state.resolver.invalidate(&path).await?;

    Ok(Json(MessageResponse {
        message: "Cache cleared successfully".to_string(),
    }))
}
