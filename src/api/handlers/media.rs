//! Handler for signed media redirects.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::debug;

use crate::api::dto::media::MediaQuery;
use crate::application::services::Resolution;
use crate::domain::MediaPath;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects to a signed download URL for an object.
///
/// # Endpoint
///
/// `GET /media?token=<token>&path=<path>&fresh=<0|1>`
///
/// # Request Flow
///
/// 1. Validate `path`
/// 2. With `fresh=1`, drop the cached link
/// 3. Serve the cached link, or sign and cache a new one
/// 4. Return 302 Found
///
/// # Errors
///
/// Returns 400 Bad Request if `path` is missing, empty, or a bare `/`, or if
/// the query string cannot be parsed.
/// Returns 500 Internal Server Error if the cache or the signer fails.
/// A failed cache write after signing does not fail the request.
pub async fn media_handler(
    State(state): State<AppState>,
    query: Result<Query<MediaQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let path = MediaPath::parse(query.path.as_deref().unwrap_or_default())?;

    let resolution = state.resolver.resolve(&path, query.is_fresh()).await?;
    let source = match resolution {
        Resolution::Cached(_) => "cache",
        Resolution::Signed(_) => "signer",
    };
    debug!("Resolved {} from {}", path.as_str(), source);

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, resolution.into_url())],
    ))
}
