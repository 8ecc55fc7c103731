//! Query token authentication middleware.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Authenticates requests using the `token` query parameter.
///
/// # Query Format
///
/// ```text
/// GET /media?token=<token>&path=<path>
/// ```
///
/// Runs before the handler, so a rejected request never builds a cache key,
/// touches the cache, or calls the signer.
///
/// # Errors
///
/// - `401 Unauthorized` if `token` is missing or empty
/// - `403 Forbidden` if `token` does not match `APP_TOKEN`
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/media", get(media_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = Query::<TokenQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.token);

    st.auth_service.authenticate(token.as_deref())?;

    Ok(next.run(req).await)
}
