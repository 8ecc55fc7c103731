//! Landing page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

/// Template for the landing page.
///
/// Renders `templates/home.html` with a short description of the media
/// endpoints.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
struct HomeTemplate {
    version: &'static str,
}

/// Renders the landing page.
///
/// # Endpoint
///
/// `GET /`
pub async fn home_handler() -> impl IntoResponse {
    HomeTemplate {
        version: env!("CARGO_PKG_VERSION"),
    }
}
