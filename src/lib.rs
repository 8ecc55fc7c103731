//! # Media Resolver
//!
//! Issues time-limited signed download links for objects in S3-compatible
//! storage, caching each link so repeated requests do not re-sign.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Object paths and cache keys
//! - **Application Layer** ([`application`]) - Link resolution and token authentication
//! - **Infrastructure Layer** ([`infrastructure`]) - Cache backends and the S3 signer
//! - **API Layer** ([`api`]) - HTTP handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Redis or SQLite link cache, selected at startup
//! - Forced refresh and explicit invalidation per path
//! - Shared token authentication
//! - Process-wide token bucket rate limiting
//!
//! ## Quick Start
//!
//! ```bash
//! export APP_TOKEN="secret"
//! export S3_BUCKET="media"
//! export AWS_ACCESS_KEY="..."
//! export AWS_SECRET_KEY="..."
//! export CACHE_DRIVER="sqlite"
//!
//! cargo run
//! curl -i "http://localhost:8080/media?token=secret&path=images/a.jpg"
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AuthService, LinkResolver, Resolution};
    pub use crate::domain::MediaPath;
    pub use crate::error::AppError;
    pub use crate::infrastructure::cache::{CacheError, CacheResult, LinkCache};
    pub use crate::infrastructure::storage::{SignerError, UrlSigner};
    pub use crate::state::AppState;
}
