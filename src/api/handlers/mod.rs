//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod home;
pub mod media;
pub mod refresh;

pub use health::health_handler;
pub use home::home_handler;
pub use media::media_handler;
pub use refresh::refresh_handler;
