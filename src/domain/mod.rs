//! Core domain types.
//!
//! - [`MediaPath`] - a validated object path and its cache key

pub mod media_path;

pub use media_path::{CACHE_KEY_PREFIX, MediaPath};
