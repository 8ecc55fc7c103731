//! HTTP middleware for request processing and protection.
//!
//! Provides rate limiting, token authentication, and request tracing.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
