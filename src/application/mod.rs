//! Application layer services implementing business logic.
//!
//! Services coordinate the infrastructure traits and enforce the request
//! rules. The HTTP handlers and middleware call into them; the admin CLI
//! works on the cache and signer directly.
//!
//! # Available Services
//!
//! - [`services::link_resolver::LinkResolver`] - Cache-or-sign link issuance
//! - [`services::auth_service::AuthService`] - Shared token authentication

pub mod services;
