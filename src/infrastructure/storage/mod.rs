//! Presigned URL generation for the object store.
//!
//! [`UrlSigner`] is the seam the resolver depends on; [`S3Signer`] is the
//! S3-compatible implementation (AWS S3, MinIO, Cloudflare R2, ...).

mod s3_signer;

pub use s3_signer::S3Signer;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while building or using a signer.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Object storage configuration error: {0}")]
    Configuration(String),
    #[error("Failed to presign object '{key}': {reason}")]
    Presign { key: String, reason: String },
}

/// Produces time-limited download URLs for stored objects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Signs a GET for the object at `path`.
    ///
    /// A single leading `/` is stripped before the path is used as the
    /// object key. The URL is valid for exactly the configured window.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::Presign`] on any signing failure, including an
    /// empty object key. Nothing is retried.
    async fn sign(&self, path: &str) -> Result<String, SignerError>;
}

/// Turns a request path into an object key.
pub fn object_key(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
