//! S3-compatible URL signer.

use super::{SignerError, UrlSigner, object_key};
use crate::config::S3Config;
use async_trait::async_trait;
use s3::{Bucket, Region, creds::Credentials};
use tracing::{debug, error};

/// Presigns GET requests against one bucket.
///
/// Signing is local SigV4 computation; no request reaches the object store
/// until the client follows the URL.
pub struct S3Signer {
    bucket: Box<Bucket>,
    expiry_secs: u32,
}

impl S3Signer {
    /// Builds a signer for the configured bucket.
    ///
    /// With a custom endpoint the region is used only as the signing region.
    /// Without one, the region selects the AWS endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::Configuration`] if the region, credentials or
    /// expiry window are rejected.
    pub fn new(config: &S3Config, expiry_seconds: u64) -> Result<Self, SignerError> {
        let region = match config.endpoint {
            Some(ref endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| SignerError::Configuration(format!("invalid region: {}", e)))?,
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| SignerError::Configuration(format!("invalid credentials: {}", e)))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| SignerError::Configuration(format!("invalid bucket: {}", e)))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        let expiry_secs = u32::try_from(expiry_seconds).map_err(|_| {
            SignerError::Configuration(format!("expiry too large: {}s", expiry_seconds))
        })?;

        Ok(Self {
            bucket,
            expiry_secs,
        })
    }
}

#[async_trait]
impl UrlSigner for S3Signer {
    async fn sign(&self, path: &str) -> Result<String, SignerError> {
        let key = object_key(path);
        if key.is_empty() {
            return Err(SignerError::Presign {
                key: path.to_string(),
                reason: "empty object key".to_string(),
            });
        }

        let url = self
            .bucket
            .presign_get(key, self.expiry_secs, None)
            .await
            .map_err(|e| {
                error!("Presign failed for {}: {}", key, e);
                SignerError::Presign {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
            })?;

        debug!("Signed {} for {}s", key, self.expiry_secs);
        Ok(url)
    }
}
