//! Infrastructure layer: cache backends and object storage.
//!
//! - [`cache`] - Redis and SQLite implementations of the link cache
//! - [`storage`] - Presigned URL generation for S3-compatible stores

pub mod cache;
pub mod storage;
