#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod credentials;
mod error;
mod service;
mod types;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;

use bytes::Bytes;

pub use crate::credentials::{ACCESS_HEADER, Credentials, SECRET_HEADER};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::mock::MockProvider;
pub use crate::service::{RemovalPolicy, StorageService};
pub use crate::types::{ByteStream, ObjectContent, ObjectStat, ObjectStream};

/// Tracing target for storage service operations.
pub const TRACING_TARGET: &str = "stowage_core::service";

/// Core trait for object storage operations.
///
/// Each method maps to exactly one request against the storage server and
/// returns its outcome unchanged. Implement this trait to plug in a transport;
/// wrap the implementation in a [`StorageService`] to get logging and the
/// removal policy.
#[async_trait::async_trait]
pub trait StorageProvider: Send + Sync {
    /// Creates a bucket and returns the response body.
    async fn create_bucket(&self, bucket: &str) -> Result<Bytes>;

    /// Uploads an object as the `file` field of a multipart form.
    async fn put_object(&self, bucket: &str, object: &str, content: ObjectContent)
    -> Result<Bytes>;

    /// Opens a streaming download of an object.
    async fn get_object(&self, bucket: &str, object: &str) -> Result<ObjectStream>;

    /// Fetches the metadata document of an object.
    async fn stat_object(&self, bucket: &str, object: &str) -> Result<ObjectStat>;

    /// Deletes an object.
    async fn remove_object(&self, bucket: &str, object: &str) -> Result<()>;
}
