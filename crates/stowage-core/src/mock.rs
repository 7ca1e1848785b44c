//! In-memory storage provider for testing.
//!
//! [`MockProvider`] keeps buckets and objects in memory and reports failures
//! with the same error kinds an HTTP provider produces, so code written
//! against [`StorageService`] can be exercised without network I/O.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! stowage-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use serde_json::json;
use tokio::sync::Mutex;

use crate::{
    Error, ObjectContent, ObjectStat, ObjectStream, Result, StorageProvider, StorageService,
};

/// Body returned by the mock for a missing object on the stat endpoint.
const NOT_FOUND_BODY: &str = r#"{"error":"not found"}"#;

type Bucket = BTreeMap<String, Bytes>;

/// In-memory storage provider.
///
/// Clones share the same underlying store.
#[derive(Clone, Debug, Default)]
pub struct MockProvider {
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
}

impl MockProvider {
    /// Creates an empty mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts this provider into a [`StorageService`].
    pub fn into_service(self) -> StorageService {
        StorageService::new(self)
    }

    /// Returns the stored bytes of an object, if present.
    pub async fn object(&self, bucket: &str, object: &str) -> Option<Bytes> {
        let buckets = self.buckets.lock().await;
        buckets.get(bucket)?.get(object).cloned()
    }

    /// Returns whether a bucket exists.
    pub async fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.lock().await.contains_key(bucket)
    }

    fn not_found(what: &str) -> Error {
        Error::transport()
            .with_status(404)
            .with_message(format!("{what} not found"))
    }
}

#[async_trait::async_trait]
impl StorageProvider for MockProvider {
    async fn create_bucket(&self, bucket: &str) -> Result<Bytes> {
        let mut buckets = self.buckets.lock().await;
        buckets.entry(bucket.to_owned()).or_default();
        drop(buckets);

        let body = serde_json::to_vec(&json!({ "bucket": bucket }))?;
        Ok(Bytes::from(body))
    }

    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        content: ObjectContent,
    ) -> Result<Bytes> {
        let data = content.collect_bytes().await?;
        let size = data.len();

        let mut buckets = self.buckets.lock().await;
        let entries = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::not_found("bucket"))?;
        entries.insert(object.to_owned(), data);

        let body = serde_json::to_vec(&json!({
            "bucket": bucket,
            "object": object,
            "size": size,
        }))?;
        Ok(Bytes::from(body))
    }

    async fn get_object(&self, bucket: &str, object: &str) -> Result<ObjectStream> {
        let data = self
            .object(bucket, object)
            .await
            .ok_or_else(|| Self::not_found("object"))?;
        let length = data.len() as u64;

        Ok(ObjectStream::new(stream::once(async move { Ok(data) }))
            .with_content_length(Some(length))
            .with_content_type(Some("application/octet-stream".to_owned())))
    }

    async fn stat_object(&self, bucket: &str, object: &str) -> Result<ObjectStat> {
        let Some(data) = self.object(bucket, object).await else {
            return Err(Error::remote().with_status(404).with_message(NOT_FOUND_BODY));
        };

        Ok(ObjectStat::new(json!({
            "size": data.len(),
            "contentType": "application/octet-stream",
        })))
    }

    async fn remove_object(&self, bucket: &str, object: &str) -> Result<()> {
        let mut buckets = self.buckets.lock().await;
        buckets
            .get_mut(bucket)
            .and_then(|entries| entries.remove(object))
            .map(|_| ())
            .ok_or_else(|| Self::not_found("object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_create_bucket_is_idempotent() {
        let provider = MockProvider::new();
        let body = provider.create_bucket("b1").await.unwrap();
        assert_eq!(body.as_ref(), br#"{"bucket":"b1"}"#);

        provider.create_bucket("b1").await.unwrap();
        assert!(provider.has_bucket("b1").await);
    }

    #[tokio::test]
    async fn test_put_into_missing_bucket() {
        let provider = MockProvider::new();
        let error = provider
            .put_object("b1", "o1", ObjectContent::from("data"))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Transport);
        assert_eq!(error.status(), Some(404));
    }

    #[tokio::test]
    async fn test_stat_reports_size() {
        let provider = MockProvider::new();
        provider.create_bucket("b1").await.unwrap();
        provider
            .put_object("b1", "o1", ObjectContent::from("twelve bytes"))
            .await
            .unwrap();

        let stat = provider.stat_object("b1", "o1").await.unwrap();
        assert_eq!(stat.size(), Some(12));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let provider = MockProvider::new();
        let clone = provider.clone();
        clone.create_bucket("shared").await.unwrap();
        assert!(provider.has_bucket("shared").await);
    }
}
