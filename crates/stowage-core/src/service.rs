//! Storage service wrapper with observability.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{ObjectContent, ObjectStat, ObjectStream, Result, StorageProvider, TRACING_TARGET};

/// What [`StorageService::remove_object`] does when the provider fails.
///
/// Every other operation returns its error to the caller. Removal defaults to
/// [`Swallow`](Self::Swallow) for compatibility with existing callers that
/// treat deletion as best-effort; select [`Propagate`](Self::Propagate) to
/// handle removal errors like any other operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RemovalPolicy {
    /// Log the error and report success.
    #[default]
    Swallow,
    /// Return the error to the caller.
    Propagate,
}

/// Storage service wrapper with observability.
///
/// This wrapper adds structured logging to any [`StorageProvider`] and applies
/// the configured [`RemovalPolicy`]. Each call is tagged with a fresh request
/// id. The inner provider is wrapped in `Arc` for cheap cloning.
///
/// # Examples
///
/// ```rust,ignore
/// use stowage_core::{ObjectContent, StorageService};
///
/// let service = StorageService::new(provider);
/// service.create_bucket("photos").await?;
/// service
///     .put_object("photos", "cat.png", ObjectContent::from_file("cat.png").await?)
///     .await?;
/// ```
#[derive(Clone)]
pub struct StorageService {
    inner: Arc<dyn StorageProvider>,
    removal_policy: RemovalPolicy,
}

impl fmt::Debug for StorageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageService")
            .field("removal_policy", &self.removal_policy)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: StorageProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
            removal_policy: RemovalPolicy::default(),
        }
    }

    /// Sets how removal errors are handled.
    #[must_use]
    pub fn with_removal_policy(mut self, removal_policy: RemovalPolicy) -> Self {
        self.removal_policy = removal_policy;
        self
    }

    /// Returns how removal errors are handled.
    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    /// Creates a bucket and returns the server's response body unmodified.
    pub async fn create_bucket(&self, bucket: &str) -> Result<Bytes> {
        self.observe("create_bucket", bucket, None, self.inner.create_bucket(bucket))
            .await
    }

    /// Uploads an object and returns the server's response body.
    pub async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        content: ObjectContent,
    ) -> Result<Bytes> {
        let call = self.inner.put_object(bucket, object, content);
        self.observe("put_object", bucket, Some(object), call).await
    }

    /// Opens a download stream for an object.
    ///
    /// The returned stream is not buffered; the caller drains or drops it.
    pub async fn get_object(&self, bucket: &str, object: &str) -> Result<ObjectStream> {
        let call = self.inner.get_object(bucket, object);
        self.observe("get_object", bucket, Some(object), call).await
    }

    /// Fetches the metadata document of an object.
    pub async fn stat_object(&self, bucket: &str, object: &str) -> Result<ObjectStat> {
        let call = self.inner.stat_object(bucket, object);
        self.observe("stat_object", bucket, Some(object), call).await
    }

    /// Removes an object.
    ///
    /// Under [`RemovalPolicy::Swallow`] (the default) a failed removal is
    /// logged and this method still returns `Ok(())`.
    pub async fn remove_object(&self, bucket: &str, object: &str) -> Result<()> {
        let call = self.inner.remove_object(bucket, object);
        let result = self.observe("remove_object", bucket, Some(object), call).await;

        match result {
            Ok(()) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    bucket,
                    object,
                    "Object removed from storage"
                );
                Ok(())
            }
            Err(error) if self.removal_policy == RemovalPolicy::Swallow => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    bucket,
                    object,
                    error = %error,
                    removal_policy = %self.removal_policy,
                    "Object removal failed, error not returned to caller"
                );
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Runs one provider call, logging its start, outcome and duration.
    async fn observe<T, F>(
        &self,
        operation: &'static str,
        bucket: &str,
        object: Option<&str>,
        call: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let request_id = Uuid::now_v7();
        let object = object.unwrap_or_default();
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request_id,
            operation,
            bucket,
            object,
            "Sending storage request"
        );

        let result = call.await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    request_id = %request_id,
                    operation,
                    bucket,
                    object,
                    elapsed_ms = elapsed.as_millis(),
                    "Storage request completed"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    request_id = %request_id,
                    operation,
                    bucket,
                    object,
                    kind = error.kind_str(),
                    status = ?error.status(),
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Storage request failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::{ErrorKind, MockProvider};

    async fn service_with_bucket(bucket: &str) -> (MockProvider, StorageService) {
        let provider = MockProvider::default();
        let service = StorageService::new(provider.clone());
        service.create_bucket(bucket).await.unwrap();
        (provider, service)
    }

    #[tokio::test]
    async fn test_put_then_get_streams_content() {
        let (_, service) = service_with_bucket("b1").await;

        service
            .put_object("b1", "o1", ObjectContent::from("hello"))
            .await
            .unwrap();

        let stream = service.get_object("b1", "o1").await.unwrap();
        assert_eq!(stream.content_length(), Some(5));
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello");
    }

    #[tokio::test]
    async fn test_stat_missing_object_is_remote_error() {
        let (_, service) = service_with_bucket("b1").await;

        let error = service.stat_object("b1", "missing").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Remote);
        assert_eq!(error.status(), Some(404));
        assert!(error.to_string().contains(r#"{"error":"not found"}"#));
    }

    #[tokio::test]
    async fn test_remove_swallows_errors_by_default() {
        let (_, service) = service_with_bucket("b1").await;
        assert_eq!(service.removal_policy(), RemovalPolicy::Swallow);

        let result = service.remove_object("b1", "missing").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_remove_propagates_errors_when_configured() {
        let (_, service) = service_with_bucket("b1").await;
        let service = service.with_removal_policy(RemovalPolicy::Propagate);

        let error = service.remove_object("b1", "missing").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert_eq!(error.status(), Some(404));
    }

    #[tokio::test]
    async fn test_remove_deletes_object() {
        let (provider, service) = service_with_bucket("b1").await;
        service
            .put_object("b1", "o1", ObjectContent::from("bye"))
            .await
            .unwrap();

        service.remove_object("b1", "o1").await.unwrap();
        assert!(provider.object("b1", "o1").await.is_none());
    }

    #[tokio::test]
    async fn test_other_operations_propagate_errors() {
        let service = StorageService::new(MockProvider::default())
            .with_removal_policy(RemovalPolicy::Swallow);

        let error = service
            .put_object("nope", "o1", ObjectContent::from("x"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);

        let error = service.get_object("nope", "o1").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_removal_policy_strings() {
        assert_eq!(RemovalPolicy::Swallow.to_string(), "swallow");
        assert_eq!(
            "propagate".parse::<RemovalPolicy>().unwrap(),
            RemovalPolicy::Propagate
        );
    }
}
