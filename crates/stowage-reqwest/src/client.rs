//! Reqwest-based HTTP client for the storage server.

use bytes::Bytes;
use stowage_core::{
    Credentials, ObjectContent, ObjectStat, ObjectStream, RemovalPolicy, StorageService,
};

use crate::provider::HttpProvider;
use crate::{ReqwestConfig, StorageConfig};

/// HTTP client for an object storage server.
///
/// Every request carries the `access` and `secret` headers taken from the
/// credentials given at construction. Bucket and object names are sent as
/// single percent-encoded path segments below the host URL:
///
/// | Operation       | Request                         |
/// |-----------------|---------------------------------|
/// | `create_bucket` | `PUT {host}/{bucket}`           |
/// | `put_object`    | `PUT {host}/{bucket}/{object}`  |
/// | `get_object`    | `GET {host}/{bucket}/{object}`  |
/// | `stat_object`   | `GET {host}/{bucket}/{object}/stat` |
/// | `remove_object` | `DELETE {host}/{bucket}/{object}` |
///
/// Calls go through a [`StorageService`], so each one is logged and
/// `remove_object` follows the client's [`RemovalPolicy`]. The client is
/// cheap to clone and safe to share between tasks.
///
/// # Examples
///
/// ```rust,ignore
/// use stowage_reqwest::StorageClient;
///
/// let client = StorageClient::new("http://localhost:9000", "access", "secret")?;
///
/// client.create_bucket("b1").await?;
/// client.put_object("b1", "o1", "hello".into()).await?;
/// let bytes = client.get_object("b1", "o1").await?.collect_bytes().await?;
/// ```
#[derive(Clone)]
pub struct StorageClient {
    provider: HttpProvider,
    service: StorageService,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("host", &self.provider.host())
            .field("credentials", self.provider.credentials())
            .field("config", self.provider.config())
            .field("removal_policy", &self.service.removal_policy())
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    /// Creates a client with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_argument` error when the host is empty or not an
    /// `http(s)` URL, or when either key is empty or not a valid header value.
    pub fn new(
        host: impl AsRef<str>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> stowage_core::Result<Self> {
        Self::with_config(
            host,
            Credentials::new(access_key, secret_key),
            ReqwestConfig::default(),
        )
    }

    /// Creates a client from a [`StorageConfig`].
    pub fn from_config(config: &StorageConfig) -> stowage_core::Result<Self> {
        Self::with_config(&config.host, config.credentials(), config.http.clone())
    }

    /// Creates a client with explicit credentials and transport settings.
    pub fn with_config(
        host: impl AsRef<str>,
        credentials: Credentials,
        config: ReqwestConfig,
    ) -> stowage_core::Result<Self> {
        let provider = HttpProvider::new(host.as_ref(), credentials, config)?;
        let service = StorageService::new(provider.clone());
        Ok(Self { provider, service })
    }

    /// Sets how removal errors are handled.
    #[must_use]
    pub fn with_removal_policy(mut self, removal_policy: RemovalPolicy) -> Self {
        self.service = self.service.with_removal_policy(removal_policy);
        self
    }

    /// Returns how removal errors are handled.
    pub fn removal_policy(&self) -> RemovalPolicy {
        self.service.removal_policy()
    }

    /// Returns the host exactly as it was configured.
    pub fn host(&self) -> &str {
        self.provider.host()
    }

    /// Returns the credentials sent with every request.
    pub fn credentials(&self) -> &Credentials {
        self.provider.credentials()
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        self.provider.config()
    }

    /// Converts this client into a [`StorageService`] for use with dependency injection.
    ///
    /// The service keeps the client's removal policy.
    pub fn into_service(self) -> StorageService {
        self.service
    }

    /// Creates a bucket and returns the server's response body unmodified.
    pub async fn create_bucket(&self, bucket: &str) -> stowage_core::Result<Bytes> {
        self.service.create_bucket(bucket).await
    }

    /// Uploads an object as the `file` field of a multipart form and returns
    /// the server's response body.
    pub async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        content: ObjectContent,
    ) -> stowage_core::Result<Bytes> {
        self.service.put_object(bucket, object, content).await
    }

    /// Opens a streaming download of an object.
    pub async fn get_object(&self, bucket: &str, object: &str) -> stowage_core::Result<ObjectStream> {
        self.service.get_object(bucket, object).await
    }

    /// Fetches the metadata document of an object.
    ///
    /// A non-2xx response fails with a `remote` error whose message is the
    /// response body as JSON text.
    pub async fn stat_object(&self, bucket: &str, object: &str) -> stowage_core::Result<ObjectStat> {
        self.service.stat_object(bucket, object).await
    }

    /// Removes an object.
    ///
    /// Under [`RemovalPolicy::Swallow`] (the default) a failed removal is
    /// logged and this method still returns `Ok(())`.
    pub async fn remove_object(&self, bucket: &str, object: &str) -> stowage_core::Result<()> {
        self.service.remove_object(bucket, object).await
    }
}
