//! Raw HTTP calls against the storage server.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response};
use serde_json::Value;
use stowage_core::{
    ACCESS_HEADER, Credentials, ObjectContent, ObjectStat, ObjectStream, SECRET_HEADER,
    StorageProvider,
};
use url::Url;

use crate::endpoint::Endpoint;
use crate::{Error, ReqwestConfig, TRACING_TARGET};

/// Multipart field that carries uploaded object data.
const UPLOAD_FIELD: &str = "file";

/// Inner provider state that holds the HTTP client and connection settings.
struct HttpProviderInner {
    http: Client,
    endpoint: Endpoint,
    credentials: Credentials,
    config: ReqwestConfig,
}

/// [`StorageProvider`] that issues one HTTP request per operation.
///
/// Errors are returned as received; logging and the removal policy are
/// applied by the `StorageService` wrapping it.
#[derive(Clone)]
pub(crate) struct HttpProvider {
    inner: Arc<HttpProviderInner>,
}

impl HttpProvider {
    /// Validates the connection settings and builds the HTTP client.
    pub fn new(host: &str, credentials: Credentials, config: ReqwestConfig) -> stowage_core::Result<Self> {
        let endpoint = Endpoint::parse(host)?;
        credentials.validate()?;
        let headers = auth_headers(&credentials)?;

        tracing::debug!(
            target: TRACING_TARGET,
            host = endpoint.host(),
            access_key = %credentials.access_key_masked(),
            timeout_secs = config.timeout().map(|t| t.as_secs()),
            "Creating storage client"
        );

        let mut builder = Client::builder()
            .user_agent(config.effective_user_agent())
            .default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| {
            stowage_core::Error::transport()
                .with_message("failed to build HTTP client")
                .with_source(e)
        })?;

        let inner = HttpProviderInner {
            http,
            endpoint,
            credentials,
            config,
        };

        tracing::info!(
            target: TRACING_TARGET,
            host = inner.endpoint.host(),
            "Storage client created successfully"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn host(&self) -> &str {
        self.inner.endpoint.host()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    fn http(&self) -> &Client {
        &self.inner.http
    }

    fn url(&self, segments: &[&str]) -> Url {
        self.inner.endpoint.url(segments)
    }

    /// Sends a request and fails on transport errors and non-2xx statuses.
    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            url = %response.url(),
            status = response.status().as_u16(),
            "Storage server responded"
        );

        Ok(response.error_for_status()?)
    }
}

#[async_trait::async_trait]
impl StorageProvider for HttpProvider {
    async fn create_bucket(&self, bucket: &str) -> stowage_core::Result<Bytes> {
        let url = self.url(&[bucket]);
        tracing::debug!(target: TRACING_TARGET, method = "PUT", %url, "Creating bucket");

        let response = self.send(self.http().put(url)).await?;
        let body = response.bytes().await.map_err(Error::from)?;
        Ok(body)
    }

    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        content: ObjectContent,
    ) -> stowage_core::Result<Bytes> {
        let url = self.url(&[bucket, object]);
        let length = content.length();
        tracing::debug!(
            target: TRACING_TARGET,
            method = "PUT",
            %url,
            content_length = length,
            "Uploading object"
        );

        let body = Body::wrap_stream(content.into_stream());
        let part = match length {
            Some(length) => Part::stream_with_length(body, length),
            None => Part::stream(body),
        };
        let part = part
            .file_name(object.to_owned())
            .mime_str("application/octet-stream")
            .map_err(Error::from)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.send(self.http().put(url).multipart(form)).await?;
        let body = response.bytes().await.map_err(Error::from)?;
        Ok(body)
    }

    async fn get_object(&self, bucket: &str, object: &str) -> stowage_core::Result<ObjectStream> {
        let url = self.url(&[bucket, object]);
        tracing::debug!(target: TRACING_TARGET, method = "GET", %url, "Downloading object");

        let response = self.send(self.http().get(url)).await?;
        let content_length = response.content_length();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(ObjectStream::new(stream)
            .with_content_length(content_length)
            .with_content_type(content_type))
    }

    async fn stat_object(&self, bucket: &str, object: &str) -> stowage_core::Result<ObjectStat> {
        let url = self.url(&[bucket, object, "stat"]);
        tracing::debug!(target: TRACING_TARGET, method = "GET", %url, "Fetching object stat");

        let response = self.http().get(url).send().await.map_err(Error::from)?;
        let status = response.status();
        let body = response.bytes().await.map_err(Error::from)?;

        if !status.is_success() {
            return Err(stowage_core::Error::remote()
                .with_message(parse_body(&body).to_string())
                .with_status(status.as_u16()));
        }

        Ok(ObjectStat::new(parse_body(&body)))
    }

    async fn remove_object(&self, bucket: &str, object: &str) -> stowage_core::Result<()> {
        let url = self.url(&[bucket, object]);
        tracing::debug!(target: TRACING_TARGET, method = "DELETE", %url, "Removing object");

        self.send(self.http().delete(url)).await?;
        Ok(())
    }
}

/// Builds the authentication headers sent with every request.
fn auth_headers(credentials: &Credentials) -> stowage_core::Result<HeaderMap> {
    let invalid = |name: &str, e: reqwest::header::InvalidHeaderValue| {
        stowage_core::Error::invalid_argument()
            .with_message(format!("{name} key is not a valid header value"))
            .with_source(e)
    };

    let access = HeaderValue::from_str(credentials.access_key()).map_err(|e| invalid("access", e))?;
    let mut secret =
        HeaderValue::from_str(credentials.secret_key()).map_err(|e| invalid("secret", e))?;
    secret.set_sensitive(true);

    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(HeaderName::from_static(ACCESS_HEADER), access);
    headers.insert(HeaderName::from_static(SECRET_HEADER), secret);
    Ok(headers)
}

/// Reads a response body as JSON, keeping non-JSON text as a JSON string.
///
/// Object keys keep the order the server sent them in.
fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
