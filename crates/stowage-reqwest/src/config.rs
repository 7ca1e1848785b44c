//! Storage client configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use stowage_core::Credentials;

/// Configuration for the reqwest HTTP client.
///
/// Both settings are optional; when unset the transport defaults apply
/// (no request timeout, a `stowage/<version>` user agent).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Total request timeout in seconds, including the response body
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT")
    )]
    #[serde(default)]
    pub http_timeout: Option<u64>,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ReqwestConfig {
    /// Returns the request timeout, if one is configured.
    ///
    /// A timeout of zero seconds is treated as unset.
    pub fn timeout(&self) -> Option<Duration> {
        self.http_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .filter(|agent| !agent.is_empty())
            .unwrap_or_else(Self::default_user_agent)
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("stowage/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = Some(timeout_secs);
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Connection settings for a storage server.
///
/// # Environment Variables
///
/// With the `config` feature, every field can be provided on the command line
/// or through the environment:
/// - `STOWAGE_HOST` - Base URL of the storage server
/// - `STOWAGE_ACCESS_KEY` - Value of the `access` header
/// - `STOWAGE_SECRET_KEY` - Value of the `secret` header
/// - `HTTP_TIMEOUT`, `HTTP_USER_AGENT` - See [`ReqwestConfig`]
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Base URL of the storage server (e.g. http://localhost:9000)
    #[cfg_attr(feature = "config", arg(long = "host", env = "STOWAGE_HOST"))]
    pub host: String,

    /// Access key sent in the `access` header
    #[cfg_attr(
        feature = "config",
        arg(long = "access-key", env = "STOWAGE_ACCESS_KEY")
    )]
    pub access_key: String,

    /// Secret key sent in the `secret` header
    #[cfg_attr(
        feature = "config",
        arg(long = "secret-key", env = "STOWAGE_SECRET_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing, default)]
    pub secret_key: String,

    /// HTTP transport settings.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(flatten)]
    pub http: ReqwestConfig,
}

impl StorageConfig {
    /// Creates a configuration with default transport settings.
    pub fn new(
        host: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            http: ReqwestConfig::default(),
        }
    }

    /// Replaces the transport settings.
    #[must_use]
    pub fn with_http(mut self, http: ReqwestConfig) -> Self {
        self.http = http;
        self
    }

    /// Returns the configured credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.access_key.clone(), self.secret_key.clone())
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("host", &self.host)
            .field("access_key", &self.credentials().access_key_masked())
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}
