//! Base URL handling and request path construction.

use stowage_core::{Error, Result};
use url::Url;

/// Storage server base URL.
///
/// Keeps the host exactly as given next to its parsed form, so callers can
/// read back what they configured while requests are built from the parsed URL.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    host: String,
    base: Url,
}

impl Endpoint {
    /// Parses and validates a host URL.
    ///
    /// The host must be an absolute `http` or `https` URL. A path prefix is
    /// allowed and kept in front of every request path.
    pub fn parse(host: &str) -> Result<Self> {
        if host.is_empty() {
            return Err(Error::invalid_argument().with_message("host must be a non-empty string"));
        }

        let base = Url::parse(host).map_err(|e| {
            Error::invalid_argument()
                .with_message(format!("host is not a valid URL: {e}"))
                .with_source(e)
        })?;

        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_argument()
                .with_message(format!("host must be an http(s) URL, got '{host}'")));
        }

        Ok(Self {
            host: host.to_owned(),
            base,
        })
    }

    /// Returns the host exactly as it was configured.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Builds a request URL by appending one path segment per element.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?`, `#` and `%`
    /// inside a bucket or object name never change the request path structure.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot-be-a-base URLs are rejected in `parse`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
