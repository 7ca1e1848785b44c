//! Error types for the reqwest-based storage client.

use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed or the server answered with a non-2xx status.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl From<Error> for stowage_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                let error = stowage_core::Error::transport().with_message(e.to_string());
                let error = match e.status() {
                    Some(status) => error.with_status(status.as_u16()),
                    None => error,
                };
                error.with_source(e)
            }
        }
    }
}
