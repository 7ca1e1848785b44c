#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod endpoint;
mod error;
mod provider;

#[cfg(test)]
mod testing;

pub use crate::client::StorageClient;
pub use crate::config::{ReqwestConfig, StorageConfig};
pub use crate::error::{Error, Result};

/// Tracing target for storage client operations.
pub const TRACING_TARGET: &str = "stowage_reqwest::client";
