//! Subcommands and their execution.

mod transfer;

use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use stowage_core::StorageService;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::TRACING_TARGET_COMMAND;

/// Storage operation to run.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a bucket and print the server's response
    CreateBucket {
        /// Bucket name
        bucket: String,
    },

    /// Upload a file as an object and print the server's response
    Put {
        /// Bucket name
        bucket: String,
        /// Object name
        object: String,
        /// File to upload, or `-` to read from stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Download an object
    Get {
        /// Bucket name
        bucket: String,
        /// Object name
        object: String,
        /// Write the object to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the metadata of an object as JSON
    Stat {
        /// Bucket name
        bucket: String,
        /// Object name
        object: String,
    },

    /// Remove an object
    #[command(name = "rm")]
    Remove {
        /// Bucket name
        bucket: String,
        /// Object name
        object: String,
    },
}

impl Command {
    /// Returns the subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateBucket { .. } => "create-bucket",
            Self::Put { .. } => "put",
            Self::Get { .. } => "get",
            Self::Stat { .. } => "stat",
            Self::Remove { .. } => "rm",
        }
    }

    /// Runs the command, writing its output to `stdout`.
    pub async fn execute<W>(self, storage: &StorageService, stdout: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match self {
            Self::CreateBucket { bucket } => {
                let body = storage
                    .create_bucket(&bucket)
                    .await
                    .with_context(|| format!("failed to create bucket '{bucket}'"))?;
                transfer::write_body(stdout, &body).await?;
            }
            Self::Put {
                bucket,
                object,
                input,
            } => {
                let content = transfer::open_input(&input).await?;
                let body = storage
                    .put_object(&bucket, &object, content)
                    .await
                    .with_context(|| format!("failed to upload '{bucket}/{object}'"))?;
                transfer::write_body(stdout, &body).await?;
            }
            Self::Get {
                bucket,
                object,
                output,
            } => {
                let stream = storage
                    .get_object(&bucket, &object)
                    .await
                    .with_context(|| format!("failed to download '{bucket}/{object}'"))?;

                let written = match &output {
                    Some(path) => transfer::write_to_file(stream, path).await?,
                    None => transfer::copy_stream(stream, stdout)
                        .await
                        .context("failed to write object to stdout")?,
                };

                tracing::info!(
                    target: TRACING_TARGET_COMMAND,
                    bucket = %bucket,
                    object = %object,
                    bytes = written,
                    output = ?output,
                    "Object downloaded"
                );
            }
            Self::Stat { bucket, object } => {
                let stat = storage
                    .stat_object(&bucket, &object)
                    .await
                    .with_context(|| format!("failed to stat '{bucket}/{object}'"))?;

                let mut json = serde_json::to_vec_pretty(stat.as_value())?;
                json.push(b'\n');
                stdout.write_all(&json).await?;
            }
            Self::Remove { bucket, object } => {
                storage
                    .remove_object(&bucket, &object)
                    .await
                    .with_context(|| format!("failed to remove '{bucket}/{object}'"))?;
            }
        }

        stdout.flush().await?;
        Ok(())
    }
}
