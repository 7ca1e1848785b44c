//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── storage: StorageConfig          # Host, credentials, HTTP transport
//! ├── propagate_remove_errors: bool   # Removal policy
//! └── command: Command                # Operation to run
//! ```
//!
//! All connection settings can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! stowage --host http://localhost:9000 --access-key a --secret-key s stat b1 o1
//!
//! # Or via environment variables
//! STOWAGE_HOST=http://localhost:9000 STOWAGE_ACCESS_KEY=a STOWAGE_SECRET_KEY=s \
//!     stowage stat b1 o1
//! ```

use std::process;

use clap::Parser;
use stowage_core::{RemovalPolicy, StorageService};
use stowage_reqwest::{StorageClient, StorageConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "stowage")]
#[command(about = "Command-line client for stowage object storage")]
#[command(version)]
pub struct Cli {
    /// Storage server connection configuration.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Exit with an error when removing an object fails instead of only logging it
    #[arg(long)]
    pub propagate_remove_errors: bool,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its variables
    /// act as defaults for the `env` fallbacks.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Output goes to stderr; stdout is reserved for command output.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Returns the removal policy selected on the command line.
    pub fn removal_policy(&self) -> RemovalPolicy {
        if self.propagate_remove_errors {
            RemovalPolicy::Propagate
        } else {
            RemovalPolicy::Swallow
        }
    }

    /// Creates the storage service described by this configuration.
    pub fn create_service(&self) -> stowage_core::Result<StorageService> {
        let service = StorageClient::from_config(&self.storage)?
            .with_removal_policy(self.removal_policy())
            .into_service();
        Ok(service)
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            host = %self.storage.host,
            access_key = %self.storage.credentials().access_key_masked(),
            http_timeout_secs = ?self.storage.http.http_timeout,
            user_agent = %self.storage.http.effective_user_agent(),
            removal_policy = %self.removal_policy(),
            command = self.command.name(),
            "Storage configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;

    use super::*;

    const CONNECTION: [&str; 7] = [
        "stowage",
        "--host",
        "http://localhost:9000",
        "--access-key",
        "AKIATEST12345",
        "--secret-key",
        "hunter2",
    ];

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(CONNECTION.iter().chain(args)).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_connection() {
        let cli = parse(&["--http-timeout", "30", "stat", "b1", "o1"]);

        assert_eq!(cli.storage.host, "http://localhost:9000");
        assert_eq!(cli.storage.access_key, "AKIATEST12345");
        assert_eq!(cli.storage.secret_key, "hunter2");
        assert_eq!(cli.storage.http.http_timeout, Some(30));
        assert_eq!(cli.removal_policy(), RemovalPolicy::Swallow);
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = parse(&["create-bucket", "b1"]);
        assert!(matches!(cli.command, Command::CreateBucket { bucket } if bucket == "b1"));

        let cli = parse(&["put", "b1", "o1", "-"]);
        assert!(
            matches!(cli.command, Command::Put { input, .. } if input == PathBuf::from("-"))
        );

        let cli = parse(&["get", "b1", "o1", "--output", "out.bin"]);
        assert!(matches!(
            cli.command,
            Command::Get { output: Some(path), .. } if path == PathBuf::from("out.bin")
        ));

        let cli = parse(&["--propagate-remove-errors", "rm", "b1", "o1"]);
        assert!(matches!(cli.command, Command::Remove { .. }));
        assert_eq!(cli.removal_policy(), RemovalPolicy::Propagate);
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(CONNECTION).is_err());
    }

    #[test]
    fn test_create_service_rejects_bad_host() {
        let mut cli = parse(&["stat", "b1", "o1"]);
        cli.storage.host = "localhost:9000".to_owned();

        let err = cli.create_service().unwrap_err();
        assert_eq!(err.kind(), stowage_core::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_debug_hides_secret() {
        let cli = parse(&["stat", "b1", "o1"]);
        assert!(!format!("{cli:?}").contains("hunter2"));
    }
}
