//! Collision-safe file management over the local filesystem and S3.
//!
//! Paths are plain strings: `s3://bucket/key` for object storage, anything
//! without a scheme for local disk. Writes and folder creations never
//! overwrite; a taken name gets a numeric suffix (`file.txt`,
//! `file 2.txt`, ...) chosen by [`resolver::NameResolver`].

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod codecs;
pub mod commands;
pub mod config;
pub mod error;
pub mod manager;
pub mod path;
pub mod ports;
pub mod registry;
pub mod resolver;
pub mod storage;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use error::{Check, StorageError};
pub use manager::FileManager;
pub use path::{EntryKind, PathKey};

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    init_logging(&cli.log_level);
    commands::dispatch(&cli.command)
}

/// Installs a stderr subscriber; `RUST_LOG` wins over `level`. A no-op if
/// a subscriber is already set.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
