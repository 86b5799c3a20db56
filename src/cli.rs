//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `fileman`.
#[derive(Debug, Parser)]
#[command(name = "fileman", version, about = "Collision-safe file operations on local disk and S3")]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "FILEMAN_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a file under a collision-free name and print the name used.
    Write {
        /// Destination path (`s3://bucket/key` or a local path).
        path: String,
        /// Read content from this local file instead of stdin.
        #[arg(long)]
        from: Option<PathBuf>,
        /// Write into a new copy of the parent folder instead of reusing it,
        /// and print the full path written.
        #[arg(long)]
        new_folder: bool,
    },
    /// Create a folder and any missing parents.
    Mkdir {
        /// Folder path.
        path: String,
    },
    /// List one directory level as JSON.
    Ls {
        /// Directory path.
        path: String,
    },
    /// Exit 0 if the path exists, 1 otherwise.
    Exists {
        /// Path to probe.
        path: String,
    },
    /// Delete files or folder trees.
    Rm {
        /// Paths to delete; each is attempted independently.
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Rename an entry in place. Files keep their extension.
    Mv {
        /// Entry to rename.
        path: String,
        /// New base name (files) or full name (folders).
        new_name: String,
    },
    /// Print a file's content to stdout.
    Cat {
        /// File path.
        path: String,
    },
    /// Copy a file into a directory, across backends if needed.
    Cp {
        /// Source file.
        source: String,
        /// Destination directory.
        dest_dir: String,
    },
    /// Print the name a write would use, without writing.
    Resolve {
        /// Desired path.
        path: String,
        /// Resolve as a folder instead of a file.
        #[arg(long)]
        folder: bool,
        /// Save every existence query into this cassette.
        #[arg(long, conflicts_with = "replay")]
        record: Option<PathBuf>,
        /// Answer existence queries from this cassette instead of storage.
        #[arg(long)]
        replay: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_write_with_source_file() {
        let cli = Cli::parse_from(["fileman", "write", "s3://b/file.txt", "--from", "local.txt"]);
        match cli.command {
            Command::Write { path, from, .. } => {
                assert_eq!(path, "s3://b/file.txt");
                assert_eq!(from.unwrap().to_str(), Some("local.txt"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rm_requires_a_path() {
        assert!(Cli::try_parse_from(["fileman", "rm"]).is_err());
    }

    #[test]
    fn record_and_replay_are_exclusive() {
        let parsed =
            Cli::try_parse_from(["fileman", "resolve", "a.txt", "--record", "x", "--replay", "y"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn log_level_is_global() {
        let cli = Cli::parse_from(["fileman", "exists", "a.txt", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
    }
}
