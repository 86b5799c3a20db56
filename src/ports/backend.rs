//! Backend client port: the physical primitives a storage adapter drives.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::oracle::ExistenceOracle;
use crate::error::Result;
use crate::path::PathKey;

/// Timestamp layout used in listings.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of an exclusive create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The entry was created.
    Created,
    /// Something already occupied the name; nothing was written.
    Taken,
}

/// Metadata reported for a file in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Last modification time, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub last_modified: String,
    /// Size in bytes.
    pub size: u64,
}

impl EntryInfo {
    /// Builds an entry from a UTC timestamp and a size.
    #[must_use]
    pub fn new(modified: DateTime<Utc>, size: u64) -> Self {
        Self { last_modified: modified.format(TIMESTAMP_FORMAT).to_string(), size }
    }
}

/// Single-level directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Files keyed by leaf name.
    pub files: BTreeMap<String, EntryInfo>,
    /// Sub-directory names, sorted.
    pub folders: Vec<String>,
}

/// Physical operations of one storage backend.
///
/// Implementations perform exactly the primitive asked for; collision
/// handling and precondition checks live in [`crate::storage::StorageAdapter`].
pub trait StorageBackend: ExistenceOracle {
    /// Returns `true` if the root the path hangs off exists: the bucket for
    /// object storage, the parent directory for the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe fails.
    fn root_exists(&self, path: &PathKey) -> Result<bool>;

    /// Returns `true` if `path` is an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe fails.
    fn is_dir(&self, path: &PathKey) -> Result<bool>;

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn read(&self, path: &PathKey) -> Result<Vec<u8>>;

    /// Creates a file only if nothing exists at `path` yet. The parent
    /// directory already exists when this is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails for a reason other than the
    /// name being taken.
    fn create_file(&self, path: &PathKey, data: &[u8]) -> Result<CreateOutcome>;

    /// Creates a single directory only if nothing exists at `path` yet.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails for a reason other than the name
    /// being taken.
    fn create_dir(&self, path: &PathKey) -> Result<CreateOutcome>;

    /// Removes a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_file(&self, path: &PathKey) -> Result<()>;

    /// Removes a directory and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_dir_all(&self, path: &PathKey) -> Result<()>;

    /// Moves an entry (file or directory) to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the move fails.
    fn rename(&self, from: &PathKey, to: &PathKey) -> Result<()>;

    /// Lists the direct children of `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    fn list(&self, dir: &PathKey) -> Result<Listing>;
}
