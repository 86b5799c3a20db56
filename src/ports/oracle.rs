//! Existence oracle port queried by the name resolver.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::{EntryKind, PathKey};

/// Names found by listing a directory once, split by entry kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingNames {
    /// Leaf names of files in the directory.
    pub files: BTreeSet<String>,
    /// Leaf names of sub-directories.
    pub folders: BTreeSet<String>,
}

impl SiblingNames {
    /// Names that block creating an entry of `kind`: sibling folders for a
    /// file, sibling files for a folder.
    #[must_use]
    pub fn claimed_against(&self, kind: EntryKind) -> &BTreeSet<String> {
        match kind {
            EntryKind::File => &self.folders,
            EntryKind::Folder => &self.files,
        }
    }
}

/// Answers "does an entry exist at this path?" for one backend.
///
/// Each call may be a live remote round trip, so callers keep the number
/// of queries to a minimum.
pub trait ExistenceOracle: Send + Sync {
    /// Returns `true` if a file or folder exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::BackendFailure`] if the probe itself fails.
    fn exists(&self, path: &PathKey) -> Result<bool>;

    /// Lists the entry names directly inside `dir`. A missing directory has
    /// no siblings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::BackendFailure`] if listing fails.
    fn sibling_names(&self, dir: &PathKey) -> Result<SiblingNames>;
}
