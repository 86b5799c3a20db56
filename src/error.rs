//! Error types shared by every storage operation.

use std::fmt;

/// The precondition or probe that rejected an operation.
///
/// Carried by every path-bearing [`StorageError`] so a caller can tell
/// "root missing" apart from "entry missing" without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// The path string was empty.
    EmptyPath,
    /// The path uses a scheme no backend is configured for.
    UnsupportedScheme,
    /// A new name contained a separator or was empty.
    InvalidName,
    /// The bucket (remote) or parent directory (local) does not exist.
    RootMissing,
    /// The entry itself does not exist.
    EntryMissing,
    /// The operation needs a directory but the entry is a file.
    NotADirectory,
    /// The operation needs a file but the entry is a directory.
    IsADirectory,
    /// A sibling file already uses the exact name of the folder being created.
    SiblingIsFile,
    /// A sibling folder already uses the exact name of the file being written.
    SiblingIsFolder,
    /// A rename target is already taken.
    TargetTaken,
    /// Another writer created the resolved name between the probe and the write.
    ClaimedConcurrently,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyPath => "empty path",
            Self::UnsupportedScheme => "unsupported scheme",
            Self::InvalidName => "invalid name",
            Self::RootMissing => "root missing",
            Self::EntryMissing => "entry missing",
            Self::IsADirectory => "is a directory",
            Self::NotADirectory => "not a directory",
            Self::SiblingIsFile => "a sibling file has the same name",
            Self::SiblingIsFolder => "a sibling folder has the same name",
            Self::TargetTaken => "target name already exists",
            Self::ClaimedConcurrently => "claimed concurrently",
        };
        f.write_str(text)
    }
}

/// Boxed source error wrapped by [`StorageError::BackendFailure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by path parsing, name resolution and storage adapters.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The location (root or parent) an operation presupposes is not valid.
    #[error("invalid location {path}: {check}")]
    InvalidLocation {
        /// Offending path.
        path: String,
        /// Failed check.
        check: Check,
    },

    /// The target entry does not exist.
    #[error("not found: {path} ({check})")]
    NotFound {
        /// Offending path.
        path: String,
        /// Failed check.
        check: Check,
    },

    /// An exact-name collision that is surfaced instead of auto-resolved.
    #[error("name conflict at {path}: {check}")]
    NameConflict {
        /// Offending path.
        path: String,
        /// Failed check.
        check: Check,
    },

    /// The increment loop ran past its ceiling without finding a free name.
    #[error("no free name for {path} after {attempts} candidates")]
    ExhaustedNamespace {
        /// Desired path.
        path: String,
        /// Number of suffixed candidates probed.
        attempts: u32,
    },

    /// No codec is registered for the file's extension.
    #[error("unsupported file type for {path}: no codec bound to {extension:?}")]
    UnsupportedType {
        /// Offending path.
        path: String,
        /// Extension without the leading dot.
        extension: String,
    },

    /// The underlying disk or network call failed.
    #[error("backend failure at {path}: {source}")]
    BackendFailure {
        /// Path the call was made for.
        path: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },
}

impl StorageError {
    /// Wraps a backend error for `path`.
    pub fn backend(path: impl fmt::Display, source: impl Into<BoxError>) -> Self {
        Self::BackendFailure { path: path.to_string(), source: source.into() }
    }

    /// Builds a [`StorageError::NotFound`].
    pub fn not_found(path: impl fmt::Display, check: Check) -> Self {
        Self::NotFound { path: path.to_string(), check }
    }

    /// Builds a [`StorageError::NameConflict`].
    pub fn conflict(path: impl fmt::Display, check: Check) -> Self {
        Self::NameConflict { path: path.to_string(), check }
    }

    /// Builds a [`StorageError::InvalidLocation`].
    pub fn invalid(path: impl fmt::Display, check: Check) -> Self {
        Self::InvalidLocation { path: path.to_string(), check }
    }

    /// Returns the failed check, if the variant carries one.
    #[must_use]
    pub fn check(&self) -> Option<Check> {
        match self {
            Self::InvalidLocation { check, .. }
            | Self::NotFound { check, .. }
            | Self::NameConflict { check, .. } => Some(*check),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = StorageError> = std::result::Result<T, E>;
