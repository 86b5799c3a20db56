//! Local filesystem backend using `std::fs`.

use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::{Result, StorageError};
use crate::path::PathKey;
use crate::ports::{
    CreateOutcome, EntryInfo, ExistenceOracle, Listing, SiblingNames, StorageBackend,
};

/// Backend over real disk I/O. Relative keys resolve against `base_dir`.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    base_dir: PathBuf,
}

impl LocalBackend {
    /// Creates a backend rooted at `base_dir`; an empty path means the
    /// process working directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Native path for a key.
    #[must_use]
    pub fn native_path(&self, path: &PathKey) -> PathBuf {
        let native = self.base_dir.join(path.to_string());
        if native.as_os_str().is_empty() {
            return PathBuf::from(".");
        }
        native
    }

    fn stat(&self, path: &PathKey) -> Result<Option<Metadata>> {
        let native = self.native_path(path);
        match fs::metadata(&native) {
            Ok(meta) => Ok(Some(meta)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&native, err)),
        }
    }
}

fn io_error(path: &Path, err: io::Error) -> StorageError {
    StorageError::backend(path.display(), err)
}

/// Yields `(name, metadata)` for each readable, UTF-8 named entry.
fn read_entries(dir: &Path) -> io::Result<Vec<(String, Metadata)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("skipping non UTF-8 entry {raw:?} in {}", dir.display());
                continue;
            }
        };
        match entry.metadata() {
            Ok(meta) => entries.push((name, meta)),
            Err(err) => warn!("skipping {}: {err}", entry.path().display()),
        }
    }
    Ok(entries)
}

impl ExistenceOracle for LocalBackend {
    fn exists(&self, path: &PathKey) -> Result<bool> {
        let native = self.native_path(path);
        native.try_exists().map_err(|err| io_error(&native, err))
    }

    fn sibling_names(&self, dir: &PathKey) -> Result<SiblingNames> {
        let native = self.native_path(dir);
        let entries = match read_entries(&native) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(SiblingNames::default()),
            Err(err) => return Err(io_error(&native, err)),
        };
        let mut names = SiblingNames::default();
        for (name, meta) in entries {
            if meta.is_dir() {
                names.folders.insert(name);
            } else {
                names.files.insert(name);
            }
        }
        Ok(names)
    }
}

impl StorageBackend for LocalBackend {
    fn root_exists(&self, path: &PathKey) -> Result<bool> {
        match path.parent() {
            Some(parent) => self.is_dir(&parent),
            None => self.exists(path),
        }
    }

    fn is_dir(&self, path: &PathKey) -> Result<bool> {
        Ok(self.stat(path)?.is_some_and(|meta| meta.is_dir()))
    }

    fn read(&self, path: &PathKey) -> Result<Vec<u8>> {
        let native = self.native_path(path);
        fs::read(&native).map_err(|err| io_error(&native, err))
    }

    fn create_file(&self, path: &PathKey, data: &[u8]) -> Result<CreateOutcome> {
        let native = self.native_path(path);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&native) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Ok(CreateOutcome::Taken)
            }
            Err(err) => return Err(io_error(&native, err)),
        };
        file.write_all(data).and_then(|()| file.flush()).map_err(|err| io_error(&native, err))?;
        Ok(CreateOutcome::Created)
    }

    fn create_dir(&self, path: &PathKey) -> Result<CreateOutcome> {
        let native = self.native_path(path);
        match fs::create_dir(&native) {
            Ok(()) => Ok(CreateOutcome::Created),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(CreateOutcome::Taken),
            Err(err) => Err(io_error(&native, err)),
        }
    }

    fn remove_file(&self, path: &PathKey) -> Result<()> {
        let native = self.native_path(path);
        fs::remove_file(&native).map_err(|err| io_error(&native, err))
    }

    fn remove_dir_all(&self, path: &PathKey) -> Result<()> {
        let native = self.native_path(path);
        fs::remove_dir_all(&native).map_err(|err| io_error(&native, err))
    }

    fn rename(&self, from: &PathKey, to: &PathKey) -> Result<()> {
        let native = self.native_path(from);
        fs::rename(&native, self.native_path(to)).map_err(|err| io_error(&native, err))
    }

    fn list(&self, dir: &PathKey) -> Result<Listing> {
        let native = self.native_path(dir);
        let mut listing = Listing::default();
        for (name, meta) in read_entries(&native).map_err(|err| io_error(&native, err))? {
            if meta.is_dir() {
                listing.folders.push(name);
            } else {
                let modified = meta.modified().map_or(DateTime::<Utc>::UNIX_EPOCH, DateTime::from);
                listing.files.insert(name, EntryInfo::new(modified, meta.len()));
            }
        }
        listing.folders.sort();
        Ok(listing)
    }
}
