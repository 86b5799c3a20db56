//! Storage adapter: uniform file operations over one backend.
//!
//! Creating operations (`write_stream`, `create_folder`) resolve a free
//! name first and then create exclusively, re-resolving if another writer
//! claimed the name in between. Mutating operations on existing entries
//! (`delete`, `rename`) validate root and entry before touching storage:
//! `Requested -> Validated -> Executed`, with any failed check ending in an
//! error and no side effect.

use std::collections::BTreeMap;
use std::io::Read;

use tracing::{debug, info, warn};

use crate::adapters::{LocalBackend, RemoteBackend};
use crate::error::{Check, Result, StorageError};
use crate::path::{EntryKind, PathKey};
use crate::ports::{CreateOutcome, Listing, StorageBackend};
use crate::resolver::NameResolver;

/// Default number of re-resolutions after losing an exclusive create.
pub const DEFAULT_CREATE_RETRIES: u32 = 3;

/// Outcome of [`StorageAdapter::batch_delete`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Paths deleted, in request order.
    pub deleted: Vec<String>,
    /// Paths that could not be deleted, with the reason.
    pub failed: BTreeMap<String, StorageError>,
}

impl BatchReport {
    /// Returns `true` if every deletion succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// File operations over a single backend, with collision handling.
pub struct StorageAdapter {
    backend: Box<dyn StorageBackend>,
    resolver: NameResolver,
    create_retries: u32,
}

impl StorageAdapter {
    /// Wraps a backend with the default resolver.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend, resolver: NameResolver::default(), create_retries: DEFAULT_CREATE_RETRIES }
    }

    /// Local filesystem variant.
    #[must_use]
    pub fn local(backend: LocalBackend) -> Self {
        Self::new(Box::new(backend))
    }

    /// Object storage variant.
    #[must_use]
    pub fn remote(backend: RemoteBackend) -> Self {
        Self::new(Box::new(backend))
    }

    /// Replaces the name resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: NameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets how often a lost exclusive create is re-resolved.
    #[must_use]
    pub fn with_create_retries(mut self, retries: u32) -> Self {
        self.create_retries = retries;
        self
    }

    /// The backend this adapter drives.
    #[must_use]
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// The resolver used for creating operations.
    #[must_use]
    pub fn resolver(&self) -> NameResolver {
        self.resolver
    }

    /// Direct existence probe; no resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe fails.
    pub fn exists(&self, path: &PathKey) -> Result<bool> {
        self.backend.exists(path)
    }

    /// Fails unless `path` names an entry of its own: not a root, and not
    /// `.`/`..` standing in for a directory elsewhere.
    fn require_named(path: &PathKey) -> Result<()> {
        if path.is_root() || path.has_dot_component() {
            return Err(StorageError::invalid(path, Check::InvalidName));
        }
        Ok(())
    }

    /// Fails unless the root a creating operation writes under is there.
    fn require_root(&self, path: &PathKey) -> Result<()> {
        if !self.backend.is_dir(&path.root_key())? {
            return Err(StorageError::invalid(path, Check::RootMissing));
        }
        Ok(())
    }

    /// Fails unless both the root and the entry exist.
    fn validate(&self, path: &PathKey) -> Result<()> {
        if !self.backend.root_exists(path)? {
            return Err(StorageError::not_found(path, Check::RootMissing));
        }
        if !self.backend.exists(path)? {
            return Err(StorageError::not_found(path, Check::EntryMissing));
        }
        Ok(())
    }

    /// Reads a whole file after validating it.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the root or the entry is missing.
    /// - [`StorageError::InvalidLocation`] if the path is a directory.
    /// - [`StorageError::BackendFailure`] if the read fails.
    pub fn read_raw(&self, path: &PathKey) -> Result<Vec<u8>> {
        self.validate(path)?;
        if self.backend.is_dir(path)? {
            return Err(StorageError::invalid(path, Check::IsADirectory));
        }
        self.backend.read(path)
    }

    /// Writes `data` under a collision-free name and returns the leaf name
    /// actually used.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::write_bytes`]; reading `data` failing is a
    /// [`StorageError::BackendFailure`].
    pub fn write_stream(&self, path: &PathKey, mut data: impl Read) -> Result<String> {
        let mut buffer = Vec::new();
        data.read_to_end(&mut buffer).map_err(|err| StorageError::backend(path, err))?;
        self.write_bytes(path, &buffer)
    }

    /// Writes bytes under a collision-free name, creating missing parent
    /// directories, and returns the leaf name actually used.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidLocation`] if the path has no file name or
    ///   its root (bucket) is missing.
    /// - [`StorageError::NameConflict`] if a folder holds the name, an
    ///   ancestor name is held by a file, or every retry lost the race.
    /// - [`StorageError::ExhaustedNamespace`] past the resolver ceiling.
    pub fn write_bytes(&self, path: &PathKey, data: &[u8]) -> Result<String> {
        Ok(self.write_bytes_with(path, data, false)?.leaf_name())
    }

    /// Like [`StorageAdapter::write_bytes`], returning the full path written.
    ///
    /// With `increment_parent` the immediate parent directory goes through
    /// the folder collision policy too: an existing `dir` is not reused, a
    /// fresh `dir 2`, `dir 3`, ... is created and the file lands there. If
    /// the write then fails, the fresh folder is removed again while it is
    /// still empty.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::write_bytes`] and [`StorageAdapter::create_folder`].
    pub fn write_bytes_with(&self, path: &PathKey, data: &[u8], increment_parent: bool) -> Result<PathKey> {
        let leaf = path.leaf_name();
        if leaf.is_empty() {
            return Err(StorageError::invalid(path, Check::InvalidName));
        }
        Self::require_named(path)?;
        self.require_root(path)?;
        let Some(parent) = path.parent().filter(|dir| increment_parent && !dir.is_root()) else {
            return self.write_file(path, data);
        };
        let folder = parent.with_leaf(&self.create_folder(&parent)?);
        let written = self.write_file(&folder.join(&leaf), data);
        if written.is_err() {
            self.remove_if_empty(&folder);
        }
        written
    }

    fn write_file(&self, target: &PathKey, data: &[u8]) -> Result<PathKey> {
        let resolved = self.resolver.resolve(target, EntryKind::File, self.backend.as_ref())?;
        self.ensure_parents(target)?;
        let written =
            self.create_resolved(target, resolved, EntryKind::File, |p| self.backend.create_file(p, data))?;
        info!(path = %written, bytes = data.len(), "file written");
        Ok(written)
    }

    /// Best-effort removal of a folder this adapter just created. Left in
    /// place once anything else has landed in it.
    fn remove_if_empty(&self, folder: &PathKey) {
        let empty = self
            .backend
            .list(folder)
            .is_ok_and(|listing| listing.files.is_empty() && listing.folders.is_empty());
        if !empty {
            return;
        }
        match self.backend.remove_dir_all(folder) {
            Ok(()) => debug!(path = %folder, "removed unused folder"),
            Err(err) => warn!(path = %folder, "could not remove unused folder: {err}"),
        }
    }

    /// Creates a folder under a collision-free name, creating missing
    /// ancestors, and returns the leaf name actually used.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidLocation`] for a root, a `.`/`..` alias or a
    ///   missing root (bucket).
    /// - [`StorageError::NameConflict`] if a file holds the folder's name or
    ///   an ancestor's name.
    /// - [`StorageError::ExhaustedNamespace`] past the resolver ceiling.
    pub fn create_folder(&self, path: &PathKey) -> Result<String> {
        let path = path.normalized();
        Self::require_named(&path)?;
        self.require_root(&path)?;
        self.ensure_parents(&path)?;
        let resolved = self.resolver.resolve(&path, EntryKind::Folder, self.backend.as_ref())?;
        let created =
            self.create_resolved(&path, resolved, EntryKind::Folder, |p| self.backend.create_dir(p))?;
        info!(path = %created, "folder created");
        Ok(created.leaf_name())
    }

    /// Creates `desired`'s resolved name exclusively, re-resolving when a
    /// concurrent writer got there first.
    fn create_resolved(
        &self,
        desired: &PathKey,
        mut resolved: PathKey,
        kind: EntryKind,
        create: impl Fn(&PathKey) -> Result<CreateOutcome>,
    ) -> Result<PathKey> {
        let mut retries = 0;
        loop {
            match create(&resolved)? {
                CreateOutcome::Created => return Ok(resolved),
                CreateOutcome::Taken if retries < self.create_retries => {
                    retries += 1;
                    debug!(path = %resolved, retries, "name claimed concurrently, resolving again");
                    resolved = self.resolver.resolve(desired, kind, self.backend.as_ref())?;
                }
                CreateOutcome::Taken => {
                    return Err(StorageError::conflict(&resolved, Check::ClaimedConcurrently))
                }
            }
        }
    }

    /// Makes sure every ancestor of `path` is a directory. Ancestors are
    /// reused when present, never incremented.
    fn ensure_parents(&self, path: &PathKey) -> Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent.is_root() || self.backend.is_dir(&parent)? {
            return Ok(());
        }
        for dir in path.ancestors() {
            NameResolver::check_name_taken(&dir, EntryKind::Folder, self.backend.as_ref())?;
            if self.backend.exists(&dir)? {
                continue;
            }
            if self.backend.create_dir(&dir)? == CreateOutcome::Created {
                info!(path = %dir, "created missing directory");
            }
        }
        Ok(())
    }

    /// Deletes a file, or a directory with everything in it.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] naming the root or entry check that failed.
    /// - [`StorageError::InvalidLocation`] when asked to delete a root or a
    ///   `.`/`..` alias of a directory.
    pub fn delete(&self, path: &PathKey) -> Result<()> {
        let path = path.normalized();
        Self::require_named(&path)?;
        self.validate(&path)?;
        if self.backend.is_dir(&path)? {
            self.backend.remove_dir_all(&path)?;
        } else {
            self.backend.remove_file(&path)?;
        }
        info!(path = %path, "deleted");
        Ok(())
    }

    /// Deletes each path independently and reports per-path outcomes.
    pub fn batch_delete(&self, paths: &[PathKey]) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            match self.delete(path) {
                Ok(()) => report.deleted.push(path.to_string()),
                Err(err) => {
                    warn!(path = %path, "delete failed: {err}");
                    report.failed.insert(path.to_string(), err);
                }
            }
        }
        report
    }

    /// Renames an entry in place and returns its new path. Files keep their
    /// extension; folders take `new_name` as their whole name.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidLocation`] if `new_name` is empty, `.`/`..`
    ///   or has a separator, or if `path` is a root or a `.`/`..` alias.
    /// - [`StorageError::NotFound`] if the entry does not exist.
    /// - [`StorageError::NameConflict`] if the new path is taken.
    pub fn rename(&self, path: &PathKey, new_name: &str) -> Result<PathKey> {
        if matches!(new_name, "" | "." | "..") || new_name.contains(['/', '\\']) {
            return Err(StorageError::invalid(new_name, Check::InvalidName));
        }
        let path = path.normalized();
        Self::require_named(&path)?;
        self.validate(&path)?;
        let target = if self.backend.is_dir(&path)? {
            path.with_leaf(new_name)
        } else {
            path.with_base_name(new_name)
        };
        if self.backend.exists(&target)? {
            return Err(StorageError::conflict(&target, Check::TargetTaken));
        }
        self.backend.rename(&path, &target)?;
        info!(from = %path, to = %target, "renamed");
        Ok(target)
    }

    /// Lists one directory level.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidLocation`] naming the missing root,
    /// missing entry or non-directory.
    pub fn list(&self, path: &PathKey) -> Result<Listing> {
        let dir = path.normalized();
        if self.backend.is_dir(&dir)? {
            return self.backend.list(&dir);
        }
        let check = if !self.backend.root_exists(&dir)? {
            Check::RootMissing
        } else if self.backend.exists(&dir)? {
            Check::NotADirectory
        } else {
            Check::EntryMissing
        };
        Err(StorageError::invalid(&dir, check))
    }
}
