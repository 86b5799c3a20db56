//! File manager facade routing storage path strings to a backend.
//!
//! `s3://bucket/...` paths go to the object storage adapter, scheme-less
//! paths to the local one. Codec-aware reads and writes look the codec up
//! in the [`FileTypeRegistry`] by extension.

use std::io::Read;

use serde_json::Value;
use tracing::{info, warn};

use crate::adapters::{LocalBackend, RemoteBackend};
use crate::config::ManagerConfig;
use crate::error::{BoxError, Check, Result, StorageError};
use crate::path::{EntryKind, PathKey};
use crate::ports::Listing;
use crate::registry::FileTypeRegistry;
use crate::resolver::NameResolver;
use crate::storage::{BatchReport, StorageAdapter};

/// Scheme handled by the remote adapter.
pub const REMOTE_SCHEME: &str = "s3";

/// Entry point for file operations on local disk and object storage.
pub struct FileManager {
    local: StorageAdapter,
    remote: Option<StorageAdapter>,
    registry: FileTypeRegistry,
}

impl FileManager {
    /// A manager with only a local adapter and the default codecs.
    #[must_use]
    pub fn new(local: StorageAdapter) -> Self {
        Self { local, remote: None, registry: FileTypeRegistry::with_defaults() }
    }

    /// Adds the adapter serving `s3://` paths.
    #[must_use]
    pub fn with_remote(mut self, remote: StorageAdapter) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Replaces the codec registry.
    #[must_use]
    pub fn with_registry(mut self, registry: FileTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Builds both adapters from configuration. S3 clients are created
    /// lazily on first use of a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BackendFailure`] if the remote runtime cannot start.
    pub fn from_config(config: &ManagerConfig) -> Result<Self> {
        let resolver = NameResolver::new(config.increment_ceiling);
        let local = StorageAdapter::local(LocalBackend::new(&config.local_root))
            .with_resolver(resolver)
            .with_create_retries(config.create_retries);
        let remote = StorageAdapter::remote(RemoteBackend::with_s3(config.s3_settings())?)
            .with_resolver(resolver)
            .with_create_retries(config.create_retries);
        Ok(Self::new(local).with_remote(remote))
    }

    /// The codec registry in use.
    #[must_use]
    pub fn registry(&self) -> &FileTypeRegistry {
        &self.registry
    }

    /// Adapter serving `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidLocation`] for a scheme without an adapter.
    pub fn adapter_for(&self, path: &PathKey) -> Result<&StorageAdapter> {
        match path.scheme() {
            None => Ok(&self.local),
            Some(REMOTE_SCHEME) => {
                self.remote.as_ref().ok_or_else(|| StorageError::invalid(path, Check::UnsupportedScheme))
            }
            Some(_) => Err(StorageError::invalid(path, Check::UnsupportedScheme)),
        }
    }

    /// Parses `raw` and picks its adapter.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidLocation`] for an empty path or an
    /// unsupported scheme.
    pub fn locate(&self, raw: &str) -> Result<(PathKey, &StorageAdapter)> {
        let key = PathKey::parse(raw)?;
        let adapter = self.adapter_for(&key)?;
        Ok((key, adapter))
    }

    /// Direct existence probe.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable path or a failed probe.
    pub fn exists(&self, path: &str) -> Result<bool> {
        let (key, adapter) = self.locate(path)?;
        adapter.exists(&key)
    }

    /// Name a write (or folder creation) would use right now, without
    /// creating anything.
    ///
    /// # Errors
    ///
    /// Same conflicts as the creating operation.
    pub fn resolve_name(&self, path: &str, kind: EntryKind) -> Result<PathKey> {
        let (key, adapter) = self.locate(path)?;
        adapter.resolver().resolve(&key.normalized(), kind, adapter.backend())
    }

    /// Streams `data` into a collision-free file name and returns that name.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::write_bytes`].
    pub fn write_stream(&self, path: &str, data: impl Read) -> Result<String> {
        let (key, adapter) = self.locate(path)?;
        adapter.write_stream(&key, data)
    }

    /// Streams `data` into a freshly created copy of the parent folder
    /// (`dir 2`, `dir 3`, ... when `dir` exists) and returns the full path
    /// written.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::write_bytes_with`].
    pub fn write_stream_into_new_folder(&self, path: &str, mut data: impl Read) -> Result<String> {
        let (key, adapter) = self.locate(path)?;
        let mut buffer = Vec::new();
        data.read_to_end(&mut buffer).map_err(|err| StorageError::backend(&key, err))?;
        Ok(adapter.write_bytes_with(&key, &buffer, true)?.to_string())
    }

    /// Writes raw bytes; see [`FileManager::write_stream`].
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::write_bytes`].
    pub fn write_raw(&self, path: &str, data: &[u8]) -> Result<String> {
        let (key, adapter) = self.locate(path)?;
        adapter.write_bytes(&key, data)
    }

    /// Encodes `value` with the codec bound to the extension and writes it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnsupportedType`] if no codec handles the
    /// extension, otherwise as [`FileManager::write_raw`].
    pub fn write_file(&self, path: &str, value: &Value) -> Result<String> {
        let (key, adapter) = self.locate(path)?;
        let codec = self.registry.resolve(&key)?;
        let bytes = codec.encode(value).map_err(|err| StorageError::backend(&key, err))?;
        adapter.write_bytes(&key, &bytes)
    }

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::read_raw`].
    pub fn read_raw(&self, path: &str) -> Result<Vec<u8>> {
        let (key, adapter) = self.locate(path)?;
        adapter.read_raw(&key)
    }

    /// Reads a file and decodes it with the codec bound to its extension.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnsupportedType`] before any I/O if no codec
    /// handles the extension.
    pub fn read_file(&self, path: &str) -> Result<Value> {
        let (key, adapter) = self.locate(path)?;
        let codec = self.registry.resolve(&key)?;
        let bytes = adapter.read_raw(&key)?;
        codec.decode(&bytes).map_err(|err| StorageError::backend(&key, err))
    }

    /// Reads a file and hands its bytes to `reader`.
    ///
    /// # Errors
    ///
    /// Returns the read error, or `reader`'s error as a backend failure.
    pub fn custom_read<T>(
        &self,
        path: &str,
        reader: impl FnOnce(&[u8]) -> std::result::Result<T, BoxError>,
    ) -> Result<T> {
        let (key, adapter) = self.locate(path)?;
        let bytes = adapter.read_raw(&key)?;
        reader(&bytes).map_err(|err| StorageError::backend(&key, err))
    }

    /// Creates a folder and any missing parents; returns the name used.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::create_folder`].
    pub fn create_folder(&self, path: &str) -> Result<String> {
        let (key, adapter) = self.locate(path)?;
        adapter.create_folder(&key)
    }

    /// Deletes a file or a folder tree.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::delete`].
    pub fn delete(&self, path: &str) -> Result<()> {
        let (key, adapter) = self.locate(path)?;
        adapter.delete(&key)
    }

    /// Deletes every path independently. Paths that do not parse or route
    /// are reported as failures like any other.
    pub fn batch_delete<S: AsRef<str>>(&self, paths: &[S]) -> BatchReport {
        let mut report = BatchReport::default();
        for raw in paths {
            let raw = raw.as_ref();
            match self.locate(raw).and_then(|(key, adapter)| adapter.delete(&key)) {
                Ok(()) => report.deleted.push(raw.to_string()),
                Err(err) => {
                    warn!(path = raw, "delete failed: {err}");
                    report.failed.insert(raw.to_string(), err);
                }
            }
        }
        info!(deleted = report.deleted.len(), failed = report.failed.len(), "batch delete finished");
        report
    }

    /// Renames an entry in place; returns the new path.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::rename`].
    pub fn rename(&self, path: &str, new_name: &str) -> Result<String> {
        let (key, adapter) = self.locate(path)?;
        Ok(adapter.rename(&key, new_name)?.to_string())
    }

    /// Lists one directory level.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::list`].
    pub fn list(&self, path: &str) -> Result<Listing> {
        let (key, adapter) = self.locate(path)?;
        adapter.list(&key)
    }

    /// Copies a file into `destination_dir`, across backends if needed.
    /// The copy keeps the source leaf name unless it collides.
    ///
    /// # Errors
    ///
    /// Returns read errors for the source and write errors for the copy.
    pub fn copy_into(&self, source: &str, destination_dir: &str) -> Result<String> {
        let (source_key, source_adapter) = self.locate(source)?;
        let (dir_key, dest_adapter) = self.locate(destination_dir)?;
        let bytes = source_adapter.read_raw(&source_key)?;
        let target = dir_key.join(&source_key.normalized().leaf_name());
        let written = dest_adapter.write_bytes(&target, &bytes)?;
        info!(from = %source_key, to = %target, name = %written, "copied");
        Ok(written)
    }
}
