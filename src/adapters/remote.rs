//! Object storage backend over the `object_store` crate.
//!
//! Keys are addressed as `bucket + key`; each bucket maps to one
//! [`ObjectStore`]. Calls are driven to completion on a private
//! current-thread runtime so every operation blocks the caller.
//!
//! Object stores have no directories. A folder exists when any key lives
//! under its prefix; an explicitly created empty folder is persisted as a
//! zero-length [`FOLDER_MARKER`] object inside it, hidden from listings.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ListResult, ObjectMeta, ObjectStore, PutMode, PutPayload};
use serde::{Deserialize, Serialize};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::error::{Check, Result, StorageError};
use crate::path::PathKey;
use crate::ports::{
    CreateOutcome, EntryInfo, ExistenceOracle, Listing, SiblingNames, StorageBackend,
};

/// Leaf name of the marker object that keeps an empty folder alive.
pub const FOLDER_MARKER: &str = ".keep";

/// Connection settings for buckets opened on demand through S3.
///
/// Credentials are read from the standard `AWS_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    /// Region override.
    pub region: Option<String>,
    /// Endpoint for S3-compatible services (MinIO, R2, ...).
    pub endpoint: Option<String>,
    /// Permit plain HTTP endpoints.
    pub allow_http: bool,
}

/// Backend over one object store per bucket.
pub struct RemoteBackend {
    runtime: Runtime,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
    s3: Option<S3Settings>,
}

impl RemoteBackend {
    /// Creates a backend that only serves explicitly registered buckets.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BackendFailure`] if the runtime cannot start.
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| StorageError::backend("object store runtime", err))?;
        Ok(Self { runtime, stores: Mutex::new(HashMap::new()), s3: None })
    }

    /// Creates a backend that opens unknown buckets through S3.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BackendFailure`] if the runtime cannot start.
    pub fn with_s3(settings: S3Settings) -> Result<Self> {
        let mut backend = Self::new()?;
        backend.s3 = Some(settings);
        Ok(backend)
    }

    /// Serves `bucket` from `store`.
    #[must_use]
    pub fn with_store(self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.register(bucket, store);
        self
    }

    /// Serves `bucket` from `store`, replacing any previous binding.
    pub fn register(&self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner).insert(bucket.into(), store);
    }

    fn store(&self, bucket: &str) -> Result<Option<Arc<dyn ObjectStore>>> {
        let mut stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores.get(bucket) {
            return Ok(Some(Arc::clone(store)));
        }
        let Some(settings) = &self.s3 else {
            return Ok(None);
        };
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_allow_http(settings.allow_http);
        if let Some(region) = &settings.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        let store: Arc<dyn ObjectStore> =
            Arc::new(builder.build().map_err(|err| StorageError::backend(bucket, err))?);
        debug!(bucket, "opened S3 bucket");
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(Some(store))
    }

    fn required_store(&self, path: &PathKey) -> Result<Arc<dyn ObjectStore>> {
        self.store(path.root())?.ok_or_else(|| StorageError::not_found(path, Check::RootMissing))
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn bucket_reachable(&self, store: &dyn ObjectStore) -> Result<bool, object_store::Error> {
        match self.block_on(store.list_with_delimiter(None)) {
            Ok(_) => Ok(true),
            Err(err) if is_missing_bucket(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Lists `prefix` one level deep, dropping the marker and the prefix
    /// object itself.
    fn list_level(
        &self,
        store: &dyn ObjectStore,
        prefix: Option<&ObjectPath>,
    ) -> Result<ListResult, object_store::Error> {
        let mut result = self.block_on(store.list_with_delimiter(prefix))?;
        result.objects.retain(|meta| {
            Some(&meta.location) != prefix && meta.location.filename() != Some(FOLDER_MARKER)
        });
        Ok(result)
    }

    /// Classifies a key: `Some(false)` for an object, `Some(true)` for a
    /// prefix with children, `None` when neither exists.
    fn probe(&self, store: &dyn ObjectStore, key: &str) -> Result<Option<bool>, object_store::Error> {
        if key.is_empty() {
            return Ok(self.bucket_reachable(store)?.then_some(true));
        }
        let location = ObjectPath::from(key);
        match self.block_on(store.head(&location)) {
            Ok(_) => return Ok(Some(false)),
            Err(object_store::Error::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        let children = self.block_on(store.list_with_delimiter(Some(&location)))?;
        let has_children = !children.common_prefixes.is_empty()
            || children.objects.iter().any(|meta| meta.location != location);
        Ok(has_children.then_some(true))
    }

    fn put_exclusive(
        &self,
        store: &dyn ObjectStore,
        location: &ObjectPath,
        data: &[u8],
    ) -> Result<CreateOutcome, object_store::Error> {
        let payload = PutPayload::from(data.to_vec());
        match self.block_on(store.put_opts(location, payload, PutMode::Create.into())) {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(object_store::Error::AlreadyExists { .. } | object_store::Error::Precondition { .. }) => {
                Ok(CreateOutcome::Taken)
            }
            Err(object_store::Error::NotImplemented) => {
                debug!(%location, "store lacks conditional put, falling back to head + put");
                match self.block_on(store.head(location)) {
                    Ok(_) => return Ok(CreateOutcome::Taken),
                    Err(object_store::Error::NotFound { .. }) => {}
                    Err(err) => return Err(err),
                }
                self.block_on(store.put(location, PutPayload::from(data.to_vec())))?;
                Ok(CreateOutcome::Created)
            }
            Err(err) => Err(err),
        }
    }

    fn objects_under(
        &self,
        store: &dyn ObjectStore,
        prefix: &ObjectPath,
    ) -> Result<Vec<ObjectMeta>, object_store::Error> {
        self.block_on(store.list(Some(prefix)).try_collect::<Vec<_>>())
    }
}

/// Whether a bucket-level listing failed because the bucket is not there.
/// S3 clients surface `NoSuchBucket` as a generic error carrying the 404.
fn is_missing_bucket(err: &object_store::Error) -> bool {
    match err {
        object_store::Error::NotFound { .. } => true,
        object_store::Error::Generic { source, .. } => {
            let message = source.to_string();
            message.contains("NoSuchBucket") || message.contains("404")
        }
        _ => false,
    }
}

impl ExistenceOracle for RemoteBackend {
    fn exists(&self, path: &PathKey) -> Result<bool> {
        let Some(store) = self.store(path.root())? else {
            return Ok(false);
        };
        let found = self.probe(store.as_ref(), &path.object_key());
        found.map(|kind| kind.is_some()).map_err(|err| StorageError::backend(path, err))
    }

    fn sibling_names(&self, dir: &PathKey) -> Result<SiblingNames> {
        let Some(store) = self.store(dir.root())? else {
            return Ok(SiblingNames::default());
        };
        let key = dir.object_key();
        let prefix = (!key.is_empty()).then(|| ObjectPath::from(key));
        let level =
            self.list_level(store.as_ref(), prefix.as_ref()).map_err(|err| StorageError::backend(dir, err))?;

        let mut names = SiblingNames::default();
        names.files.extend(level.objects.iter().filter_map(|meta| meta.location.filename()).map(str::to_string));
        names.folders.extend(level.common_prefixes.iter().filter_map(ObjectPath::filename).map(str::to_string));
        Ok(names)
    }
}

impl StorageBackend for RemoteBackend {
    fn root_exists(&self, path: &PathKey) -> Result<bool> {
        let Some(store) = self.store(path.root())? else {
            return Ok(false);
        };
        self.bucket_reachable(store.as_ref()).map_err(|err| StorageError::backend(path, err))
    }

    fn is_dir(&self, path: &PathKey) -> Result<bool> {
        let Some(store) = self.store(path.root())? else {
            return Ok(false);
        };
        let kind = self.probe(store.as_ref(), &path.object_key());
        kind.map(|kind| kind == Some(true)).map_err(|err| StorageError::backend(path, err))
    }

    fn read(&self, path: &PathKey) -> Result<Vec<u8>> {
        let store = self.required_store(path)?;
        let location = ObjectPath::from(path.object_key());
        let bytes = self.block_on(async {
            let result = store.get(&location).await?;
            result.bytes().await
        });
        match bytes {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(object_store::Error::NotFound { .. }) => {
                Err(StorageError::not_found(path, Check::EntryMissing))
            }
            Err(err) => Err(StorageError::backend(path, err)),
        }
    }

    fn create_file(&self, path: &PathKey, data: &[u8]) -> Result<CreateOutcome> {
        let store = self.required_store(path)?;
        let location = ObjectPath::from(path.object_key());
        self.put_exclusive(store.as_ref(), &location, data).map_err(|err| StorageError::backend(path, err))
    }

    fn create_dir(&self, path: &PathKey) -> Result<CreateOutcome> {
        if self.exists(path)? {
            return Ok(CreateOutcome::Taken);
        }
        let store = self.required_store(path)?;
        let marker = ObjectPath::from(path.object_key()).child(FOLDER_MARKER);
        self.put_exclusive(store.as_ref(), &marker, &[]).map_err(|err| StorageError::backend(path, err))
    }

    fn remove_file(&self, path: &PathKey) -> Result<()> {
        let store = self.required_store(path)?;
        let location = ObjectPath::from(path.object_key());
        self.block_on(store.delete(&location)).map_err(|err| StorageError::backend(path, err))
    }

    fn remove_dir_all(&self, path: &PathKey) -> Result<()> {
        let store = self.required_store(path)?;
        let prefix = ObjectPath::from(path.object_key());
        let objects =
            self.objects_under(store.as_ref(), &prefix).map_err(|err| StorageError::backend(path, err))?;
        for meta in objects {
            self.block_on(store.delete(&meta.location))
                .map_err(|err| StorageError::backend(&meta.location, err))?;
        }
        Ok(())
    }

    fn rename(&self, from: &PathKey, to: &PathKey) -> Result<()> {
        let store = self.required_store(from)?;
        let source = ObjectPath::from(from.object_key());
        let target = ObjectPath::from(to.object_key());

        if !self.is_dir(from)? {
            return self
                .block_on(store.rename(&source, &target))
                .map_err(|err| StorageError::backend(from, err));
        }

        let objects =
            self.objects_under(store.as_ref(), &source).map_err(|err| StorageError::backend(from, err))?;
        for meta in objects {
            let rest = meta.location.as_ref().strip_prefix(source.as_ref()).unwrap_or_default();
            let moved = ObjectPath::from(format!("{}{rest}", target.as_ref()));
            self.block_on(store.rename(&meta.location, &moved))
                .map_err(|err| StorageError::backend(&meta.location, err))?;
        }
        Ok(())
    }

    fn list(&self, dir: &PathKey) -> Result<Listing> {
        let store = self.required_store(dir)?;
        let key = dir.object_key();
        let prefix = (!key.is_empty()).then(|| ObjectPath::from(key));
        let level =
            self.list_level(store.as_ref(), prefix.as_ref()).map_err(|err| StorageError::backend(dir, err))?;

        let mut listing = Listing::default();
        for meta in &level.objects {
            if let Some(name) = meta.location.filename() {
                #[allow(clippy::cast_possible_truncation, clippy::unnecessary_cast)]
                let size = meta.size as u64;
                listing.files.insert(name.to_string(), EntryInfo::new(meta.last_modified, size));
            }
        }
        listing.folders =
            level.common_prefixes.iter().filter_map(ObjectPath::filename).map(str::to_string).collect();
        listing.folders.sort();
        Ok(listing)
    }
}
