//! Extension to codec binding.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::codecs::{JsonCodec, TextCodec, YamlCodec};
use crate::error::{Result, StorageError};
use crate::path::PathKey;
use crate::ports::FileCodec;

/// Rejected codec registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The extension is already bound.
    #[error("extension {extension:?} is already bound to codec {existing:?}")]
    AlreadyBound {
        /// Extension without the dot.
        extension: String,
        /// Name of the codec holding it.
        existing: String,
    },
}

/// Maps lowercase extensions to codecs.
#[derive(Clone, Default)]
pub struct FileTypeRegistry {
    codecs: HashMap<String, Arc<dyn FileCodec>>,
}

impl fmt::Debug for FileTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<(&str, &str)> =
            self.codecs.iter().map(|(ext, codec)| (ext.as_str(), codec.name())).collect();
        bound.sort_unstable();
        f.debug_struct("FileTypeRegistry").field("codecs", &bound).finish()
    }
}

impl FileTypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the text, JSON and YAML codecs bound.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults: [Arc<dyn FileCodec>; 3] =
            [Arc::new(TextCodec), Arc::new(JsonCodec), Arc::new(YamlCodec)];
        for codec in defaults {
            let registered = registry.register(codec);
            debug_assert!(registered.is_ok(), "built-in codecs share an extension: {registered:?}");
        }
        registry
    }

    /// Binds every extension the codec declares. Nothing is bound if any of
    /// them is bound already, including to this very codec.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyBound`] for the first clashing
    /// extension.
    pub fn register(&mut self, codec: Arc<dyn FileCodec>) -> std::result::Result<(), RegistryError> {
        let extensions: Vec<String> =
            codec.extensions().iter().map(|ext| ext.to_ascii_lowercase()).collect();
        for extension in &extensions {
            if let Some(existing) = self.codecs.get(extension) {
                return Err(RegistryError::AlreadyBound {
                    extension: extension.clone(),
                    existing: existing.name().to_string(),
                });
            }
        }
        for extension in extensions {
            self.codecs.insert(extension, Arc::clone(&codec));
        }
        Ok(())
    }

    /// Codec bound to the path's extension, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnsupportedType`] if none is bound.
    pub fn resolve(&self, path: &PathKey) -> Result<Arc<dyn FileCodec>> {
        let extension = path.extension().trim_start_matches('.').to_ascii_lowercase();
        self.codecs.get(&extension).cloned().ok_or_else(|| StorageError::UnsupportedType {
            path: path.to_string(),
            extension,
        })
    }

    /// Bound extensions, sorted.
    #[must_use]
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}
