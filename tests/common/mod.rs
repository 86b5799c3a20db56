//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A unique scratch directory removed on drop.
pub struct Scratch {
    path: PathBuf,
}

impl Scratch {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!("filemanager_{label}_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute storage path string for `relative` inside the scratch dir.
    pub fn key(&self, relative: &str) -> String {
        self.path.join(relative).to_string_lossy().into_owned()
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
