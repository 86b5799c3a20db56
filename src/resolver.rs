//! Collision-free naming by numeric suffix.
//!
//! Resolution is two-tier. The parent directory is listed once and the
//! desired leaf is checked against siblings of the *other* kind (a folder
//! named like the file being written, or a file named like the folder being
//! created); a hit aborts with [`StorageError::NameConflict`]. Otherwise the
//! oracle is probed: a free name is returned unchanged, a taken one gets
//! ` 2`, ` 3`, ... appended to its base name until a free candidate turns up.
//!
//! The probe and the later create are not atomic. Another writer can claim
//! a candidate in between; adapters therefore create exclusively and call
//! back into the resolver when they lose that race.

use tracing::debug;

use crate::error::{Check, Result, StorageError};
use crate::path::{EntryKind, PathKey};
use crate::ports::ExistenceOracle;

/// Default number of suffixed candidates probed before giving up.
pub const DEFAULT_INCREMENT_CEILING: u32 = 10_000;

/// First numeric suffix; the bare name is implicitly slot 1.
const FIRST_SUFFIX: u32 = 2;

/// Produces paths guaranteed free at the time of probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameResolver {
    ceiling: u32,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(DEFAULT_INCREMENT_CEILING)
    }
}

impl NameResolver {
    /// Creates a resolver that probes at most `ceiling` suffixed candidates.
    #[must_use]
    pub fn new(ceiling: u32) -> Self {
        Self { ceiling }
    }

    /// Maximum number of suffixed candidates probed.
    #[must_use]
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Runs the sibling pre-check, then the increment loop.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NameConflict`] if a sibling of the other kind has
    ///   the exact leaf name.
    /// - [`StorageError::ExhaustedNamespace`] if the ceiling is reached.
    /// - Any oracle failure.
    pub fn resolve<O: ExistenceOracle + ?Sized>(
        &self,
        desired: &PathKey,
        kind: EntryKind,
        oracle: &O,
    ) -> Result<PathKey> {
        Self::check_name_taken(desired, kind, oracle)?;
        self.next_free(desired, kind, oracle)
    }

    /// Lists the parent once and fails if a sibling of the other kind
    /// already uses the leaf name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NameConflict`] on a hit, or the oracle's error.
    pub fn check_name_taken<O: ExistenceOracle + ?Sized>(
        desired: &PathKey,
        kind: EntryKind,
        oracle: &O,
    ) -> Result<()> {
        let Some(dir) = desired.parent() else {
            return Ok(());
        };
        let siblings = oracle.sibling_names(&dir)?;
        if siblings.claimed_against(kind).contains(&desired.leaf_name()) {
            let check = match kind {
                EntryKind::File => Check::SiblingIsFolder,
                EntryKind::Folder => Check::SiblingIsFile,
            };
            return Err(StorageError::conflict(desired, check));
        }
        Ok(())
    }

    /// Returns `desired` if free, else the first free suffixed candidate.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ExhaustedNamespace`] past the ceiling, or the
    /// oracle's error.
    pub fn next_free<O: ExistenceOracle + ?Sized>(
        &self,
        desired: &PathKey,
        kind: EntryKind,
        oracle: &O,
    ) -> Result<PathKey> {
        if !oracle.exists(desired)? {
            return Ok(desired.clone());
        }
        for n in (FIRST_SUFFIX..).take(self.ceiling as usize) {
            let candidate = desired.with_suffix(n, kind);
            if !oracle.exists(&candidate)? {
                debug!(desired = %desired, resolved = %candidate, "name taken, using suffix {n}");
                return Ok(candidate);
            }
        }
        Err(StorageError::ExhaustedNamespace { path: desired.to_string(), attempts: self.ceiling })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use super::*;
    use crate::ports::SiblingNames;

    /// Oracle over a fixed set of taken paths, logging every probe.
    #[derive(Default)]
    struct FakeOracle {
        taken: BTreeSet<String>,
        siblings: SiblingNames,
        probes: Mutex<Vec<String>>,
        listings: Mutex<u32>,
    }

    impl FakeOracle {
        fn taking(paths: &[&str]) -> Self {
            Self { taken: paths.iter().map(ToString::to_string).collect(), ..Self::default() }
        }

        fn probes(&self) -> Vec<String> {
            self.probes.lock().unwrap().clone()
        }
    }

    impl ExistenceOracle for FakeOracle {
        fn exists(&self, path: &PathKey) -> Result<bool> {
            let path = path.to_string();
            let hit = self.taken.contains(&path);
            self.probes.lock().unwrap().push(path);
            Ok(hit)
        }

        fn sibling_names(&self, _dir: &PathKey) -> Result<SiblingNames> {
            *self.listings.lock().unwrap() += 1;
            Ok(self.siblings.clone())
        }
    }

    fn key(raw: &str) -> PathKey {
        PathKey::parse(raw).unwrap()
    }

    #[test]
    fn free_name_is_returned_unchanged() {
        let oracle = FakeOracle::default();
        let resolved =
            NameResolver::default().resolve(&key("folder/file.txt"), EntryKind::File, &oracle);
        assert_eq!(resolved.unwrap().to_string(), "folder/file.txt");
        assert_eq!(oracle.probes(), ["folder/file.txt"]);
    }

    #[test]
    fn taken_name_gets_first_free_suffix_in_ascending_order() {
        let oracle = FakeOracle::taking(&[
            "folder/file.txt",
            "folder/file 2.txt",
            "folder/file 3.txt",
            "folder/file 4.txt",
        ]);
        let resolved = NameResolver::default()
            .resolve(&key("folder/file.txt"), EntryKind::File, &oracle)
            .unwrap();
        assert_eq!(resolved.to_string(), "folder/file 5.txt");
        assert_eq!(
            oracle.probes(),
            [
                "folder/file.txt",
                "folder/file 2.txt",
                "folder/file 3.txt",
                "folder/file 4.txt",
                "folder/file 5.txt",
            ]
        );
    }

    #[test]
    fn folder_suffix_has_no_extension_handling() {
        let oracle = FakeOracle::taking(&["mock/pardir/folder"]);
        let resolved = NameResolver::default()
            .resolve(&key("mock/pardir/folder"), EntryKind::Folder, &oracle)
            .unwrap();
        assert_eq!(resolved.to_string(), "mock/pardir/folder 2");
    }

    #[test]
    fn sibling_of_other_kind_conflicts_even_when_name_is_free() {
        let mut oracle = FakeOracle::default();
        oracle.siblings.files.insert("three".into());
        oracle.siblings.files.insert("file1.txt".into());

        let err = NameResolver::default()
            .resolve(&key("s3://one/two/three"), EntryKind::Folder, &oracle)
            .unwrap_err();

        assert!(matches!(err, StorageError::NameConflict { check: Check::SiblingIsFile, .. }));
        assert!(oracle.probes().is_empty(), "pre-check must gate the oracle");
    }

    #[test]
    fn file_write_conflicts_with_same_named_folder() {
        let mut oracle = FakeOracle::default();
        oracle.siblings.folders.insert("file.txt".into());

        let err = NameResolver::default()
            .resolve(&key("folder/file.txt"), EntryKind::File, &oracle)
            .unwrap_err();
        assert_eq!(err.check(), Some(Check::SiblingIsFolder));
    }

    #[test]
    fn same_kind_sibling_goes_to_increment_loop() {
        let mut oracle = FakeOracle::taking(&["folder/file.txt"]);
        oracle.siblings.files.insert("file.txt".into());

        let resolved = NameResolver::default()
            .resolve(&key("folder/file.txt"), EntryKind::File, &oracle)
            .unwrap();
        assert_eq!(resolved.leaf_name(), "file 2.txt");
        assert_eq!(*oracle.listings.lock().unwrap(), 1);
    }

    #[test]
    fn ceiling_bounds_the_loop() {
        let oracle = FakeOracle::taking(&["a.txt", "a 2.txt", "a 3.txt", "a 4.txt"]);
        let err = NameResolver::new(3).resolve(&key("a.txt"), EntryKind::File, &oracle).unwrap_err();
        assert!(matches!(err, StorageError::ExhaustedNamespace { attempts: 3, .. }));
        assert_eq!(oracle.probes().len(), 4);
    }

    #[test]
    fn root_level_entry_skips_sibling_listing() {
        let oracle = FakeOracle::default();
        NameResolver::default().resolve(&key("s3://bucket"), EntryKind::Folder, &oracle).unwrap();
        assert_eq!(*oracle.listings.lock().unwrap(), 0);
    }
}
