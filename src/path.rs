//! Storage-agnostic path keys.
//!
//! A [`PathKey`] splits a storage path string into its root, directory
//! segments, base name and extension. Remote paths look like
//! `scheme://bucket/seg/.../name.ext`; local paths use native separators.
//! Every key renders back to exactly the string it was parsed from.

use std::fmt;

use crate::error::{Check, Result, StorageError};

/// Kind of entry a path is expected to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file or object.
    File,
    /// A directory or object prefix.
    Folder,
}

/// A parsed storage location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey {
    scheme: Option<String>,
    root: String,
    /// Whether a separator sits between `root` and the first segment.
    /// Local roots (`/`, `C:\`) already include their separator.
    root_separator: bool,
    segments: Vec<String>,
    base_name: String,
    extension: String,
    separator: char,
}

impl PathKey {
    /// Parses a storage path string.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidLocation`] for an empty string.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(StorageError::invalid(raw, Check::EmptyPath));
        }
        if let Some((scheme, rest)) = raw.split_once("://") {
            if is_scheme(scheme) {
                let (root, body, root_separator) = match rest.split_once('/') {
                    Some((root, body)) => (root, body, true),
                    None => (rest, "", false),
                };
                return Ok(Self::assemble(Some(scheme), root, root_separator, body, '/'));
            }
        }

        let separator = if raw.contains('\\') && !raw.contains('/') { '\\' } else { '/' };
        let (root, body) = split_local_root(raw, separator);
        Ok(Self::assemble(None, root, false, body, separator))
    }

    fn assemble(
        scheme: Option<&str>,
        root: &str,
        root_separator: bool,
        body: &str,
        separator: char,
    ) -> Self {
        let mut segments: Vec<String> = body.split(separator).map(str::to_string).collect();
        let leaf = segments.pop().unwrap_or_default();
        let (base_name, extension) = split_extension(&leaf);
        Self {
            scheme: scheme.map(str::to_string),
            root: root.to_string(),
            root_separator,
            segments,
            base_name: base_name.to_string(),
            extension: extension.to_string(),
            separator,
        }
    }

    /// URL scheme for remote paths (`s3`), `None` for local paths.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Bucket for remote paths; filesystem root or drive for local paths
    /// (empty for relative paths).
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Directory segments between the root and the leaf.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Leaf name without its extension.
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Extension including its leading dot, or empty.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Leaf name: base name plus extension.
    #[must_use]
    pub fn leaf_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }

    /// Returns `true` for `scheme://` paths.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.scheme.is_some()
    }

    /// Returns `true` when the key names the root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.iter().all(String::is_empty) && self.leaf_name().is_empty()
    }

    /// Returns `true` when the key leans on `.` or `..` to name its entry:
    /// a leaf of `.` or `..`, or any `..` segment. Such a key aliases an
    /// existing directory instead of naming an entry of its own.
    #[must_use]
    pub fn has_dot_component(&self) -> bool {
        let leaf = self.normalized().leaf_name();
        leaf == "." || leaf == ".." || self.segments.iter().any(|segment| segment == "..")
    }

    /// The root itself (bucket, filesystem root or working directory).
    #[must_use]
    pub fn root_key(&self) -> Self {
        let mut key = self.clone();
        key.segments.clear();
        key.set_leaf("");
        key
    }

    /// Object key relative to the root: non-empty segments and the leaf
    /// joined with `/`.
    #[must_use]
    pub fn object_key(&self) -> String {
        let leaf = self.leaf_name();
        self.segments
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(leaf.as_str()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Drops trailing separators so the last named segment becomes the leaf.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut key = self.clone();
        while key.leaf_name().is_empty() {
            match key.segments.pop() {
                Some(last) => key.set_leaf(&last),
                None => break,
            }
        }
        key
    }

    /// The directory containing this entry, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let key = self.normalized();
        if key.is_root() {
            return None;
        }
        let mut parent = key;
        match parent.segments.pop() {
            Some(last) => parent.set_leaf(&last),
            None => parent.set_leaf(""),
        }
        Some(parent)
    }

    /// Every ancestor directory from the outermost down to the parent.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(dir) = current {
            if dir.is_root() {
                break;
            }
            current = dir.parent();
            chain.push(dir);
        }
        chain.reverse();
        chain
    }

    /// A child entry named `name` inside this directory.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let mut child = self.normalized();
        let leaf = child.leaf_name();
        if !leaf.is_empty() {
            child.segments.push(leaf);
        }
        if child.scheme.is_some() {
            child.root_separator = true;
        }
        child.set_leaf(name);
        child
    }

    /// The same directory with a different leaf.
    #[must_use]
    pub fn with_leaf(&self, leaf: &str) -> Self {
        let mut key = self.clone();
        key.set_leaf(leaf);
        key
    }

    /// The same directory and extension with a different base name.
    #[must_use]
    pub fn with_base_name(&self, base_name: &str) -> Self {
        let mut key = self.clone();
        key.base_name = base_name.to_string();
        key
    }

    /// Candidate name carrying the numeric suffix `n`.
    ///
    /// Files keep their extension (`file.txt` -> `file 2.txt`); folders
    /// treat the whole leaf as the base (`v1.2` -> `v1.2 2`).
    #[must_use]
    pub fn with_suffix(&self, n: u32, kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => self.with_base_name(&format!("{} {n}", self.base_name)),
            EntryKind::Folder => {
                let mut key = self.clone();
                key.base_name = format!("{} {n}", self.leaf_name());
                key.extension.clear();
                key
            }
        }
    }

    fn set_leaf(&mut self, leaf: &str) {
        let (base_name, extension) = split_extension(leaf);
        self.base_name = base_name.to_string();
        self.extension = extension.to_string();
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
        }
        f.write_str(&self.root)?;
        if self.root_separator {
            write!(f, "{}", self.separator)?;
        }
        for segment in &self.segments {
            write!(f, "{segment}{}", self.separator)?;
        }
        write!(f, "{}{}", self.base_name, self.extension)
    }
}

impl std::str::FromStr for PathKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn split_local_root(raw: &str, separator: char) -> (&str, &str) {
    if raw.starts_with(separator) {
        return raw.split_at(separator.len_utf8());
    }
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let end = if raw[2..].starts_with(separator) { 3 } else { 2 };
        return raw.split_at(end);
    }
    ("", raw)
}

/// Splits on the last `.`, ignoring leading dots so `.env` has no extension.
fn split_extension(leaf: &str) -> (&str, &str) {
    let stem_start = leaf.len() - leaf.trim_start_matches('.').len();
    match leaf[stem_start..].rfind('.') {
        Some(index) => leaf.split_at(stem_start + index),
        None => (leaf, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remote_path() {
        let key = PathKey::parse("s3://one/two/three.csv").unwrap();
        assert_eq!(key.scheme(), Some("s3"));
        assert_eq!(key.root(), "one");
        assert_eq!(key.segments(), ["two"]);
        assert_eq!(key.base_name(), "three");
        assert_eq!(key.extension(), ".csv");
        assert_eq!(key.object_key(), "two/three.csv");
    }

    #[test]
    fn parses_local_paths() {
        let absolute = PathKey::parse("/mock/folder/test.xlsx").unwrap();
        assert_eq!(absolute.root(), "/");
        assert_eq!(absolute.segments(), ["mock", "folder"]);
        assert_eq!(absolute.leaf_name(), "test.xlsx");

        let relative = PathKey::parse("mock/folder/path").unwrap();
        assert_eq!(relative.root(), "");
        assert_eq!(relative.extension(), "");

        let drive = PathKey::parse("C:\\data\\report.txt").unwrap();
        assert_eq!(drive.root(), "C:\\");
        assert_eq!(drive.segments(), ["data"]);
        assert_eq!(drive.base_name(), "report");
    }

    #[test]
    fn round_trips_exactly() {
        let samples = [
            "s3://one/two/three",
            "s3://bucket",
            "s3://bucket/",
            "s3://bucket/dir/",
            "s3://bucket/a//b.tar.gz",
            "/",
            "/tmp/file.txt",
            "relative/dir/",
            "file",
            ".env",
            "name.",
            "C:\\Users\\me\\notes.md",
            "D:",
            "gs://b/x y/z (1).json",
        ];
        for raw in samples {
            let key = PathKey::parse(raw).unwrap();
            assert_eq!(key.to_string(), raw, "round trip of {raw:?}");
        }
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = PathKey::parse("").unwrap_err();
        assert_eq!(err.check(), Some(Check::EmptyPath));
    }

    #[test]
    fn extension_uses_last_dot_and_skips_leading_dots() {
        let key = PathKey::parse("archive.tar.gz").unwrap();
        assert_eq!((key.base_name(), key.extension()), ("archive.tar", ".gz"));

        let hidden = PathKey::parse("dir/.bashrc").unwrap();
        assert_eq!((hidden.base_name(), hidden.extension()), (".bashrc", ""));
    }

    #[test]
    fn parent_drops_last_segment() {
        let key = PathKey::parse("s3://one/two/three/four").unwrap();
        let parent = key.parent().unwrap();
        assert_eq!(parent.to_string(), "s3://one/two/three");
        assert_eq!(parent.leaf_name(), "three");

        let top = PathKey::parse("s3://one/file.txt").unwrap().parent().unwrap();
        assert!(top.is_root());
        assert_eq!(top.to_string(), "s3://one/");
        assert!(top.parent().is_none());
    }

    #[test]
    fn parent_of_trailing_separator_path() {
        let key = PathKey::parse("mock/pardir/folder/").unwrap();
        assert_eq!(key.parent().unwrap().to_string(), "mock/pardir");
    }

    #[test]
    fn ancestors_run_outermost_first() {
        let key = PathKey::parse("s3://b/two/three/four/file.txt").unwrap();
        let names: Vec<String> = key.ancestors().iter().map(ToString::to_string).collect();
        assert_eq!(names, ["s3://b/two", "s3://b/two/three", "s3://b/two/three/four"]);
        assert!(PathKey::parse("s3://b/file.txt").unwrap().ancestors().is_empty());
    }

    #[test]
    fn dot_components_are_detected() {
        assert!(PathKey::parse("./").unwrap().has_dot_component());
        assert!(PathKey::parse("..").unwrap().has_dot_component());
        assert!(PathKey::parse("a/../b.txt").unwrap().has_dot_component());
        assert!(PathKey::parse("s3://b/x/./").unwrap().has_dot_component());
        assert!(!PathKey::parse("./a.txt").unwrap().has_dot_component());
        assert!(!PathKey::parse("dir/.env").unwrap().has_dot_component());
        assert!(!PathKey::parse("s3://b/..hidden").unwrap().has_dot_component());
    }

    #[test]
    fn root_key_drops_segments_and_leaf() {
        let root = PathKey::parse("s3://one/two/file.txt").unwrap().root_key();
        assert!(root.is_root());
        assert_eq!(root.root(), "one");
        assert!(PathKey::parse("/tmp/a.txt").unwrap().root_key().is_root());
    }

    #[test]
    fn join_adds_child() {
        let bucket = PathKey::parse("s3://b").unwrap();
        assert_eq!(bucket.join("a.txt").to_string(), "s3://b/a.txt");

        let dir = PathKey::parse("/tmp/out/").unwrap();
        assert_eq!(dir.join("x.bin").to_string(), "/tmp/out/x.bin");
    }

    #[test]
    fn suffix_keeps_file_extension() {
        let key = PathKey::parse("mock/path/folder/file.txt").unwrap();
        assert_eq!(key.with_suffix(2, EntryKind::File).to_string(), "mock/path/folder/file 2.txt");
    }

    #[test]
    fn suffix_treats_folder_leaf_as_base() {
        let key = PathKey::parse("mock/pardir/v1.2").unwrap();
        assert_eq!(key.with_suffix(3, EntryKind::Folder).to_string(), "mock/pardir/v1.2 3");
    }

    #[test]
    fn with_base_name_preserves_directory_and_extension() {
        let key = PathKey::parse("mock/folder/test.xlsx").unwrap();
        assert_eq!(key.with_base_name("new_file").to_string(), "mock/folder/new_file.xlsx");
    }
}
