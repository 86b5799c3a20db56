//! Storage adapter behavior against the real filesystem.

mod common;

use std::fs;

use common::Scratch;
use filemanager::adapters::LocalBackend;
use filemanager::storage::StorageAdapter;
use filemanager::{Check, PathKey, StorageError};

fn adapter() -> StorageAdapter {
    StorageAdapter::local(LocalBackend::default())
}

fn key(raw: &str) -> PathKey {
    PathKey::parse(raw).unwrap()
}

#[test]
fn repeated_writes_never_overwrite() {
    let dir = Scratch::new("writes");
    let adapter = adapter();
    let target = key(&dir.key("folder/file.txt"));

    let names: Vec<String> =
        ["one", "two", "three"].iter().map(|body| adapter.write_stream(&target, body.as_bytes()).unwrap()).collect();

    assert_eq!(names, ["file.txt", "file 2.txt", "file 3.txt"]);
    assert_eq!(fs::read_to_string(dir.path().join("folder/file.txt")).unwrap(), "one");
    assert_eq!(fs::read_to_string(dir.path().join("folder/file 3.txt")).unwrap(), "three");
}

#[test]
fn write_next_to_same_named_folder_conflicts() {
    let dir = Scratch::new("file_vs_folder");
    fs::create_dir_all(dir.path().join("folder/report.txt")).unwrap();

    let err = adapter().write_stream(&key(&dir.key("folder/report.txt")), &b"x"[..]).unwrap_err();

    assert!(matches!(err, StorageError::NameConflict { check: Check::SiblingIsFolder, .. }));
}

#[test]
fn create_folder_increments_and_creates_parents() {
    let dir = Scratch::new("folders");
    let adapter = adapter();

    assert_eq!(adapter.create_folder(&key(&dir.key("a/b/folder"))).unwrap(), "folder");
    assert_eq!(adapter.create_folder(&key(&dir.key("a/b/folder"))).unwrap(), "folder 2");
    assert!(dir.path().join("a/b/folder 2").is_dir());
}

#[test]
fn create_folder_over_sibling_file_conflicts_without_side_effects() {
    let dir = Scratch::new("folder_vs_file");
    fs::create_dir_all(dir.path().join("two")).unwrap();
    fs::write(dir.path().join("two/three"), b"x").unwrap();

    let err = adapter().create_folder(&key(&dir.key("two/three/four"))).unwrap_err();

    assert!(matches!(err, StorageError::NameConflict { check: Check::SiblingIsFile, .. }));
    assert!(dir.path().join("two/three").is_file());
}

#[test]
fn delete_checks_root_then_entry() {
    let dir = Scratch::new("delete");
    fs::create_dir_all(dir.path().join("folder")).unwrap();
    let adapter = adapter();

    let err = adapter.delete(&key(&dir.key("nodir/test.xlsx"))).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { check: Check::RootMissing, .. }));

    let err = adapter.delete(&key(&dir.key("folder/test.xlsx"))).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { check: Check::EntryMissing, .. }));

    fs::write(dir.path().join("folder/test.xlsx"), b"x").unwrap();
    adapter.delete(&key(&dir.key("folder/test.xlsx"))).unwrap();
    assert!(!dir.path().join("folder/test.xlsx").exists());
}

#[test]
fn delete_folder_removes_tree() {
    let dir = Scratch::new("delete_tree");
    fs::create_dir_all(dir.path().join("tree/sub")).unwrap();
    fs::write(dir.path().join("tree/sub/a.txt"), b"x").unwrap();

    adapter().delete(&key(&dir.key("tree/"))).unwrap();

    assert!(!dir.path().join("tree").exists());
}

#[test]
fn rename_keeps_extension() {
    let dir = Scratch::new("rename");
    fs::create_dir_all(dir.path().join("folder")).unwrap();
    fs::write(dir.path().join("folder/test.xlsx"), b"x").unwrap();

    let renamed = adapter().rename(&key(&dir.key("folder/test.xlsx")), "new_file").unwrap();

    assert_eq!(renamed.leaf_name(), "new_file.xlsx");
    assert!(dir.path().join("folder/new_file.xlsx").is_file());
    assert!(!dir.path().join("folder/test.xlsx").exists());
}

#[test]
fn rename_rejects_separators() {
    let dir = Scratch::new("rename_sep");
    fs::write(dir.path().join("a.txt"), b"x").unwrap();

    let err = adapter().rename(&key(&dir.key("a.txt")), "sub/b").unwrap_err();

    assert_eq!(err.check(), Some(Check::InvalidName));
}

#[test]
fn read_raw_rejects_directories() {
    let dir = Scratch::new("read_dir");
    fs::create_dir_all(dir.path().join("d")).unwrap();

    let err = adapter().read_raw(&key(&dir.key("d"))).unwrap_err();

    assert_eq!(err.check(), Some(Check::IsADirectory));
}

#[test]
fn listing_splits_files_and_folders() {
    let dir = Scratch::new("list");
    fs::create_dir_all(dir.path().join("dir1")).unwrap();
    fs::write(dir.path().join("file1.txt"), b"hello").unwrap();

    let listing = adapter().list(&key(&dir.key(""))).unwrap();

    assert_eq!(listing.folders, ["dir1"]);
    assert_eq!(listing.files["file1.txt"].size, 5);
}

#[test]
fn dot_aliases_of_the_base_directory_are_refused() {
    let dir = Scratch::new("dot_alias");
    fs::write(dir.path().join("keep.txt"), b"x").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let adapter = StorageAdapter::local(LocalBackend::new(dir.path()));

    for raw in ["./", ".", "../", "sub/..", "sub/../"] {
        let err = adapter.delete(&key(raw)).unwrap_err();
        assert!(matches!(err, StorageError::InvalidLocation { check: Check::InvalidName, .. }), "{raw}");
    }
    assert_eq!(adapter.create_folder(&key("./")).unwrap_err().check(), Some(Check::InvalidName));
    assert_eq!(adapter.rename(&key("./"), "moved").unwrap_err().check(), Some(Check::InvalidName));
    assert_eq!(adapter.write_stream(&key("../out.txt"), &b"x"[..]).unwrap_err().check(), Some(Check::InvalidName));

    assert!(dir.path().join("keep.txt").is_file());
    assert!(dir.path().join("sub").is_dir());
    assert!(!dir.path().parent().unwrap().join("out.txt").exists());
}
