//! Integration tests for the `fileman` binary.

mod common;

use std::process::{Command, Output};

use common::Scratch;

fn run_fileman(dir: &Scratch, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_fileman");
    Command::new(bin)
        .args(args)
        .current_dir(dir.path())
        .env("FILEMAN_LOCAL_ROOT", dir.path())
        .env_remove("FILEMAN_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run fileman binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn write_prints_resolved_names() {
    let dir = Scratch::new("cli_write");
    std::fs::write(dir.path().join("source.txt"), b"hello").unwrap();

    let first = run_fileman(&dir, &["write", "docs/file.txt", "--from", "source.txt"]);
    let second = run_fileman(&dir, &["write", "docs/file.txt", "--from", "source.txt"]);

    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert_eq!(stdout(&first), "file.txt");
    assert_eq!(stdout(&second), "file 2.txt");
    assert_eq!(std::fs::read_to_string(dir.path().join("docs/file 2.txt")).unwrap(), "hello");
}

#[test]
fn ls_prints_json_listing() {
    let dir = Scratch::new("cli_ls");
    std::fs::create_dir(dir.path().join("dir1")).unwrap();
    std::fs::write(dir.path().join("file1.txt"), b"abc").unwrap();

    let output = run_fileman(&dir, &["ls", "./"]);

    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(listing["folders"], serde_json::json!(["dir1"]));
    assert_eq!(listing["files"]["file1.txt"]["size"], 3);
}

#[test]
fn exists_reflects_presence_in_exit_code() {
    let dir = Scratch::new("cli_exists");
    std::fs::write(dir.path().join("here.txt"), b"x").unwrap();

    assert!(run_fileman(&dir, &["exists", "here.txt"]).status.success());
    let missing = run_fileman(&dir, &["exists", "gone.txt"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("does not exist"));
}

#[test]
fn rm_reports_partial_failure() {
    let dir = Scratch::new("cli_rm");
    std::fs::write(dir.path().join("a.txt"), b"x").unwrap();

    let output = run_fileman(&dir, &["rm", "a.txt", "missing.txt"]);

    assert!(!output.status.success());
    assert_eq!(stdout(&output), "a.txt");
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to delete missing.txt"));
    assert!(!dir.path().join("a.txt").exists());
}

#[test]
fn mv_keeps_extension() {
    let dir = Scratch::new("cli_mv");
    std::fs::create_dir(dir.path().join("folder")).unwrap();
    std::fs::write(dir.path().join("folder/test.xlsx"), b"x").unwrap();

    let output = run_fileman(&dir, &["mv", "folder/test.xlsx", "new_file"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "folder/new_file.xlsx");
}

#[test]
fn mkdir_conflicts_with_existing_file() {
    let dir = Scratch::new("cli_mkdir");
    std::fs::write(dir.path().join("three"), b"x").unwrap();

    let output = run_fileman(&dir, &["mkdir", "three/four"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("name conflict"));
}

#[test]
fn resolve_records_and_replays() {
    let dir = Scratch::new("cli_resolve");
    std::fs::write(dir.path().join("a.txt"), b"x").unwrap();

    let recorded = run_fileman(&dir, &["resolve", "a.txt", "--record", "probe.yaml"]);
    assert!(recorded.status.success(), "{}", String::from_utf8_lossy(&recorded.stderr));
    assert_eq!(stdout(&recorded), "a 2.txt");
    assert!(!dir.path().join("a 2.txt").exists());

    std::fs::remove_file(dir.path().join("a.txt")).unwrap();
    let replayed = run_fileman(&dir, &["resolve", "a.txt", "--replay", "probe.yaml"]);
    assert_eq!(stdout(&replayed), "a 2.txt");
}

#[test]
fn unknown_scheme_fails() {
    let dir = Scratch::new("cli_scheme");

    let output = run_fileman(&dir, &["cat", "gs://bucket/key.txt"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported scheme"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let dir = Scratch::new("cli_invalid");

    let output = run_fileman(&dir, &["nonsense"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unrecognized subcommand"));
}
