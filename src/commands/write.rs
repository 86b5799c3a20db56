//! `fileman write`, `mkdir` and `cp` commands.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::manager::FileManager;

/// Execute the `write` command, reading content from `from` or stdin.
///
/// Prints the file name actually used, or the full path with `new_folder`.
///
/// # Errors
///
/// Returns an error string if the source cannot be opened or the write fails.
pub fn run_write(
    manager: &FileManager,
    path: &str,
    from: Option<&Path>,
    new_folder: bool,
) -> Result<(), String> {
    let source: Box<dyn Read> = match from {
        Some(source) => Box::new(
            File::open(source).map_err(|e| format!("Failed to open {}: {e}", source.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let name = if new_folder {
        manager.write_stream_into_new_folder(path, source)
    } else {
        manager.write_stream(path, source)
    }
    .map_err(|e| e.to_string())?;
    println!("{name}");
    Ok(())
}

/// Execute the `mkdir` command and print the folder name used.
///
/// # Errors
///
/// Returns an error string if the folder cannot be created.
pub fn run_mkdir(manager: &FileManager, path: &str) -> Result<(), String> {
    let name = manager.create_folder(path).map_err(|e| e.to_string())?;
    println!("{name}");
    Ok(())
}

/// Execute the `cp` command and print the file name used at the destination.
///
/// # Errors
///
/// Returns an error string if the source cannot be read or the copy fails.
pub fn run_copy(manager: &FileManager, source: &str, dest_dir: &str) -> Result<(), String> {
    let name = manager.copy_into(source, dest_dir).map_err(|e| e.to_string())?;
    println!("{name}");
    Ok(())
}
