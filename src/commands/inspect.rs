//! Read-only commands: `ls`, `exists` and `cat`.

use std::io::Write;

use crate::manager::FileManager;

/// Execute the `ls` command, printing the listing as pretty JSON.
///
/// # Errors
///
/// Returns an error string if the path is not a listable directory.
pub fn run_list(manager: &FileManager, path: &str) -> Result<(), String> {
    let listing = manager.list(path).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&listing).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// Execute the `exists` command.
///
/// # Errors
///
/// Returns an error string if the path does not exist or the probe fails.
pub fn run_exists(manager: &FileManager, path: &str) -> Result<(), String> {
    if manager.exists(path).map_err(|e| e.to_string())? {
        println!("{path}");
        Ok(())
    } else {
        Err(format!("{path} does not exist"))
    }
}

/// Execute the `cat` command, copying the raw bytes to stdout.
///
/// # Errors
///
/// Returns an error string if the file cannot be read.
pub fn run_cat(manager: &FileManager, path: &str) -> Result<(), String> {
    let bytes = manager.read_raw(path).map_err(|e| e.to_string())?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes).and_then(|()| stdout.flush()).map_err(|e| e.to_string())
}
