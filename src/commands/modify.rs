//! `fileman rm` and `mv` commands.

use crate::manager::FileManager;

/// Execute the `rm` command over every path independently.
///
/// Deleted paths are printed to stdout; the command fails if any path
/// could not be deleted.
///
/// # Errors
///
/// Returns an error string listing each failed path and its reason.
pub fn run_remove(manager: &FileManager, paths: &[String]) -> Result<(), String> {
    let report = manager.batch_delete(paths);
    for path in &report.deleted {
        println!("{path}");
    }
    if report.is_success() {
        return Ok(());
    }
    let failures: Vec<String> =
        report.failed.iter().map(|(path, err)| format!("failed to delete {path}: {err}")).collect();
    Err(failures.join("\n"))
}

/// Execute the `mv` command and print the new path.
///
/// # Errors
///
/// Returns an error string if the rename is rejected or fails.
pub fn run_rename(manager: &FileManager, path: &str, new_name: &str) -> Result<(), String> {
    let renamed = manager.rename(path, new_name).map_err(|e| e.to_string())?;
    println!("{renamed}");
    Ok(())
}
