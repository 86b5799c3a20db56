//! Command dispatch and handlers.

pub mod inspect;
pub mod modify;
pub mod resolve;
pub mod write;

use crate::cli::Command;
use crate::config::ManagerConfig;
use crate::manager::FileManager;

/// Dispatch a parsed command to its handler.
///
/// The manager is built from `.env`, the optional `FILEMAN_CONFIG` file and
/// `FILEMAN_*` variables.
///
/// # Errors
///
/// Returns an error string if configuration fails or the handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let config = ManagerConfig::from_env().map_err(|e| e.to_string())?;
    let manager = FileManager::from_config(&config).map_err(|e| e.to_string())?;
    dispatch_with_manager(command, &manager)
}

/// Dispatch a command against an existing manager.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_manager(command: &Command, manager: &FileManager) -> Result<(), String> {
    match command {
        Command::Write { path, from, new_folder } => {
            write::run_write(manager, path, from.as_deref(), *new_folder)
        }
        Command::Mkdir { path } => write::run_mkdir(manager, path),
        Command::Cp { source, dest_dir } => write::run_copy(manager, source, dest_dir),
        Command::Ls { path } => inspect::run_list(manager, path),
        Command::Exists { path } => inspect::run_exists(manager, path),
        Command::Cat { path } => inspect::run_cat(manager, path),
        Command::Rm { paths } => modify::run_remove(manager, paths),
        Command::Mv { path, new_name } => modify::run_rename(manager, path, new_name),
        Command::Resolve { path, folder, record, replay } => {
            resolve::run(manager, path, *folder, record.as_deref(), replay.as_deref())
        }
    }
}
