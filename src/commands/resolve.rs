//! `fileman resolve` command: dry-run name resolution.
//!
//! With `--record` every existence query is captured into a YAML cassette;
//! with `--replay` the queries are answered from one, so a recorded
//! resolution can be reproduced without access to the storage.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::adapters::{RecordingOracle, ReplayingOracle};
use crate::cassette::{Cassette, CassetteRecorder, CassetteReplayer};
use crate::manager::FileManager;
use crate::path::EntryKind;

/// Execute the `resolve` command and print the resolved path.
///
/// # Errors
///
/// Returns an error string if resolution fails or a cassette cannot be
/// read or written.
pub fn run(
    manager: &FileManager,
    path: &str,
    folder: bool,
    record: Option<&Path>,
    replay: Option<&Path>,
) -> Result<(), String> {
    let kind = if folder { EntryKind::Folder } else { EntryKind::File };
    let (key, adapter) = manager.locate(path).map_err(|e| e.to_string())?;
    let key = key.normalized();
    let resolver = adapter.resolver();

    let resolved = if let Some(cassette_path) = replay {
        let cassette = Cassette::load(cassette_path)?;
        let oracle = ReplayingOracle::new(CassetteReplayer::new(&cassette));
        let resolved = resolver.resolve(&key, kind, &oracle);
        if resolved.is_ok() && !oracle.is_drained() {
            warn!("{} has unused answers; storage changed since recording", cassette_path.display());
        }
        resolved
    } else if let Some(cassette_path) = record {
        let source = key.scheme().unwrap_or("local");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(cassette_path, "resolve", source)));
        let resolved = {
            let oracle = RecordingOracle::new(adapter.backend(), Arc::clone(&recorder));
            resolver.resolve(&key, kind, &oracle)
        };
        let recorder = Arc::try_unwrap(recorder)
            .map_err(|_| "Recording oracle still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        let written = recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))?;
        eprintln!("Recording saved to: {}", written.display());
        resolved
    } else {
        resolver.resolve(&key, kind, adapter.backend())
    };

    println!("{}", resolved.map_err(|e| e.to_string())?);
    Ok(())
}
