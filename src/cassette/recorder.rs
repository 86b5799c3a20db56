//! Records interactions into a cassette file.

use std::path::PathBuf;

use chrono::Utc;

use super::format::{Cassette, Interaction};

/// Collects interactions and writes them as a YAML cassette.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    source: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Creates a recorder that will write to `path`.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), source: source.into(), interactions: Vec::new() }
    }

    /// Appends an interaction; its `seq` is its position.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
    }

    /// Interactions recorded so far.
    #[must_use]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Writes the cassette and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            source: self.source,
            interactions: self.interactions,
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finish_writes_sequenced_cassette() {
        let dir = std::env::temp_dir().join(format!("filemanager_recorder_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("probe.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "probe", "local");
        recorder.record("oracle", "exists", json!({"path": "a.txt"}), json!({"ok": true}));
        recorder.record("oracle", "exists", json!({"path": "a 2.txt"}), json!({"ok": false}));
        assert_eq!(recorder.interactions().len(), 2);

        let written = recorder.finish().expect("finish should succeed");
        let cassette = Cassette::load(&written).unwrap();
        assert_eq!(cassette.source, "local");
        assert_eq!(cassette.interactions[1].seq, 1);
        assert_eq!(cassette.interactions[1].input, json!({"path": "a 2.txt"}));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
