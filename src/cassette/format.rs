//! Cassette data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded call on a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number, assigned by the recorder.
    pub seq: u64,
    /// Port name (`oracle`).
    pub port: String,
    /// Method invoked on the port (`exists`, `sibling_names`).
    pub method: String,
    /// Arguments, usually `{"path": ...}`.
    pub input: serde_json::Value,
    /// `{"ok": value}` or `{"err": message}`.
    pub output: serde_json::Value,
}

/// An ordered recording of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Backend the interactions were captured from (`local`, `s3://bucket`).
    pub source: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Loads a cassette from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error string if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yaml_keeps_interaction_order() {
        let cassette = Cassette {
            name: "probe".into(),
            recorded_at: Utc::now(),
            source: "local".into(),
            interactions: vec![
                Interaction {
                    seq: 0,
                    port: "oracle".into(),
                    method: "sibling_names".into(),
                    input: json!({"path": "folder"}),
                    output: json!({"ok": {"files": ["file.txt"], "folders": []}}),
                },
                Interaction {
                    seq: 1,
                    port: "oracle".into(),
                    method: "exists".into(),
                    input: json!({"path": "folder/file.txt"}),
                    output: json!({"ok": true}),
                },
            ],
        };
        let yaml = serde_yaml::to_string(&cassette).expect("serialize");
        let parsed: Cassette = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(parsed, cassette);
    }
}
