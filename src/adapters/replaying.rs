//! Replaying oracle that answers probes from a cassette.

use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;

use super::recording::ORACLE_PORT;
use crate::cassette::CassetteReplayer;
use crate::error::{Result, StorageError};
use crate::path::PathKey;
use crate::ports::{ExistenceOracle, SiblingNames};

/// Serves recorded oracle answers in order, never touching storage.
pub struct ReplayingOracle {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingOracle {
    /// Creates an oracle from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn next<T: DeserializeOwned>(&self, method: &str, path: &PathKey) -> Result<T> {
        let interaction = self
            .replayer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_interaction(ORACLE_PORT, method)
            .ok_or_else(|| StorageError::backend(path, format!("cassette has no {method} answer left")))?;

        if let Some(err) = interaction.output.get("err") {
            let message = err.as_str().unwrap_or("unknown error").to_string();
            return Err(StorageError::backend(path, message));
        }
        let value = interaction.output.get("ok").cloned().unwrap_or(interaction.output);
        serde_json::from_value(value).map_err(|err| StorageError::backend(path, err))
    }

    /// Returns `true` once every recorded answer has been served.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.replayer.lock().unwrap_or_else(PoisonError::into_inner).is_drained()
    }
}

impl ExistenceOracle for ReplayingOracle {
    fn exists(&self, path: &PathKey) -> Result<bool> {
        self.next("exists", path)
    }

    fn sibling_names(&self, dir: &PathKey) -> Result<SiblingNames> {
        self.next("sibling_names", dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn oracle(interactions: Vec<(&str, serde_json::Value)>) -> ReplayingOracle {
        let interactions = interactions
            .into_iter()
            .enumerate()
            .map(|(seq, (method, output))| Interaction {
                seq: seq as u64,
                port: ORACLE_PORT.into(),
                method: method.into(),
                input: json!({}),
                output,
            })
            .collect();
        let cassette =
            Cassette { name: "t".into(), recorded_at: Utc::now(), source: "local".into(), interactions };
        ReplayingOracle::new(CassetteReplayer::new(&cassette))
    }

    #[test]
    fn replays_answers() {
        let oracle = oracle(vec![
            ("exists", json!({"ok": true})),
            ("sibling_names", json!({"ok": {"files": ["three"], "folders": []}})),
        ]);
        let path = PathKey::parse("s3://one/two").unwrap();
        assert!(oracle.exists(&path).unwrap());
        assert!(!oracle.is_drained());
        assert!(oracle.sibling_names(&path).unwrap().files.contains("three"));
        assert!(oracle.is_drained());
    }

    #[test]
    fn exhausted_cassette_is_a_backend_failure() {
        let oracle = oracle(vec![]);
        let err = oracle.exists(&PathKey::parse("a.txt").unwrap()).unwrap_err();
        assert!(err.to_string().contains("no exists answer left"));
    }

    #[test]
    fn replays_errors_as_backend_failures() {
        let oracle = oracle(vec![("exists", json!({"err": "connection reset"}))]);
        let err = oracle.exists(&PathKey::parse("s3://one/two").unwrap()).unwrap_err();
        assert!(matches!(err, StorageError::BackendFailure { .. }));
        assert!(err.to_string().contains("connection reset"));
    }
}
