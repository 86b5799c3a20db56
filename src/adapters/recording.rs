//! Recording oracle that captures every probe into a cassette.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::json;

use crate::cassette::CassetteRecorder;
use crate::error::Result;
use crate::path::PathKey;
use crate::ports::{ExistenceOracle, SiblingNames};

/// Port name used for oracle interactions.
pub const ORACLE_PORT: &str = "oracle";

/// Delegates to an inner oracle and records each call and its answer.
pub struct RecordingOracle<'a, O: ?Sized> {
    inner: &'a O,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl<'a, O: ExistenceOracle + ?Sized> RecordingOracle<'a, O> {
    /// Wraps `inner`, appending to `recorder`.
    pub fn new(inner: &'a O, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record<T: Serialize>(&self, method: &str, path: &PathKey, result: &Result<T>) {
        let output = match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(value) => json!({ "ok": value }),
                Err(err) => json!({ "err": format!("unserializable answer: {err}") }),
            },
            Err(err) => json!({ "err": err.to_string() }),
        };
        let mut recorder = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        recorder.record(ORACLE_PORT, method, json!({ "path": path.to_string() }), output);
    }
}

impl<O: ExistenceOracle + ?Sized> ExistenceOracle for RecordingOracle<'_, O> {
    fn exists(&self, path: &PathKey) -> Result<bool> {
        let result = self.inner.exists(path);
        self.record("exists", path, &result);
        result
    }

    fn sibling_names(&self, dir: &PathKey) -> Result<SiblingNames> {
        let result = self.inner.sibling_names(dir);
        self.record("sibling_names", dir, &result);
        result
    }
}
