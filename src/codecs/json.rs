use serde_json::Value;

use crate::error::BoxError;
use crate::ports::FileCodec;

/// JSON documents, pretty-printed on write.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl FileCodec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, BoxError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, BoxError> {
        let mut bytes = serde_json::to_vec_pretty(value)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
