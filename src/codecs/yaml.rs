use serde_json::Value;

use crate::error::BoxError;
use crate::ports::FileCodec;

/// YAML documents, exchanged as JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl FileCodec for YamlCodec {
    fn name(&self) -> &str {
        "yaml"
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, BoxError> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, BoxError> {
        Ok(serde_yaml::to_string(value)?.into_bytes())
    }
}
