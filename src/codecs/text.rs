use serde_json::Value;

use crate::error::BoxError;
use crate::ports::FileCodec;

/// Plain UTF-8 text, decoded to a JSON string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl FileCodec for TextCodec {
    fn name(&self) -> &str {
        "text"
    }

    fn extensions(&self) -> &[&str] {
        &["txt", "md", "log"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, BoxError> {
        Ok(Value::String(std::str::from_utf8(bytes)?.to_string()))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, BoxError> {
        match value {
            Value::String(text) => Ok(text.clone().into_bytes()),
            other => Ok(other.to_string().into_bytes()),
        }
    }
}
