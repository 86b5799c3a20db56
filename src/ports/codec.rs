//! File codec port resolved by extension through the registry.

use serde_json::Value;

use crate::error::BoxError;

/// Converts between raw file bytes and a structured value.
pub trait FileCodec: Send + Sync {
    /// Stable codec name, used to detect conflicting registrations.
    fn name(&self) -> &str;

    /// Extensions (without the dot) this codec handles.
    fn extensions(&self) -> &[&str];

    /// Decodes file bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not valid for this format.
    fn decode(&self, bytes: &[u8]) -> Result<Value, BoxError>;

    /// Encodes a value into file bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in this format.
    fn encode(&self, value: &Value) -> Result<Vec<u8>, BoxError>;
}
