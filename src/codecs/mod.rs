//! Built-in [`FileCodec`](crate::ports::FileCodec) implementations.

mod json;
mod text;
mod yaml;

pub use json::JsonCodec;
pub use text::TextCodec;
pub use yaml::YamlCodec;
