//! Adapters implementing the ports.
//!
//! `local` and `remote` are the two storage backends; `recording` and
//! `replaying` wrap an existence oracle for capture and offline replay.

pub mod local;
pub mod recording;
pub mod remote;
pub mod replaying;

pub use local::LocalBackend;
pub use recording::RecordingOracle;
pub use remote::{RemoteBackend, S3Settings};
pub use replaying::ReplayingOracle;
