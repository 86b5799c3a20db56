//! Port traits defining external boundaries.
//!
//! Each trait is a seam between the naming core and something outside it:
//! the existence probe, the backend client and the file codecs.
//! Implementations live in `src/adapters/` and `src/codecs/`.

pub mod backend;
pub mod codec;
pub mod oracle;

pub use backend::{CreateOutcome, EntryInfo, Listing, StorageBackend};
pub use codec::FileCodec;
pub use oracle::{ExistenceOracle, SiblingNames};
