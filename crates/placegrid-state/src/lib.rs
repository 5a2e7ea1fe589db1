//! placegrid-state — durable record of placements.
//!
//! Every successful placement is appended exactly once as a
//! [`PlacementRecord`](placegrid_core::PlacementRecord) and never rewritten.
//! At startup the full log is replayed to rebuild the node registry.
//!
//! # Backends
//!
//! - [`LogStore`] — one `;`-delimited line per record, `fsync`ed on append
//! - [`RedbStore`] — records as JSON values keyed by sequence number
//! - [`MemoryStore`] — volatile, for tests
//!
//! All of them sit behind the [`StateStore`] trait so the placement engine
//! never depends on the storage format.

pub mod error;
pub mod log_store;
pub mod redb_store;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use log_store::LogStore;
pub use redb_store::RedbStore;
pub use store::{MemoryStore, RecordIter, StateStore, open_store};
