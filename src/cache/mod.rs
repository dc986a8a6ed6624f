//! Bounded in-memory stores for observed edit evidence.
//!
//! Two stores back the inference path: per-file line records (the candidate
//! pool opaque hashes are tried against) and per-file document snapshots
//! (the only way to recover text a deletion removed from the live buffer).

mod records;
mod snapshots;

pub use records::{CacheStats, LineRecordCache, file_names_related};
pub use snapshots::SnapshotStore;
