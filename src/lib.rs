//! # Linetrace
//!
//! Attributes edited source lines to an AI coding agent.
//!
//! An external agent-tracking feed emits opaque `(hash, file, source, time)`
//! tuples — a one-way 32-bit hash of the edited content, never the content
//! itself. Linetrace records the actual edit history of open documents and
//! recovers the content behind each hash: directly from observed line
//! records, from snapshots of text removed by deletions, or by
//! reconstructing transient in-progress typing states that were never
//! persisted. The same content-equality technique is replayed against
//! commit diffs to attribute commit-level statistics.
//!
//! ## Features
//!
//! - Bit-exact reimplementation of the tracker's 32-bit content hash
//! - Bounded per-file candidate caches with at-most-once consumption
//! - Prefix-growth and paired-symbol recovery of partial edit states
//! - Commit diff attribution under a 7-day causality window
//!
//! ## Example
//!
//! ```rust,ignore
//! use linetrace::{InferenceEngine, TraceConfig};
//!
//! let mut engine = InferenceEngine::new(TraceConfig::default());
//! engine.observe_edit(&event, &current_lines);
//! let results = engine.resolve_batch(&items, now);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cache;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod engine;
pub mod git;
pub mod hash;
pub mod ingest;
pub mod models;
pub mod observability;
pub mod storage;

// Re-exports for convenience
pub use cache::{LineRecordCache, SnapshotStore};
pub use config::TraceConfig;
pub use correlate::DiffCorrelator;
pub use engine::{InferenceEngine, PartialEditSolver};
pub use hash::CodeHasher;
pub use models::{
    AgentSource, CommitAttribution, CommitDiff, EditEvent, EditOperation, EditRange, FileDiff,
    InferenceResult, LineRecord, MatchOrigin, OpaqueItem,
};
pub use storage::{MemoryCorpus, ResolvedCorpus, ResolvedLine};

/// Error type for linetrace operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A feed batch cannot be deserialized at all
    /// - A revision string does not name a commit
    /// - A config file contains malformed TOML
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur while loading config or replay input
    /// - Git operations fail (missing repository, unreadable object)
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for linetrace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Centralized so every component stamps records and snapshots the same way.
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
