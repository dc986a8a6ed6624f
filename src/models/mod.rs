//! Data models for linetrace.
//!
//! This module contains all the core data structures used throughout the system.

mod commit;
mod event;
mod item;
mod record;

pub use commit::{CommitAttribution, CommitDiff, DiffLine, FileAttribution, FileDiff};
pub use event::{DocumentSnapshot, EditEvent, EditRange};
pub use item::{AgentSource, InferenceResult, MatchOrigin, OpaqueItem, RawItemMetadata, RawOpaqueItem};
pub use record::{EditOperation, LineRecord, RecordOrigin};
