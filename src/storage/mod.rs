//! Resolved corpus storage.
//!
//! Persistence of resolutions belongs to an external collaborator; the
//! engine only pushes through its match listener and the correlator only
//! reads. The trait keeps the correlator decoupled from any particular
//! backend; the in-memory implementation backs tests and the CLI.

use crate::models::{EditOperation, InferenceResult, OpaqueItem};
use serde::{Deserialize, Serialize};

/// One resolved line as the correlator consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// File the line was resolved in, as spelled by the feed.
    pub file_name: String,
    /// The recovered content.
    pub content: String,
    /// The recovered operation.
    pub operation: EditOperation,
    /// Resolution time, Unix milliseconds.
    pub timestamp: i64,
}

/// Read surface the diff correlator requires from the storage collaborator.
pub trait ResolvedCorpus {
    /// Resolved lines whose file matches `path` by path suffix, in either
    /// direction.
    fn lines_for_path(&self, path: &str) -> Vec<ResolvedLine>;

    /// Coarse last-modified stamp of the underlying storage, Unix
    /// milliseconds. Used to invalidate per-commit attribution caches.
    fn last_modified(&self) -> i64;
}

/// In-memory corpus of resolved lines.
///
/// Doubles as the reference backend: wire [`MemoryCorpus::record`] into the
/// engine's match listener and the correlator can read what the engine
/// resolved.
#[derive(Debug, Default)]
pub struct MemoryCorpus {
    lines: Vec<ResolvedLine>,
    last_modified: i64,
}

impl MemoryCorpus {
    /// Creates an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one resolution.
    pub fn record(&mut self, item: &OpaqueItem, result: &InferenceResult, now: i64) {
        self.lines.push(ResolvedLine {
            file_name: item.file_name.clone(),
            content: result.content.clone(),
            operation: result.operation,
            timestamp: if item.timestamp > 0 { item.timestamp } else { now },
        });
        self.last_modified = now;
    }

    /// Loads a corpus from already-materialized lines.
    #[must_use]
    pub fn from_lines(lines: Vec<ResolvedLine>, last_modified: i64) -> Self {
        Self {
            lines,
            last_modified,
        }
    }

    /// The resolved lines, in resolution order.
    #[must_use]
    pub fn to_lines(&self) -> &[ResolvedLine] {
        &self.lines
    }

    /// Number of resolved lines held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the corpus is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Returns true when one spelling is a path suffix of the other.
#[must_use]
pub fn path_suffix_match(a: &str, b: &str) -> bool {
    a == b || a.ends_with(b) || b.ends_with(a)
}

impl ResolvedCorpus for MemoryCorpus {
    fn lines_for_path(&self, path: &str) -> Vec<ResolvedLine> {
        self.lines
            .iter()
            .filter(|line| path_suffix_match(&line.file_name, path))
            .cloned()
            .collect()
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentSource, MatchOrigin};

    #[test]
    fn test_suffix_match_lookup() {
        let corpus = MemoryCorpus::from_lines(
            vec![ResolvedLine {
                file_name: "/work/project/src/main.ts".to_string(),
                content: "const x = 1;".to_string(),
                operation: EditOperation::Added,
                timestamp: 5,
            }],
            5,
        );
        assert_eq!(corpus.lines_for_path("src/main.ts").len(), 1);
        assert_eq!(corpus.lines_for_path("other.ts").len(), 0);
    }

    #[test]
    fn test_record_updates_stamp() {
        let mut corpus = MemoryCorpus::new();
        let item = OpaqueItem {
            hash: "0a1b2c3d".to_string(),
            file_name: "a.ts".to_string(),
            source: AgentSource::Tab,
            timestamp: 0,
        };
        let result = InferenceResult {
            hash: "0a1b2c3d".to_string(),
            content: "let x;".to_string(),
            operation: EditOperation::Added,
            line_number: Some(0),
            origin: MatchOrigin::FullLine,
        };
        corpus.record(&item, &result, 99);
        assert_eq!(corpus.last_modified(), 99);
        // Item timestamp 0 falls back to the recording time.
        assert_eq!(corpus.lines_for_path("a.ts")[0].timestamp, 99);
    }
}
