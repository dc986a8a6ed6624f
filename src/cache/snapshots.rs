//! Per-file document snapshot history.

use crate::models::{DocumentSnapshot, EditRange};
use std::collections::{HashMap, VecDeque};
use tracing::trace;

/// Bounded per-file history of full line arrays.
///
/// An edit notification exposes only the post-edit state, so the text a
/// deletion removed is unrecoverable unless the document was snapshotted
/// before the edit landed. Snapshots are captured eagerly on document open
/// and refreshed after every edit; reconstruction looks up the snapshot at
/// or immediately before the edit's prior version.
pub struct SnapshotStore {
    snapshots: HashMap<String, VecDeque<DocumentSnapshot>>,
    version_cap: usize,
    retention_ms: i64,
}

impl SnapshotStore {
    /// Creates a store retaining at most `version_cap` versions and
    /// `retention_ms` of age per file.
    #[must_use]
    pub fn new(version_cap: usize, retention_ms: i64) -> Self {
        Self {
            snapshots: HashMap::new(),
            version_cap: version_cap.max(1),
            retention_ms,
        }
    }

    /// Stores the full line array of `file_name` at `version`.
    ///
    /// Re-capturing an already stored version replaces it in place.
    pub fn capture(&mut self, file_name: &str, version: i32, lines: Vec<String>, now: i64) {
        let history = self.snapshots.entry(file_name.to_string()).or_default();
        if let Some(last) = history.back_mut()
            && last.version == version
        {
            *last = DocumentSnapshot::new(version, now, lines);
            return;
        }
        history.push_back(DocumentSnapshot::new(version, now, lines));
        while history.len() > self.version_cap {
            history.pop_front();
        }
        trace!(file = %file_name, version, "snapshot captured");
    }

    /// Extracts the text the current edit removed, from the snapshot at or
    /// immediately before `prior_version`.
    ///
    /// Single-line ranges yield a substring; multi-line ranges yield a
    /// concatenation preserving interior line boundaries. Returns `None`
    /// when no suitable snapshot exists — the caller substitutes an opaque
    /// placeholder and accepts the loss.
    #[must_use]
    pub fn removed_span(
        &self,
        file_name: &str,
        range: &EditRange,
        prior_version: i32,
    ) -> Option<String> {
        let history = self.snapshots.get(file_name)?;
        let snapshot = history
            .iter()
            .rev()
            .find(|s| s.version <= prior_version)?;

        let start_line = range.start_line as usize;
        let end_line = range.end_line as usize;
        let first = snapshot.lines.get(start_line)?;

        if !range.is_multi_line() {
            return Some(utf16_slice(
                first,
                range.start_char as usize,
                range.end_char as usize,
            ));
        }

        let mut parts =
            vec![utf16_slice(first, range.start_char as usize, usize::MAX)];
        for line in snapshot
            .lines
            .iter()
            .take(end_line.min(snapshot.lines.len()))
            .skip(start_line + 1)
        {
            parts.push(line.clone());
        }
        if let Some(last) = snapshot.lines.get(end_line) {
            parts.push(utf16_slice(last, 0, range.end_char as usize));
        }
        Some(parts.join("\n"))
    }

    /// The line array most recently captured for `file_name`.
    #[must_use]
    pub fn latest(&self, file_name: &str) -> Option<&DocumentSnapshot> {
        self.snapshots.get(file_name)?.back()
    }

    /// Drops snapshots older than the retention window, always keeping the
    /// newest one per file: it is the baseline the next deletion diffs
    /// against.
    pub fn prune(&mut self, now: i64) {
        for history in self.snapshots.values_mut() {
            while history.len() > 1 {
                let expired = history
                    .front()
                    .is_some_and(|s| now - s.timestamp > self.retention_ms);
                if !expired {
                    break;
                }
                history.pop_front();
            }
        }
    }

    /// Number of snapshots currently held across all files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.values().map(VecDeque::len).sum()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Substring by UTF-16 code unit offsets, matching editor coordinates.
fn utf16_slice(line: &str, start: usize, end: usize) -> String {
    let units: Vec<u16> = line.encode_utf16().collect();
    let start = start.min(units.len());
    let end = end.min(units.len());
    if start >= end {
        return String::new();
    }
    String::from_utf16_lossy(&units[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_single_line_substring() {
        let mut store = SnapshotStore::new(5, 60_000);
        store.capture("a.ts", 1, lines(&["const value = compute();"]), 0);

        let range = EditRange {
            start_line: 0,
            start_char: 6,
            end_line: 0,
            end_char: 11,
        };
        assert_eq!(store.removed_span("a.ts", &range, 1).unwrap(), "value");
    }

    #[test]
    fn test_multi_line_span_preserves_boundaries() {
        let mut store = SnapshotStore::new(5, 60_000);
        store.capture("a.ts", 3, lines(&["a", "b", "c", "d"]), 0);

        // A whole-line deletion of lines 0-2 as the editor reports it:
        // from the start of line 0 to the start of line 3.
        let range = EditRange {
            start_line: 0,
            start_char: 0,
            end_line: 3,
            end_char: 0,
        };
        assert_eq!(store.removed_span("a.ts", &range, 3).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_lookup_uses_version_at_or_before() {
        let mut store = SnapshotStore::new(5, 60_000);
        store.capture("a.ts", 1, lines(&["one"]), 0);
        store.capture("a.ts", 4, lines(&["four"]), 1);

        let range = EditRange {
            start_line: 0,
            start_char: 0,
            end_line: 0,
            end_char: 3,
        };
        // prior_version 3 resolves to the snapshot at version 1.
        assert_eq!(store.removed_span("a.ts", &range, 3).unwrap(), "one");
        assert_eq!(store.removed_span("a.ts", &range, 4).unwrap(), "fou");
    }

    #[test]
    fn test_missing_snapshot_returns_none() {
        let store = SnapshotStore::new(5, 60_000);
        let range = EditRange::at(0, 0);
        assert!(store.removed_span("ghost.ts", &range, 1).is_none());
    }

    #[test]
    fn test_version_cap() {
        let mut store = SnapshotStore::new(2, 60_000);
        for v in 1..=4 {
            store.capture("a.ts", v, lines(&[&format!("v{v}")]), 0);
        }
        assert_eq!(store.len(), 2);
        let range = EditRange {
            start_line: 0,
            start_char: 0,
            end_line: 0,
            end_char: 2,
        };
        // Versions 1 and 2 were dropped.
        assert!(store.removed_span("a.ts", &range, 2).is_none());
        assert_eq!(store.removed_span("a.ts", &range, 3).unwrap(), "v3");
    }

    #[test]
    fn test_recapture_same_version_replaces() {
        let mut store = SnapshotStore::new(5, 60_000);
        store.capture("a.ts", 1, lines(&["old"]), 0);
        store.capture("a.ts", 1, lines(&["new"]), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.latest("a.ts").unwrap().lines[0], "new");
    }

    #[test]
    fn test_prune_keeps_newest() {
        let mut store = SnapshotStore::new(5, 100);
        store.capture("a.ts", 1, lines(&["one"]), 0);
        store.capture("a.ts", 2, lines(&["two"]), 10);
        store.prune(10_000);
        assert_eq!(store.len(), 1);
        assert_eq!(store.latest("a.ts").unwrap().version, 2);
    }

    #[test]
    fn test_utf16_offsets_on_non_ascii() {
        let mut store = SnapshotStore::new(5, 60_000);
        store.capture("a.ts", 1, lines(&["let s = \"héllo\";"]), 0);
        let range = EditRange {
            start_line: 0,
            start_char: 9,
            end_line: 0,
            end_char: 14,
        };
        assert_eq!(store.removed_span("a.ts", &range, 1).unwrap(), "héllo");
    }
}
