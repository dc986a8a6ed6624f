//! Decomposition of editor change events into line records.

use crate::cache::SnapshotStore;
use crate::models::{EditEvent, EditOperation, EditRange, LineRecord, RecordOrigin};
use tracing::debug;

/// Stand-in content recorded when a deletion predates any snapshot.
///
/// The pre-edit text is gone and cannot be recovered; this placeholder keeps
/// the record stream complete while guaranteeing no hash will ever match it.
pub(super) const UNRECOVERED_DELETION: &str = "[linetrace: unrecovered deletion]";

/// Turns one change notification into per-line add/remove records.
///
/// Removed text is reconstructed from the snapshot at or before the edit's
/// prior version; added text is read straight from the post-edit buffer
/// lines. The caller is responsible for refreshing the snapshot afterwards.
pub(super) fn decompose_event(
    event: &EditEvent,
    snapshots: &SnapshotStore,
    current_lines: &[String],
    now: i64,
) -> Vec<LineRecord> {
    let mut records = Vec::new();

    if event.removes_text() {
        decompose_removal(event, snapshots, now, &mut records);
    }
    if !event.text.is_empty() {
        decompose_addition(event, current_lines, now, &mut records);
    }
    records
}

fn decompose_removal(
    event: &EditEvent,
    snapshots: &SnapshotStore,
    now: i64,
    records: &mut Vec<LineRecord>,
) {
    let prior_version = event.document_version - 1;
    let Some(removed) = snapshots.removed_span(&event.file_name, &event.range, prior_version)
    else {
        debug!(file = %event.file_name, version = prior_version, "no snapshot for deletion");
        records.push(LineRecord::new(
            &event.file_name,
            event.range.start_line,
            UNRECOVERED_DELETION,
            EditOperation::Removed,
            now,
            RecordOrigin::DeletedFragment,
        ));
        return;
    };

    if event.range.is_multi_line() {
        let mut pieces: Vec<&str> = removed.split('\n').collect();
        // A whole-line deletion ends at column 0 of the following line and
        // reconstructs with a trailing empty piece.
        if pieces.last() == Some(&"") {
            pieces.pop();
        }
        let last = pieces.len().saturating_sub(1);
        for (offset, piece) in pieces.into_iter().enumerate() {
            let partial_first = offset == 0 && event.range.start_char > 0;
            let partial_last = offset == last && event.range.end_char > 0;
            let origin = if partial_first || partial_last {
                RecordOrigin::DeletedFragment
            } else {
                RecordOrigin::FullLine
            };
            records.push(LineRecord::new(
                &event.file_name,
                event.range.start_line + u32::try_from(offset).unwrap_or(u32::MAX),
                piece,
                EditOperation::Removed,
                now,
                origin,
            ));
        }
    } else {
        let whole_line = event.range.start_char == 0
            && snapshots
                .removed_span(
                    &event.file_name,
                    &EditRange {
                        start_line: event.range.start_line,
                        start_char: 0,
                        end_line: event.range.start_line,
                        end_char: u32::MAX,
                    },
                    prior_version,
                )
                .is_some_and(|full| full == removed);
        records.push(LineRecord::new(
            &event.file_name,
            event.range.start_line,
            removed,
            EditOperation::Removed,
            now,
            if whole_line {
                RecordOrigin::FullLine
            } else {
                RecordOrigin::DeletedFragment
            },
        ));
    }
}

fn decompose_addition(
    event: &EditEvent,
    current_lines: &[String],
    now: i64,
    records: &mut Vec<LineRecord>,
) {
    // The replacement lands at `start_line` and touches one buffer line per
    // line break it contains; each touched post-edit line is recorded whole,
    // the way the tracker hashes buffer states.
    let touched = event.inserted_line_breaks() + 1;
    for offset in 0..touched {
        let index = event.range.start_line as usize + offset;
        let Some(line) = current_lines.get(index) else {
            break;
        };
        records.push(LineRecord::new(
            &event.file_name,
            u32::try_from(index).unwrap_or(u32::MAX),
            line.clone(),
            EditOperation::Added,
            now,
            RecordOrigin::FullLine,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_three_line_deletion_yields_three_removal_records() {
        let mut snapshots = SnapshotStore::new(5, 60_000);
        snapshots.capture("a.ts", 1, lines(&["a", "b", "c", "d"]), 0);

        let event = EditEvent {
            file_name: "a.ts".to_string(),
            range: EditRange {
                start_line: 0,
                start_char: 0,
                end_line: 3,
                end_char: 0,
            },
            range_length: 6,
            text: String::new(),
            document_version: 2,
        };
        let records = decompose_event(&event, &snapshots, &lines(&["d"]), 10);

        assert_eq!(records.len(), 3);
        for (record, expected) in records.iter().zip(["a", "b", "c"]) {
            assert_eq!(record.content, expected);
            assert_eq!(record.operation, EditOperation::Removed);
            assert_eq!(record.origin, RecordOrigin::FullLine);
        }
        assert_eq!(
            records.iter().map(|r| r.line_number).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_partial_single_line_deletion_is_a_fragment() {
        let mut snapshots = SnapshotStore::new(5, 60_000);
        snapshots.capture("a.ts", 1, lines(&["const value = 1;"]), 0);

        let event = EditEvent {
            file_name: "a.ts".to_string(),
            range: EditRange {
                start_line: 0,
                start_char: 6,
                end_line: 0,
                end_char: 11,
            },
            range_length: 5,
            text: String::new(),
            document_version: 2,
        };
        let records = decompose_event(&event, &snapshots, &lines(&["const  = 1;"]), 10);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "value");
        assert_eq!(records[0].origin, RecordOrigin::DeletedFragment);
    }

    #[test]
    fn test_insertion_records_post_edit_lines() {
        let snapshots = SnapshotStore::new(5, 60_000);
        let event = EditEvent {
            file_name: "a.ts".to_string(),
            range: EditRange::at(1, 0),
            range_length: 0,
            text: "let x = 1;\nlet y = 2;".to_string(),
            document_version: 2,
        };
        let current = lines(&["fn main() {", "let x = 1;", "let y = 2;", "}"]);
        let records = decompose_event(&event, &snapshots, &current, 10);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "let x = 1;");
        assert_eq!(records[1].content, "let y = 2;");
        assert_eq!(records[0].line_number, 1);
        assert_eq!(records[1].line_number, 2);
        assert!(records.iter().all(|r| r.operation == EditOperation::Added));
    }

    #[test]
    fn test_replacement_yields_both_directions() {
        let mut snapshots = SnapshotStore::new(5, 60_000);
        snapshots.capture("a.ts", 1, lines(&["old line"]), 0);

        let event = EditEvent {
            file_name: "a.ts".to_string(),
            range: EditRange {
                start_line: 0,
                start_char: 0,
                end_line: 0,
                end_char: 8,
            },
            range_length: 8,
            text: "new line".to_string(),
            document_version: 2,
        };
        let records = decompose_event(&event, &snapshots, &lines(&["new line"]), 10);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].operation, EditOperation::Removed);
        assert_eq!(records[0].content, "old line");
        assert_eq!(records[0].origin, RecordOrigin::FullLine);
        assert_eq!(records[1].operation, EditOperation::Added);
        assert_eq!(records[1].content, "new line");
    }

    #[test]
    fn test_deletion_without_snapshot_records_placeholder() {
        let snapshots = SnapshotStore::new(5, 60_000);
        let event = EditEvent {
            file_name: "never-opened.ts".to_string(),
            range: EditRange {
                start_line: 2,
                start_char: 0,
                end_line: 3,
                end_char: 0,
            },
            range_length: 9,
            text: String::new(),
            document_version: 7,
        };
        let records = decompose_event(&event, &snapshots, &[], 10);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, UNRECOVERED_DELETION);
        assert_eq!(records[0].operation, EditOperation::Removed);
    }
}
