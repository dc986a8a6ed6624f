//! Editor edit events and document snapshots.

use serde::{Deserialize, Serialize};

/// A half-open region of a document, in UTF-16 code unit columns.
///
/// Matches the editor's change notification coordinates: `start_char` and
/// `end_char` count code units into `start_line` and `end_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRange {
    /// Zero-based first line of the region.
    pub start_line: u32,
    /// Code unit offset into the first line.
    pub start_char: u32,
    /// Zero-based last line of the region.
    pub end_line: u32,
    /// Code unit offset into the last line.
    pub end_char: u32,
}

impl EditRange {
    /// A collapsed range at one position.
    #[must_use]
    pub const fn at(line: u32, character: u32) -> Self {
        Self {
            start_line: line,
            start_char: character,
            end_line: line,
            end_char: character,
        }
    }

    /// Whether the range covers more than one line.
    #[must_use]
    pub const fn is_multi_line(&self) -> bool {
        self.end_line > self.start_line
    }
}

/// One editor change notification.
///
/// The notification exposes only the post-edit state: `text` is the
/// replacement, `range` is where the replaced region used to be, and
/// `range_length` is how many code units were replaced. The pre-edit text of
/// a deletion is recoverable only through a snapshot captured beforehand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditEvent {
    /// File the edit applies to.
    pub file_name: String,
    /// Replaced region, pre-edit coordinates.
    pub range: EditRange,
    /// Number of code units replaced (0 for a pure insertion).
    pub range_length: u32,
    /// Replacement text ("" for a pure deletion).
    pub text: String,
    /// Post-edit document version.
    pub document_version: i32,
}

impl EditEvent {
    /// Whether this edit removed any pre-existing text.
    #[must_use]
    pub const fn removes_text(&self) -> bool {
        self.range_length > 0
    }

    /// Number of line breaks in the replacement text.
    #[must_use]
    pub fn inserted_line_breaks(&self) -> usize {
        self.text.matches('\n').count()
    }
}

/// Full line array of a document at one version.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    /// Document version the lines correspond to.
    pub version: i32,
    /// Capture time, Unix milliseconds.
    pub timestamp: i64,
    /// The document's lines, in order, without line terminators.
    pub lines: Vec<String>,
}

impl DocumentSnapshot {
    /// Creates a snapshot from owned lines.
    #[must_use]
    pub const fn new(version: i32, timestamp: i64, lines: Vec<String>) -> Self {
        Self {
            version,
            timestamp,
            lines,
        }
    }
}
