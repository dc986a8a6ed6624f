//! Observed edit records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an observed edit, baked into the content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    /// A line (or fragment) was added.
    Added,
    /// A line (or fragment) was removed.
    Removed,
}

impl EditOperation {
    /// The single-character symbol the tracker hashes: `+` or `-`.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
        }
    }

    /// Parses the tracker's symbol form.
    #[must_use]
    pub const fn parse(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Self::Added),
            '-' => Some(Self::Removed),
            _ => None,
        }
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// How a record's content was obtained.
///
/// Added lines are read directly from the post-edit buffer; removed text is
/// gone from the buffer by the time the edit lands and has to be recovered
/// from a version snapshot, either as whole lines or as a sub-line fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// A complete buffer line.
    FullLine,
    /// A sub-line span reconstructed from a prior snapshot.
    DeletedFragment,
}

/// One candidate `(operation, content)` pair observed from an editor edit.
///
/// Records are append-only per file and mutated only by being marked `used`
/// once an opaque item consumes them. A record is consumed at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRecord {
    /// File the edit was observed in.
    pub file_name: String,
    /// Zero-based line number at the time of the edit.
    pub line_number: u32,
    /// The observed line or fragment text.
    pub content: String,
    /// Whether the text was added or removed.
    pub operation: EditOperation,
    /// Observation time, Unix milliseconds.
    pub timestamp: i64,
    /// Set once an opaque item has consumed this record.
    pub used: bool,
    /// How the content was obtained.
    pub origin: RecordOrigin,
}

impl LineRecord {
    /// Creates an unused record.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        line_number: u32,
        content: impl Into<String>,
        operation: EditOperation,
        timestamp: i64,
        origin: RecordOrigin,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            line_number,
            content: content.into(),
            operation,
            timestamp,
            used: false,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case('+', Some(EditOperation::Added); "plus is addition")]
    #[test_case('-', Some(EditOperation::Removed); "minus is removal")]
    #[test_case('~', None; "anything else is rejected")]
    #[test_case(' ', None; "context marker is rejected")]
    fn test_operation_parse(symbol: char, expected: Option<EditOperation>) {
        assert_eq!(EditOperation::parse(symbol), expected);
    }

    #[test]
    fn test_operation_symbol_roundtrip() {
        assert_eq!(EditOperation::Added.to_string(), "+");
        assert_eq!(EditOperation::Removed.to_string(), "-");
    }

    #[test]
    fn test_new_record_is_unused() {
        let record = LineRecord::new(
            "main.ts",
            3,
            "const x = 1;",
            EditOperation::Added,
            1_000,
            RecordOrigin::FullLine,
        );
        assert!(!record.used);
        assert_eq!(record.line_number, 3);
    }
}
