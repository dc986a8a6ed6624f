//! Commit diff and attribution types.

use serde::{Deserialize, Serialize};

/// One `+`/`-` line of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// Line content without the leading `+`/`-` marker.
    pub content: String,
    /// Line number in the post-image (added) or pre-image (removed).
    pub line_number: u32,
}

/// Per-file portion of a commit diff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileDiff {
    /// Path as spelled by the diff (new-file side).
    pub path: String,
    /// Numeric addition total from the stat line.
    pub added: u32,
    /// Numeric deletion total from the stat line.
    pub removed: u32,
    /// The added hunk lines.
    pub added_lines: Vec<DiffLine>,
    /// The removed hunk lines.
    pub removed_lines: Vec<DiffLine>,
}

/// A parsed commit (or the uncommitted working state).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDiff {
    /// Commit hash, or a sentinel for the working state.
    pub commit: String,
    /// Author name.
    pub author: String,
    /// Commit time, Unix milliseconds.
    pub timestamp: i64,
    /// First line of the commit message.
    pub message: String,
    /// Per-file diffs.
    pub files: Vec<FileDiff>,
}

/// Attribution totals for one file of a commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileAttribution {
    /// Path as spelled by the diff.
    pub path: String,
    /// Total added lines.
    pub added: u32,
    /// Added lines attributed to the agent.
    pub ai_added: u32,
    /// Total removed lines.
    pub removed: u32,
    /// Removed lines attributed to the agent.
    pub ai_removed: u32,
}

impl FileAttribution {
    /// Share of added lines attributed to the agent, 0-100.
    #[must_use]
    pub fn ai_added_percent(&self) -> f64 {
        percent(self.ai_added, self.added)
    }
}

/// Attribution totals for a whole commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitAttribution {
    /// Commit hash, or a sentinel for the working state.
    pub commit: String,
    /// Per-file attributions.
    pub files: Vec<FileAttribution>,
    /// Total added lines across files.
    pub added: u32,
    /// Added lines attributed to the agent across files.
    pub ai_added: u32,
    /// Total removed lines across files.
    pub removed: u32,
    /// Removed lines attributed to the agent across files.
    pub ai_removed: u32,
}

impl CommitAttribution {
    /// Share of added lines attributed to the agent, 0-100.
    #[must_use]
    pub fn ai_added_percent(&self) -> f64 {
        percent(self.ai_added, self.added)
    }

    /// Share of removed lines attributed to the agent, 0-100.
    #[must_use]
    pub fn ai_removed_percent(&self) -> f64 {
        percent(self.ai_removed, self.removed)
    }
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages() {
        let attribution = CommitAttribution {
            commit: "abc".to_string(),
            added: 8,
            ai_added: 2,
            removed: 0,
            ai_removed: 0,
            files: Vec::new(),
        };
        assert!((attribution.ai_added_percent() - 25.0).abs() < f64::EPSILON);
        // Zero denominators report zero, not NaN.
        assert!((attribution.ai_removed_percent() - 0.0).abs() < f64::EPSILON);
    }
}
