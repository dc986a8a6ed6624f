//! Unified diff and numstat parsing.
//!
//! The process collaborator hands over raw textual output; only `+`/`-`
//! hunk lines and numeric stat totals are consumed.

use crate::models::{DiffLine, FileDiff};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// Pattern literals are verified by the parser tests.
#[allow(clippy::unwrap_used)]
static DIFF_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^diff --git a/(.+) b/(.+)$").unwrap());

#[allow(clippy::unwrap_used)]
static HUNK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@@ -(\d+)(?:,\d+)? \+(\d+)(?:,\d+)? @@").unwrap());

#[allow(clippy::unwrap_used)]
static NUMSTAT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+|-)\t(\d+|-)\t(.+)$").unwrap());

/// Parses unified diff text into per-file added/removed lines.
///
/// Hunk headers restart the line counters; `+++`/`---` file markers are not
/// content lines. Binary files produce no hunks and parse to empty line
/// lists. Input outside any `diff --git` header is ignored.
#[must_use]
pub fn parse_unified_diff(text: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut old_line: u32 = 0;
    let mut new_line: u32 = 0;

    for line in text.lines() {
        if let Some(captures) = DIFF_HEADER.captures(line) {
            files.push(FileDiff {
                path: captures[2].to_string(),
                ..FileDiff::default()
            });
            continue;
        }
        let Some(current) = files.last_mut() else {
            continue;
        };
        if let Some(captures) = HUNK_HEADER.captures(line) {
            old_line = captures[1].parse().unwrap_or(0);
            new_line = captures[2].parse().unwrap_or(0);
            continue;
        }
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }
        if let Some(content) = line.strip_prefix('+') {
            current.added_lines.push(DiffLine {
                content: content.to_string(),
                line_number: new_line,
            });
            new_line = new_line.saturating_add(1);
        } else if let Some(content) = line.strip_prefix('-') {
            current.removed_lines.push(DiffLine {
                content: content.to_string(),
                line_number: old_line,
            });
            old_line = old_line.saturating_add(1);
        } else if line.starts_with(' ') {
            old_line = old_line.saturating_add(1);
            new_line = new_line.saturating_add(1);
        }
    }
    files
}

/// Parses `--numstat` output into per-path `(added, removed)` totals.
///
/// Binary entries (`-`) count as zero.
#[must_use]
pub fn parse_numstat(text: &str) -> HashMap<String, (u32, u32)> {
    let mut totals = HashMap::new();
    for line in text.lines() {
        if let Some(captures) = NUMSTAT_LINE.captures(line) {
            let added = captures[1].parse().unwrap_or(0);
            let removed = captures[2].parse().unwrap_or(0);
            totals.insert(captures[3].to_string(), (added, removed));
        }
    }
    totals
}

/// Folds numstat totals into parsed file diffs.
pub fn apply_numstat(files: &mut [FileDiff], totals: &HashMap<String, (u32, u32)>) {
    for file in files {
        if let Some(&(added, removed)) = totals.get(&file.path) {
            file.added = added;
            file.removed = removed;
        } else {
            file.added = u32::try_from(file.added_lines.len()).unwrap_or(u32::MAX);
            file.removed = u32::try_from(file.removed_lines.len()).unwrap_or(u32::MAX);
        }
    }
}
