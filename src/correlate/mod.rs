//! Commit diff attribution.
//!
//! Replays the content-equality technique against commit diffs: a diff line
//! is attributed to the agent when the already-resolved corpus holds a
//! content-equal record for the same file that predates the commit within
//! the causality window.

mod diff;

pub use diff::{apply_numstat, parse_numstat, parse_unified_diff};

use crate::models::{CommitAttribution, CommitDiff, DiffLine, EditOperation, FileAttribution};
use crate::storage::{ResolvedCorpus, ResolvedLine};
use chrono::Duration;
use lru::LruCache;
use std::num::NonZeroUsize;
use tracing::debug;

/// Attribution cache capacity, in commits.
const COMMIT_CACHE_CAP: usize = 64;

/// Stamp granularity: storage mtime is coarsened to the minute so hot
/// write paths do not thrash the cache.
const STAMP_COARSENESS_MS: i64 = 60_000;

/// Attributes commit diff lines against a resolved corpus.
///
/// Results are cached per commit hash and invalidated wholesale when the
/// corpus stamp changes.
pub struct DiffCorrelator<C> {
    corpus: C,
    cache: LruCache<String, CommitAttribution>,
    stamp: i64,
    causality_window: Duration,
}

impl<C: ResolvedCorpus> DiffCorrelator<C> {
    /// Creates a correlator over `corpus` with the given lookback in days.
    ///
    /// # Panics
    ///
    /// Does not panic: the cache capacity is a non-zero constant.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(corpus: C, causality_window_days: i64) -> Self {
        let cap = NonZeroUsize::new(COMMIT_CACHE_CAP).expect("cache capacity is non-zero");
        Self {
            corpus,
            cache: LruCache::new(cap),
            stamp: 0,
            causality_window: Duration::days(causality_window_days),
        }
    }

    /// Attributes one commit (or the uncommitted working state).
    pub fn attribute(&mut self, commit: &CommitDiff) -> CommitAttribution {
        let stamp = self.corpus.last_modified() / STAMP_COARSENESS_MS;
        if stamp != self.stamp {
            debug!(stamp, "corpus stamp changed, dropping attribution cache");
            self.cache.clear();
            self.stamp = stamp;
        }
        if let Some(hit) = self.cache.get(&commit.commit) {
            return hit.clone();
        }

        let mut attribution = CommitAttribution {
            commit: commit.commit.clone(),
            ..CommitAttribution::default()
        };
        for file in &commit.files {
            let corpus_lines = self.corpus.lines_for_path(&file.path);
            let ai_added = self.attributed_count(
                &file.added_lines,
                &corpus_lines,
                EditOperation::Added,
                commit.timestamp,
            );
            let ai_removed = self.attributed_count(
                &file.removed_lines,
                &corpus_lines,
                EditOperation::Removed,
                commit.timestamp,
            );
            attribution.files.push(FileAttribution {
                path: file.path.clone(),
                added: file.added,
                ai_added,
                removed: file.removed,
                ai_removed,
            });
            attribution.added += file.added;
            attribution.removed += file.removed;
            attribution.ai_added += ai_added;
            attribution.ai_removed += ai_removed;
        }

        metrics::counter!("linetrace_commits_attributed_total").increment(1);
        self.cache.put(commit.commit.clone(), attribution.clone());
        attribution
    }

    /// Counts diff lines with a content-equal corpus record inside the
    /// causality window.
    ///
    /// Each corpus record attributes at most one diff line per commit, so a
    /// line repeated in the diff needs as many prior records.
    fn attributed_count(
        &self,
        diff_lines: &[DiffLine],
        corpus_lines: &[ResolvedLine],
        operation: EditOperation,
        commit_timestamp: i64,
    ) -> u32 {
        let window_ms = self.causality_window.num_milliseconds();
        let mut consumed = vec![false; corpus_lines.len()];
        let mut count: u32 = 0;

        for diff_line in diff_lines {
            let trimmed = diff_line.content.trim();
            if trimmed.is_empty() {
                continue;
            }
            let matched = corpus_lines.iter().enumerate().find(|(i, record)| {
                !consumed[*i]
                    && record.operation == operation
                    && record.timestamp <= commit_timestamp
                    && commit_timestamp - record.timestamp <= window_ms
                    && record.content.trim() == trimmed
            });
            if let Some((i, _)) = matched {
                consumed[i] = true;
                count += 1;
            }
        }
        count
    }
}
