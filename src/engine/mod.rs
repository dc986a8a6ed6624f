//! Opaque item resolution.
//!
//! The engine owns the record and snapshot caches, drains opaque item
//! batches in arrival order, and drives the two recovery paths: direct
//! candidate lookup and partial-state reconstruction. Items that resist
//! both stay queued and are retried exactly when new evidence arrives for
//! a file they reference; items that never match remain silently
//! unresolved.

mod edits;
mod partial;

pub use partial::PartialEditSolver;

use crate::cache::{CacheStats, LineRecordCache, SnapshotStore, file_names_related};
use crate::config::TraceConfig;
use crate::current_timestamp_millis;
use crate::models::{EditEvent, InferenceResult, OpaqueItem, RawOpaqueItem};
use std::collections::VecDeque;
use tracing::debug;

/// Callback invoked once per newly resolved hash.
pub type MatchListener = Box<dyn FnMut(&OpaqueItem, &InferenceResult)>;

/// Aggregate engine counters.
///
/// The engine's outward surface is counts only; recovered content reaches
/// callers solely through the match listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStats {
    /// Hashes resolved so far.
    pub resolved: usize,
    /// Items waiting for new record evidence.
    pub unresolved: usize,
    /// Items waiting for a new full match to solve against.
    pub pending_partial: usize,
    /// Record cache counters.
    pub records: CacheStats,
    /// Snapshots currently held.
    pub snapshots: usize,
}

/// Resolves opaque feed items against observed edit history.
///
/// Single-threaded by design: edit notifications and feed batches arrive as
/// cooperative callbacks on one event loop, so used-marking and cache
/// mutation need no locks.
pub struct InferenceEngine {
    config: TraceConfig,
    records: LineRecordCache,
    snapshots: SnapshotStore,
    solver: PartialEditSolver,
    unresolved: VecDeque<OpaqueItem>,
    pending_partial: VecDeque<OpaqueItem>,
    listeners: Vec<MatchListener>,
    resolved_count: usize,
}

impl InferenceEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: TraceConfig) -> Self {
        let records = LineRecordCache::new(
            config.per_file_record_cap,
            config.result_cache_cap,
            config
                .workspace_root
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        );
        let snapshots = SnapshotStore::new(config.snapshot_version_cap, config.snapshot_retention_ms);
        let solver = PartialEditSolver::new(config.prefix_scan_limit);
        Self {
            config,
            records,
            snapshots,
            solver,
            unresolved: VecDeque::new(),
            pending_partial: VecDeque::new(),
            listeners: Vec::new(),
            resolved_count: 0,
        }
    }

    /// Registers a listener invoked once per newly resolved hash.
    pub fn on_match(&mut self, listener: MatchListener) {
        self.listeners.push(listener);
    }

    /// Seeds the snapshot history for a newly opened or activated document.
    ///
    /// Must happen before the first edit lands, or the first deletion's text
    /// is already lost.
    pub fn open_document(&mut self, file_name: &str, version: i32, lines: &[String]) {
        self.snapshots
            .capture(file_name, version, lines.to_vec(), current_timestamp_millis());
    }

    /// Ingests one editor change notification.
    ///
    /// Decomposes the edit into per-line records, refreshes the snapshot to
    /// the post-edit state, then re-scans unresolved items referencing the
    /// edited file — new records are precisely the moment a queued item can
    /// start matching.
    pub fn observe_edit(&mut self, event: &EditEvent, current_lines: &[String]) {
        let now = current_timestamp_millis();
        let new_records = edits::decompose_event(event, &self.snapshots, current_lines, now);
        let got_evidence = !new_records.is_empty();
        for record in new_records {
            self.records.record(record);
        }
        self.snapshots.capture(
            &event.file_name,
            event.document_version,
            current_lines.to_vec(),
            now,
        );
        if got_evidence {
            self.retry_unresolved_for(&event.file_name);
        }
    }

    /// Resolves a batch of raw feed entries, skipping malformed ones
    /// individually.
    pub fn resolve_raw_batch(
        &mut self,
        raw: Vec<RawOpaqueItem>,
        now: i64,
    ) -> Vec<InferenceResult> {
        let items: Vec<OpaqueItem> = raw.into_iter().filter_map(OpaqueItem::from_raw).collect();
        self.resolve_batch(&items, now)
    }

    /// Resolves opaque items in the order given.
    ///
    /// Order matters: a finalized content commonly follows a sequence of
    /// partial states, so each full match immediately tries to solve the
    /// chronologically preceding still-unresolved item for the same file,
    /// and re-solves the pending-partial queue with the fresh content.
    pub fn resolve_batch(&mut self, items: &[OpaqueItem], now: i64) -> Vec<InferenceResult> {
        let mut resolutions = Vec::new();
        for item in items {
            if let Some(hit) = self.records.cached_result(&item.hash) {
                resolutions.push(hit.clone());
                continue;
            }
            if let Some(result) = self.records.find_match(&item.hash, &item.file_name) {
                self.note_resolution(item, now);
                self.emit(item, &result);
                self.retry_pending_partial(&item.file_name, &result.content);
                self.try_resolve_preceding(item, &result);
                resolutions.push(result);
            } else {
                self.enqueue_unresolved(item);
            }
        }
        resolutions
    }

    /// Drops expired cache entries.
    ///
    /// Used records and old snapshots age out; unused records are exempt
    /// from time-based eviction and bounded only by the per-file cap, so an
    /// unresolved item keeps its evidence until capacity forces it out.
    pub fn prune(&mut self, now: i64) {
        self.records.prune(now, self.config.record_retention_ms);
        self.snapshots.prune(now);
    }

    /// Aggregate counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            resolved: self.resolved_count,
            unresolved: self.unresolved.len(),
            pending_partial: self.pending_partial.len(),
            records: self.records.stats(),
            snapshots: self.snapshots.len(),
        }
    }

    fn note_resolution(&mut self, item: &OpaqueItem, now: i64) {
        self.resolved_count += 1;
        metrics::counter!("linetrace_resolved_total").increment(1);
        if item.timestamp > 0 && now >= item.timestamp {
            #[allow(clippy::cast_precision_loss)]
            metrics::histogram!("linetrace_resolution_lag_ms").record((now - item.timestamp) as f64);
        }
    }

    fn emit(&mut self, item: &OpaqueItem, result: &InferenceResult) {
        debug!(
            hash = %result.hash,
            file = %item.file_name,
            origin = ?result.origin,
            "hash resolved"
        );
        for listener in &mut self.listeners {
            listener(item, result);
        }
    }

    fn enqueue_unresolved(&mut self, item: &OpaqueItem) {
        if self.unresolved.iter().any(|queued| queued.hash == item.hash) {
            return;
        }
        debug!(hash = %item.hash, file = %item.file_name, "item queued unresolved");
        self.unresolved.push_back(item.clone());
    }

    /// After a full match, tries to solve the nearest chronologically
    /// preceding unresolved item for the same file as a partial state of
    /// the matched content. A failed attempt moves the item to the
    /// pending-partial queue for retry on the next full match.
    fn try_resolve_preceding(&mut self, item: &OpaqueItem, full: &InferenceResult) {
        let Some(index) = self.unresolved.iter().rposition(|queued| {
            queued.timestamp <= item.timestamp
                && file_names_related(&queued.file_name, &item.file_name)
        }) else {
            return;
        };
        let Some(candidate) = self.unresolved.remove(index) else {
            return;
        };
        if let Some(result) = self
            .solver
            .solve(&candidate.hash, &candidate.file_name, &full.content)
        {
            self.records.insert_result(result.clone());
            self.resolved_count += 1;
            metrics::counter!("linetrace_resolved_total").increment(1);
            self.emit(&candidate, &result);
        } else {
            self.enqueue_pending_partial(candidate);
        }
    }

    fn enqueue_pending_partial(&mut self, item: OpaqueItem) {
        if self
            .pending_partial
            .iter()
            .any(|queued| queued.hash == item.hash)
        {
            return;
        }
        self.pending_partial.push_back(item);
    }

    /// Re-solves queued partial candidates against fresh full content for a
    /// related file.
    fn retry_pending_partial(&mut self, file_name: &str, full_content: &str) {
        let mut remaining = VecDeque::new();
        while let Some(pending) = self.pending_partial.pop_front() {
            if file_names_related(&pending.file_name, file_name)
                && let Some(result) =
                    self.solver
                        .solve(&pending.hash, &pending.file_name, full_content)
            {
                self.records.insert_result(result.clone());
                self.resolved_count += 1;
                metrics::counter!("linetrace_resolved_total").increment(1);
                self.emit(&pending, &result);
                continue;
            }
            remaining.push_back(pending);
        }
        self.pending_partial = remaining;
    }

    /// Targeted re-scan: retries unresolved items whose file is related to
    /// the file that just produced new records.
    fn retry_unresolved_for(&mut self, file_name: &str) {
        if self.unresolved.is_empty() || !self.records.has_related_records(file_name) {
            return;
        }
        let mut remaining = VecDeque::new();
        while let Some(item) = self.unresolved.pop_front() {
            if file_names_related(&item.file_name, file_name)
                && let Some(result) = self.records.find_match(&item.hash, &item.file_name)
            {
                self.resolved_count += 1;
                metrics::counter!("linetrace_resolved_total").increment(1);
                self.emit(&item, &result);
                self.retry_pending_partial(&item.file_name, &result.content);
                continue;
            }
            remaining.push_back(item);
        }
        self.unresolved = remaining;
    }
}
