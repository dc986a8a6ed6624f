//! Per-file line record store and hash lookup.

use crate::hash::CodeHasher;
use crate::models::{InferenceResult, LineRecord, MatchOrigin, RecordOrigin};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use tracing::{debug, trace};

/// Aggregate counters exposed to callers.
///
/// The cache's outward surface is counts only; raw content stays inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Records currently held across all files.
    pub total_records: usize,
    /// Records already consumed by an opaque item.
    pub used_records: usize,
    /// Resolutions held in the result cache.
    pub cached_results: usize,
}

/// Returns true when two file spellings plausibly name the same file.
///
/// The feed may reference a file by absolute path while the editor reports a
/// workspace-relative one (or vice versa), so candidates are accepted on
/// exact equality, containment in either direction, or equal base name.
#[must_use]
pub fn file_names_related(a: &str, b: &str) -> bool {
    if a == b || a.contains(b) || b.contains(a) {
        return true;
    }
    base_name(a) == base_name(b)
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Bounded FIFO cache of produced resolutions, keyed by hash.
///
/// On overflow the oldest half is evicted in one sweep, so the most
/// recently inserted half always survives.
#[derive(Debug)]
struct ResultCache {
    entries: HashMap<String, InferenceResult>,
    order: VecDeque<String>,
    cap: usize,
}

impl ResultCache {
    fn new(cap: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            cap: cap.max(2),
        }
    }

    fn get(&self, hash: &str) -> Option<&InferenceResult> {
        self.entries.get(hash)
    }

    fn insert(&mut self, result: InferenceResult) {
        if self.entries.contains_key(&result.hash) {
            return;
        }
        self.order.push_back(result.hash.clone());
        self.entries.insert(result.hash.clone(), result);
        if self.entries.len() > self.cap {
            let evict = self.cap / 2;
            for _ in 0..evict {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            trace!(evicted = evict, "result cache overflow sweep");
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Per-file, count-bounded store of observed `(operation, content)`
/// candidates.
///
/// Each opaque hash is resolved by exhaustively re-hashing unused candidate
/// records for files related to the item's file name. The miss space is
/// small — content is already known from edits — so exhaustive trial is
/// cheap and exact.
pub struct LineRecordCache {
    records: HashMap<String, VecDeque<LineRecord>>,
    results: ResultCache,
    per_file_cap: usize,
    workspace_root: Option<String>,
}

impl LineRecordCache {
    /// Creates a cache with the given per-file record cap and result cache
    /// cap. `workspace_root`, when set, enables the absolute-to-relative
    /// file spelling retry during lookup.
    #[must_use]
    pub fn new(per_file_cap: usize, result_cache_cap: usize, workspace_root: Option<String>) -> Self {
        Self {
            records: HashMap::new(),
            results: ResultCache::new(result_cache_cap),
            per_file_cap: per_file_cap.max(1),
            workspace_root,
        }
    }

    /// Appends one observed record, trimming the oldest entries for that
    /// file beyond the per-file cap.
    pub fn record(&mut self, record: LineRecord) {
        let entries = self.records.entry(record.file_name.clone()).or_default();
        entries.push_back(record);
        while entries.len() > self.per_file_cap {
            entries.pop_front();
        }
        metrics::counter!("linetrace_line_records_total").increment(1);
    }

    /// Returns a previously produced resolution for `hash`, if cached.
    #[must_use]
    pub fn cached_result(&self, hash: &str) -> Option<&InferenceResult> {
        self.results.get(hash)
    }

    /// Inserts a resolution produced outside the direct lookup path (the
    /// partial-edit solver reports its reconstructions through here).
    pub fn insert_result(&mut self, result: InferenceResult) {
        self.results.insert(result);
    }

    /// Attempts to resolve `hash` against unused records of files related
    /// to `file_name`.
    ///
    /// The hash trial uses the item's file spelling as given; if nothing
    /// matches and the spelling is absolute, the workspace-relative
    /// spelling is tried as a second pass. The first matching record wins,
    /// is marked used, and the resolution is cached under the hash.
    pub fn find_match(&mut self, hash: &str, file_name: &str) -> Option<InferenceResult> {
        let related = self.related_files(file_name);
        if related.is_empty() {
            return None;
        }

        if let Some(result) = self.trial(hash, file_name, &related) {
            return Some(result);
        }
        if let Some(relative) = self.relative_spelling(file_name) {
            debug!(file = %file_name, relative = %relative, "retrying with workspace-relative spelling");
            if let Some(result) = self.trial(hash, &relative, &related) {
                return Some(result);
            }
        }
        None
    }

    fn trial(&mut self, hash: &str, spelling: &str, related: &[String]) -> Option<InferenceResult> {
        for file in related {
            let Some(entries) = self.records.get_mut(file) else {
                continue;
            };
            for record in entries.iter_mut().filter(|r| !r.used) {
                let candidate = CodeHasher::code_hash(spelling, record.operation, &record.content);
                if candidate == hash {
                    record.used = true;
                    let result = InferenceResult {
                        hash: hash.to_string(),
                        content: record.content.clone(),
                        operation: record.operation,
                        line_number: Some(record.line_number),
                        origin: match record.origin {
                            RecordOrigin::FullLine => MatchOrigin::FullLine,
                            RecordOrigin::DeletedFragment => MatchOrigin::DeletedFragment,
                        },
                    };
                    self.results.insert(result.clone());
                    metrics::counter!("linetrace_record_matches_total").increment(1);
                    return Some(result);
                }
            }
        }
        None
    }

    /// Files currently holding records related to `file_name`.
    #[must_use]
    pub fn related_files(&self, file_name: &str) -> Vec<String> {
        self.records
            .keys()
            .filter(|known| file_names_related(known, file_name))
            .cloned()
            .collect()
    }

    /// Whether any record exists for a file related to `file_name`.
    #[must_use]
    pub fn has_related_records(&self, file_name: &str) -> bool {
        self.records
            .keys()
            .any(|known| file_names_related(known, file_name))
    }

    /// Drops used records older than `retention_ms`.
    ///
    /// Unused records are exempt from time-based eviction and bounded only
    /// by the per-file cap: they may still be the only evidence for an
    /// unresolved item.
    pub fn prune(&mut self, now: i64, retention_ms: i64) {
        for entries in self.records.values_mut() {
            entries.retain(|r| !r.used || now - r.timestamp <= retention_ms);
        }
        self.records.retain(|_, entries| !entries.is_empty());
    }

    /// Aggregate counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let total_records = self.records.values().map(VecDeque::len).sum();
        let used_records = self
            .records
            .values()
            .flat_map(|entries| entries.iter())
            .filter(|r| r.used)
            .count();
        CacheStats {
            total_records,
            used_records,
            cached_results: self.results.len(),
        }
    }

    fn relative_spelling(&self, file_name: &str) -> Option<String> {
        if !is_absolute_spelling(file_name) {
            return None;
        }
        let root = self.workspace_root.as_deref()?;
        let stripped = Path::new(file_name)
            .strip_prefix(root)
            .ok()?
            .to_string_lossy()
            .into_owned();
        if stripped.is_empty() { None } else { Some(stripped) }
    }
}

fn is_absolute_spelling(file_name: &str) -> bool {
    Path::new(file_name).is_absolute()
        || file_name.starts_with('/')
        || file_name.get(1..2) == Some(":")
}
