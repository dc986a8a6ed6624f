//! Replay CLI command.

// CLI commands write their results to stdout.
#![allow(clippy::print_stdout)]

use crate::config::TraceConfig;
use crate::engine::InferenceEngine;
use crate::models::{EditEvent, RawOpaqueItem};
use crate::storage::MemoryCorpus;
use crate::{Error, Result, current_timestamp_millis};
use serde::Deserialize;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::info;

/// A recorded session: initial document states plus ordered edit steps.
#[derive(Debug, Deserialize)]
struct ReplayInput {
    /// Documents as they looked when opened.
    #[serde(default)]
    documents: Vec<ReplayDocument>,
    /// Edits in observation order.
    #[serde(default)]
    steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize)]
struct ReplayDocument {
    #[serde(rename = "fileName")]
    file_name: String,
    version: i32,
    lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReplayStep {
    event: EditEvent,
    /// Post-edit document lines.
    lines: Vec<String>,
}

/// Replays a recorded session against a feed dump and prints aggregate
/// resolution counts.
///
/// When `corpus_out` is given, the resolved corpus is written there as JSON
/// for a later `attribute` run.
pub fn cmd_replay(
    events_path: &Path,
    feed_path: &Path,
    corpus_out: Option<&Path>,
    config: TraceConfig,
) -> Result<()> {
    let session: ReplayInput = read_json(events_path, "read_events_file")?;
    let feed: Vec<RawOpaqueItem> = read_json(feed_path, "read_feed_file")?;

    let mut engine = InferenceEngine::new(config);
    let corpus = Rc::new(RefCell::new(MemoryCorpus::new()));
    let sink = Rc::clone(&corpus);
    engine.on_match(Box::new(move |item, result| {
        sink.borrow_mut()
            .record(item, result, current_timestamp_millis());
    }));

    for document in &session.documents {
        engine.open_document(&document.file_name, document.version, &document.lines);
    }
    for step in &session.steps {
        engine.observe_edit(&step.event, &step.lines);
    }

    let feed_len = feed.len();
    let results = engine.resolve_raw_batch(feed, current_timestamp_millis());
    info!(
        feed = feed_len,
        resolved = results.len(),
        "replay finished"
    );

    let stats = engine.stats();
    let summary = serde_json::json!({
        "feedItems": feed_len,
        "resolved": stats.resolved,
        "unresolved": stats.unresolved,
        "pendingPartial": stats.pending_partial,
        "lineRecords": stats.records.total_records,
        "usedRecords": stats.records.used_records,
        "cachedResults": stats.records.cached_results,
        "snapshots": stats.snapshots,
    });
    println!("{summary:#}");

    if let Some(path) = corpus_out {
        let corpus = corpus.borrow();
        write_corpus(path, &corpus)?;
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, operation: &str) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))
}

fn write_corpus(path: &Path, corpus: &MemoryCorpus) -> Result<()> {
    let lines = corpus.to_lines();
    let json = serde_json::to_string_pretty(&lines).map_err(|e| Error::OperationFailed {
        operation: "serialize_corpus".to_string(),
        cause: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|e| Error::OperationFailed {
        operation: "write_corpus_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    })
}
