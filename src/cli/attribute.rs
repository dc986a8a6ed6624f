//! Attribute CLI command.

// CLI commands write their results to stdout.
#![allow(clippy::print_stdout)]

use crate::config::TraceConfig;
use crate::correlate::DiffCorrelator;
use crate::git::{DiffSource, GitDiffSource};
use crate::storage::{MemoryCorpus, ResolvedLine};
use crate::{Error, Result, current_timestamp_millis};
use std::path::Path;
use tracing::info;

/// Attributes a commit (or the working state) against a resolved corpus
/// file and prints per-file and total counts as JSON.
pub fn cmd_attribute(
    repo: &Path,
    rev: Option<&str>,
    corpus_path: &Path,
    config: &TraceConfig,
) -> Result<()> {
    let contents = std::fs::read_to_string(corpus_path).map_err(|e| Error::OperationFailed {
        operation: "read_corpus_file".to_string(),
        cause: format!("{}: {e}", corpus_path.display()),
    })?;
    let lines: Vec<ResolvedLine> = serde_json::from_str(&contents)
        .map_err(|e| Error::InvalidInput(format!("{}: {e}", corpus_path.display())))?;
    let corpus = MemoryCorpus::from_lines(lines, current_timestamp_millis());

    let source = GitDiffSource::new(repo);
    let diff = match rev {
        Some(rev) => source.commit_diff(rev)?,
        None => source.working_diff()?,
    };
    info!(commit = %diff.commit, files = diff.files.len(), "diff loaded");

    let mut correlator = DiffCorrelator::new(corpus, config.causality_window_days);
    let attribution = correlator.attribute(&diff);

    let json =
        serde_json::to_string_pretty(&attribution).map_err(|e| Error::OperationFailed {
            operation: "serialize_attribution".to_string(),
            cause: e.to_string(),
        })?;
    println!("{json}");
    Ok(())
}
