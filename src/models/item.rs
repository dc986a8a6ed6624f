//! Opaque feed items and their resolutions.

use super::record::EditOperation;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which agent surface produced an opaque item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentSource {
    /// Inline tab completion.
    Tab,
    /// Composer / chat-driven edit.
    Composer,
}

impl AgentSource {
    /// Lenient parse of the feed's `source` field.
    ///
    /// Unknown spellings default to `Tab`, matching the upstream feed where
    /// tab completions dominate and the field is free-form.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "composer" => Self::Composer,
            _ => Self::Tab,
        }
    }
}

/// Raw wire shape of one feed entry: `{hash, metadata: {...}}`.
///
/// Every field is optional so a malformed entry deserializes instead of
/// failing the whole batch; validation happens in [`OpaqueItem::from_raw`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawOpaqueItem {
    /// The 8-hex content digest.
    pub hash: Option<String>,
    /// Nested metadata object.
    pub metadata: Option<RawItemMetadata>,
}

/// Nested metadata of a raw feed entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItemMetadata {
    /// File the content was produced in.
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
    /// Agent surface, free-form.
    pub source: Option<String>,
    /// Production time, Unix milliseconds.
    pub timestamp: Option<i64>,
}

/// A validated feed item: an assertion that the agent produced some content
/// in `file_name`, identified only by a one-way hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueItem {
    /// 8-character lowercase hex digest of `(file, operation, content)`.
    pub hash: String,
    /// File the content was produced in, as spelled by the feed.
    pub file_name: String,
    /// Agent surface that produced it.
    pub source: AgentSource,
    /// Production time, Unix milliseconds.
    pub timestamp: i64,
}

impl OpaqueItem {
    /// Validates a raw feed entry.
    ///
    /// Entries missing the hash or file name are skipped individually and
    /// logged; a bad entry never aborts batch processing.
    #[must_use]
    pub fn from_raw(raw: RawOpaqueItem) -> Option<Self> {
        let hash = match raw.hash {
            Some(h) if !h.is_empty() => h.to_lowercase(),
            _ => {
                debug!("skipping feed entry without hash");
                return None;
            },
        };
        let Some(metadata) = raw.metadata else {
            debug!(hash = %hash, "skipping feed entry without metadata");
            return None;
        };
        let Some(file_name) = metadata.file_name.filter(|f| !f.is_empty()) else {
            debug!(hash = %hash, "skipping feed entry without file name");
            return None;
        };

        Some(Self {
            hash,
            file_name,
            source: AgentSource::parse(metadata.source.as_deref().unwrap_or_default()),
            timestamp: metadata.timestamp.unwrap_or(0),
        })
    }
}

/// Which recovery path produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    /// Direct match against a recorded buffer line.
    FullLine,
    /// Match against a fragment reconstructed from a snapshot.
    DeletedFragment,
    /// Reconstructed in-progress typing state (prefix growth).
    PartialEdit,
    /// Reconstructed in-progress state behind an auto-closed symbol pair.
    PairedSymbolPartial,
}

/// The recovered `(operation, content)` pair behind an opaque hash.
///
/// Produced exactly once per resolved hash and immutable afterwards; the
/// result cache hands out clones of the same resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// The hash this resolves.
    pub hash: String,
    /// The recovered content.
    pub content: String,
    /// The recovered operation.
    pub operation: EditOperation,
    /// Line number of the consumed record, when one exists.
    pub line_number: Option<u32>,
    /// Which recovery path produced this resolution.
    pub origin: MatchOrigin,
}
