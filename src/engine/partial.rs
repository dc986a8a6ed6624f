//! Reconstruction of transient partial-edit states.
//!
//! Some feed items hash an in-progress typing state that was never written
//! into the document, so no line record exists for it. Given a later full
//! content for the same file, two reconstructions are tried in order:
//! prefix growth (the state was a truncation of the final line) and
//! paired-symbol completion (the state was the final line with one
//! auto-closed bracket or quote span's interior truncated).

use crate::hash::CodeHasher;
use crate::models::{EditOperation, InferenceResult, MatchOrigin};

/// A matched open/close symbol pair, as character indices into the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SymbolPair {
    open: usize,
    close: usize,
}

/// Solver recovering never-persisted partial edit content.
pub struct PartialEditSolver {
    prefix_limit: usize,
}

impl PartialEditSolver {
    /// Creates a solver scanning at most `prefix_limit` prefix candidates.
    #[must_use]
    pub const fn new(prefix_limit: usize) -> Self {
        Self { prefix_limit }
    }

    /// Attempts to reconstruct the content behind `target_hash`, given the
    /// finalized `full_content` observed later for the same file.
    ///
    /// Partial states are hashed by the tracker as removals, so every
    /// candidate is tried with the `-` operation.
    #[must_use]
    pub fn solve(
        &self,
        target_hash: &str,
        file_name: &str,
        full_content: &str,
    ) -> Option<InferenceResult> {
        self.prefix_growth(target_hash, file_name, full_content)
            .or_else(|| Self::paired_symbols(target_hash, file_name, full_content))
    }

    /// Tries truncations of `full_content`, growing one code unit at a time
    /// from the first non-whitespace offset.
    fn prefix_growth(
        &self,
        target_hash: &str,
        file_name: &str,
        full_content: &str,
    ) -> Option<InferenceResult> {
        let units: Vec<u16> = full_content.encode_utf16().collect();
        let first_non_ws = units
            .iter()
            .position(|&u| {
                char::from_u32(u32::from(u)).is_none_or(|c| !c.is_whitespace())
            })
            .unwrap_or(units.len());
        let scan = self.prefix_limit.min(units.len() - first_non_ws);

        for i in 0..=scan {
            let candidate = String::from_utf16_lossy(&units[..first_non_ws + i]);
            let digest = CodeHasher::code_hash(file_name, EditOperation::Removed, &candidate);
            if digest == target_hash {
                return Some(InferenceResult {
                    hash: target_hash.to_string(),
                    content: candidate,
                    operation: EditOperation::Removed,
                    line_number: None,
                    origin: MatchOrigin::PartialEdit,
                });
            }
        }
        None
    }

    /// Tries every interior truncation of every matched symbol pair.
    ///
    /// Editors auto-insert the closing bracket or quote the moment the
    /// opening one is typed, so the true partial state is the final content
    /// with one pair's interior cut short — the close symbol and the text
    /// after it stay in place. Cost is bounded by the sum of interior span
    /// lengths, small for single source lines.
    fn paired_symbols(
        target_hash: &str,
        file_name: &str,
        full_content: &str,
    ) -> Option<InferenceResult> {
        let chars: Vec<char> = full_content.chars().collect();
        for pair in find_symbol_pairs(&chars) {
            let inner = &chars[pair.open + 1..pair.close];
            for prefix_len in 0..inner.len() {
                let mut candidate = String::with_capacity(full_content.len());
                candidate.extend(&chars[..=pair.open]);
                candidate.extend(&inner[..prefix_len]);
                candidate.push(chars[pair.close]);
                candidate.extend(&chars[pair.close + 1..]);

                let digest =
                    CodeHasher::code_hash(file_name, EditOperation::Removed, &candidate);
                if digest == target_hash {
                    return Some(InferenceResult {
                        hash: target_hash.to_string(),
                        content: candidate,
                        operation: EditOperation::Removed,
                        line_number: None,
                        origin: MatchOrigin::PairedSymbolPartial,
                    });
                }
            }
        }
        None
    }
}

/// Single-pass scan collecting every matched symbol pair.
///
/// Brackets pair by stack nesting; quotes and backticks pair with the
/// nearest subsequent occurrence of the same symbol, and characters inside
/// an open quoted span never open pairs of their own. Mismatched closers
/// are ignored.
fn find_symbol_pairs(chars: &[char]) -> Vec<SymbolPair> {
    let mut pairs = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut open_quote: Option<(char, usize)> = None;

    for (i, &c) in chars.iter().enumerate() {
        if let Some((quote, open)) = open_quote {
            if c == quote {
                pairs.push(SymbolPair { open, close: i });
                open_quote = None;
            }
            continue;
        }
        match c {
            '(' | '[' | '{' => stack.push((c, i)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if let Some(&(open_symbol, open)) = stack.last()
                    && open_symbol == expected
                {
                    stack.pop();
                    pairs.push(SymbolPair { open, close: i });
                }
            },
            '"' | '\'' | '`' => open_quote = Some((c, i)),
            _ => {},
        }
    }
    pairs
}
