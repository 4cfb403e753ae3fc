//! Text normalization shared by indexing and query evaluation.
//!
//! Tokenization is byte-level and ASCII-focused: terms are lowercased
//! alphanumeric runs, with a single interior apostrophe allowed so that
//! contractions ("don't") survive as one term.

use memchr::memmem;
use rustc_hash::FxHashSet;

/// Extract lowercase alphanumeric terms from text.
///
/// Non-ASCII bytes terminate a run and are skipped. Order of first
/// occurrence is preserved; duplicates are kept (callers that need set
/// semantics use [`unique_terms`]).
pub fn tokenize(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_alphanumeric() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
            i += 1;
        }
        // One interior apostrophe, only when alphanumerics continue after it
        if i + 1 < bytes.len() && bytes[i] == b'\'' && bytes[i + 1].is_ascii_alphanumeric() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                i += 1;
            }
        }

        let mut token = String::with_capacity(i - start);
        for &b in &bytes[start..i] {
            token.push(b.to_ascii_lowercase() as char);
        }
        tokens.push(token);
    }

    tokens
}

/// Deduplicated lowercase terms of a text.
pub fn unique_terms(text: &str) -> FxHashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Start offsets of every occurrence of `needle` inside `haystack`,
/// overlapping occurrences included. Empty needles match nothing.
pub fn find_positions(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut positions = Vec::new();
    if needle.is_empty() || haystack.len() < needle.len() {
        return positions;
    }

    let finder = memmem::Finder::new(needle);
    let mut start = 0;
    while let Some(rel) = finder.find(&haystack[start..]) {
        let pos = start + rel;
        positions.push(pos);
        start = pos + 1;
        if start + needle.len() > haystack.len() {
            break;
        }
    }
    positions
}

/// Substring containment test used by verification phases.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && memmem::find(haystack, needle).is_some()
}
