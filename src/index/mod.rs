//! Matching backends and the contract they share.
//!
//! Every backend implements [`Matcher`]: a whole-corpus batch build
//! followed by read-only queries. Two query shapes coexist under the one
//! trait: document-set membership (always available) and per-document
//! occurrence offsets (capability-tagged, so membership-only backends
//! don't pay for position tracking).
//!
//! ## Backends
//!
//! - [`scan`] - baseline token-set scan and KMP linear text scan
//! - [`postings`] - exact inverted index
//! - [`bloom`] - probabilistic filter with verification scan
//! - [`kgram`] - character k-gram substring index
//! - [`trie`] - prefix trie
//! - [`suffix`] - suffix array over concatenated corpus text
//! - [`aho`] - Aho-Corasick multi-pattern automaton

pub mod aho;
pub mod bloom;
pub mod kgram;
pub mod postings;
pub mod scan;
pub mod suffix;
pub mod trie;

pub use aho::{AhoCorasickIndex, PatternMatch};
pub use bloom::{BloomConfig, BloomIndex, BloomStats};
pub use kgram::KGramIndex;
pub use postings::PostingsIndex;
pub use scan::{KmpIndex, ScanIndex};
pub use suffix::{Construction, SuffixIndex};
pub use trie::TrieIndex;

use crate::corpus::{Corpus, DocId};
use crate::error::Result;
use roaring::RoaringBitmap;
use serde::Serialize;

/// What a backend can answer beyond document membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Document-set membership only.
    Membership,
    /// Membership plus per-document occurrence offsets.
    Positions,
}

/// The contract every matching backend satisfies.
///
/// `build` ingests the whole corpus at once and fully replaces any prior
/// state, so calling it again is a reset rather than an error. Query
/// methods return [`crate::Error::NotBuilt`] until a build has completed;
/// after that they are read-only and never mutate the backend.
pub trait Matcher {
    /// Registry name of this backend.
    fn name(&self) -> &'static str;

    /// Which query shapes this backend supports.
    fn capability(&self) -> Capability {
        Capability::Membership
    }

    /// Ingest the corpus, replacing all prior state.
    fn build(&mut self, corpus: &Corpus) -> Result<()>;

    /// Documents matching `term`.
    ///
    /// Matching semantics are backend-specific (exact term, prefix, or
    /// substring) and documented per backend. Absent and empty terms
    /// yield the empty bitmap, never an error.
    fn matching_docs(&self, term: &str) -> Result<RoaringBitmap>;

    /// 0-based byte offsets of `term` inside one document's normalized
    /// text, ascending, overlaps included.
    ///
    /// Backends with [`Capability::Membership`] return
    /// [`crate::Error::PositionsUnsupported`].
    fn positions(&self, term: &str, doc: DocId) -> Result<Vec<usize>> {
        let _ = (term, doc);
        Err(crate::Error::PositionsUnsupported(self.name()))
    }

    /// Advisory statistics about the built index.
    fn stats(&self) -> IndexStats;
}

/// Advisory statistics reported by every backend.
///
/// Observability only; no correctness contract beyond being cheap to
/// compute on a built index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndexStats {
    /// Documents ingested by the last build.
    pub doc_count: usize,
    /// Distinct terms, grams, or patterns held by the index.
    pub vocabulary_size: usize,
    /// Total posting entries across the vocabulary.
    pub total_postings: usize,
    /// Bytes of text the index retains for scanning or verification.
    pub text_size: usize,
}
