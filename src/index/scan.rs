//! Baseline scanning backends.
//!
//! [`ScanIndex`] is the correctness reference for exact-term queries: no
//! index structure at all, just a linear scan over per-document term
//! sets. [`KmpIndex`] is its substring counterpart, scanning each
//! document's text with the KMP failure-function algorithm.

use crate::corpus::{Corpus, DocId};
use crate::error::{Error, Result};
use crate::index::{Capability, IndexStats, Matcher};
use crate::utils::{kmp, text};
use roaring::RoaringBitmap;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Brute-force exact-term scan over per-document token sets.
///
/// `matching_docs` is O(documents) per query. Membership only.
#[derive(Debug, Default)]
pub struct ScanIndex {
    term_sets: Vec<FxHashSet<String>>,
    built: bool,
}

impl ScanIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Matcher for ScanIndex {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn build(&mut self, corpus: &Corpus) -> Result<()> {
        self.term_sets = corpus.iter().map(|d| text::unique_terms(&d.text)).collect();
        self.built = true;
        debug!(docs = self.term_sets.len(), "scan index built");
        Ok(())
    }

    fn matching_docs(&self, term: &str) -> Result<RoaringBitmap> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let mut docs = RoaringBitmap::new();
        let term = term.to_lowercase();
        if term.is_empty() {
            return Ok(docs);
        }

        for (doc_id, terms) in self.term_sets.iter().enumerate() {
            if terms.contains(&term) {
                docs.insert(doc_id as DocId);
            }
        }
        Ok(docs)
    }

    fn stats(&self) -> IndexStats {
        let mut vocabulary: FxHashSet<&str> = FxHashSet::default();
        let mut total_postings = 0;
        for terms in &self.term_sets {
            total_postings += terms.len();
            vocabulary.extend(terms.iter().map(String::as_str));
        }
        IndexStats {
            doc_count: self.term_sets.len(),
            vocabulary_size: vocabulary.len(),
            total_postings,
            text_size: 0,
        }
    }
}

/// Per-document linear substring scan using KMP.
///
/// Matching is substring semantics over the lowercased document text.
/// Reports every occurrence offset, overlapping ones included.
#[derive(Debug, Default)]
pub struct KmpIndex {
    texts: Vec<Vec<u8>>,
    built: bool,
}

impl KmpIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Matcher for KmpIndex {
    fn name(&self) -> &'static str {
        "kmp"
    }

    fn capability(&self) -> Capability {
        Capability::Positions
    }

    fn build(&mut self, corpus: &Corpus) -> Result<()> {
        self.texts = corpus
            .iter()
            .map(|d| d.text.to_lowercase().into_bytes())
            .collect();
        self.built = true;
        debug!(docs = self.texts.len(), "kmp scan index built");
        Ok(())
    }

    fn matching_docs(&self, term: &str) -> Result<RoaringBitmap> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let mut docs = RoaringBitmap::new();
        let pattern = term.to_lowercase();
        if pattern.is_empty() {
            return Ok(docs);
        }

        for (doc_id, doc_text) in self.texts.iter().enumerate() {
            if kmp::contains(doc_text, pattern.as_bytes()) {
                docs.insert(doc_id as DocId);
            }
        }
        Ok(docs)
    }

    fn positions(&self, term: &str, doc: DocId) -> Result<Vec<usize>> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let pattern = term.to_lowercase();
        match self.texts.get(doc as usize) {
            Some(doc_text) => Ok(kmp::find_all(doc_text, pattern.as_bytes())),
            None => Ok(Vec::new()),
        }
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.texts.len(),
            vocabulary_size: 0,
            total_postings: 0,
            text_size: self.texts.iter().map(Vec::len).sum(),
        }
    }
}
