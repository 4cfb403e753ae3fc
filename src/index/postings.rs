//! Exact-term inverted index.

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::index::{IndexStats, Matcher};
use crate::utils::text;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Hash-map inverted index: normalized term to the set of documents
/// containing it.
///
/// Build dedupes terms per document before inverting, so postings carry
/// set semantics. Lookup is a single hash probe; absent terms yield the
/// empty set, not an error. Exact-term semantics, membership only.
#[derive(Debug, Default)]
pub struct PostingsIndex {
    postings: FxHashMap<String, RoaringBitmap>,
    doc_count: usize,
    built: bool,
}

impl PostingsIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Matcher for PostingsIndex {
    fn name(&self) -> &'static str {
        "postings"
    }

    fn build(&mut self, corpus: &Corpus) -> Result<()> {
        self.postings = FxHashMap::default();
        self.doc_count = corpus.len();

        for doc in corpus.iter() {
            for term in text::unique_terms(&doc.text) {
                self.postings.entry(term).or_default().insert(doc.doc_id);
            }
        }

        self.built = true;
        debug!(
            docs = self.doc_count,
            vocabulary = self.postings.len(),
            "postings index built"
        );
        Ok(())
    }

    fn matching_docs(&self, term: &str) -> Result<RoaringBitmap> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let term = term.to_lowercase();
        Ok(self.postings.get(&term).cloned().unwrap_or_default())
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.doc_count,
            vocabulary_size: self.postings.len(),
            total_postings: self.postings.values().map(|p| p.len() as usize).sum(),
            text_size: 0,
        }
    }
}
