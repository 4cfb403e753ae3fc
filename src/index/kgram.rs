//! Character k-gram substring index.

use crate::corpus::{Corpus, DocId};
use crate::error::{Error, Result};
use crate::index::{Capability, IndexStats, Matcher};
use crate::utils::text;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Default gram length. Smaller k means more grams and more candidate
/// collisions; larger k means fewer grams but no coverage for short
/// queries.
pub const DEFAULT_K: usize = 3;

/// Postings over fixed-length byte windows of the lowercased document
/// text, answering substring queries by candidate intersection.
///
/// Grams collide across unrelated substrings, so the intersection is a
/// candidate set only: every candidate is verified by confirming the
/// literal query is a substring of the stored document text before it is
/// reported. Queries shorter than `k` bypass the postings and scan the
/// stored texts directly. Substring semantics, positions supported.
#[derive(Debug)]
pub struct KGramIndex {
    k: usize,
    postings: FxHashMap<Vec<u8>, RoaringBitmap>,
    texts: Vec<Vec<u8>>,
    built: bool,
}

impl Default for KGramIndex {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            postings: FxHashMap::default(),
            texts: Vec::new(),
            built: false,
        }
    }
}

impl KGramIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with an explicit gram length.
    ///
    /// Zero is rejected up front.
    pub fn with_k(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::usage("gram length must be positive"));
        }
        Ok(Self {
            k,
            postings: FxHashMap::default(),
            texts: Vec::new(),
            built: false,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Intersect gram postings into a candidate set. Any absent gram or
    /// empty running intersection short-circuits to None.
    fn candidates(&self, pattern: &[u8]) -> Option<RoaringBitmap> {
        let mut candidates: Option<RoaringBitmap> = None;

        for gram in pattern.windows(self.k) {
            let posting = self.postings.get(gram)?;
            candidates = Some(match candidates {
                None => posting.clone(),
                Some(acc) => acc & posting,
            });
            if candidates.as_ref().is_some_and(RoaringBitmap::is_empty) {
                return None;
            }
        }

        candidates
    }
}

impl Matcher for KGramIndex {
    fn name(&self) -> &'static str {
        "kgram"
    }

    fn capability(&self) -> Capability {
        Capability::Positions
    }

    fn build(&mut self, corpus: &Corpus) -> Result<()> {
        self.postings = FxHashMap::default();
        self.texts = Vec::with_capacity(corpus.len());

        for doc in corpus.iter() {
            let lowered = doc.text.to_lowercase().into_bytes();
            for gram in lowered.windows(self.k) {
                self.postings
                    .entry(gram.to_vec())
                    .or_default()
                    .insert(doc.doc_id);
            }
            self.texts.push(lowered);
        }

        self.built = true;
        debug!(
            docs = self.texts.len(),
            k = self.k,
            grams = self.postings.len(),
            "k-gram index built"
        );
        Ok(())
    }

    fn matching_docs(&self, term: &str) -> Result<RoaringBitmap> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let mut docs = RoaringBitmap::new();
        let pattern = term.to_lowercase();
        let pattern = pattern.as_bytes();
        if pattern.is_empty() {
            return Ok(docs);
        }

        // Queries shorter than k have no grams to intersect; scan directly
        if pattern.len() < self.k {
            for (doc_id, doc_text) in self.texts.iter().enumerate() {
                if text::contains(doc_text, pattern) {
                    docs.insert(doc_id as DocId);
                }
            }
            return Ok(docs);
        }

        let Some(candidates) = self.candidates(pattern) else {
            return Ok(docs);
        };
        debug!(term = %term, candidates = candidates.len(), "k-gram candidates");

        // Verification: drop candidates where the grams matched but the
        // literal query does not occur
        for doc_id in candidates {
            if text::contains(&self.texts[doc_id as usize], pattern) {
                docs.insert(doc_id);
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
            Some(doc_text) => Ok(text::find_positions(doc_text, pattern.as_bytes())),
            None => Ok(Vec::new()),
        }
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.texts.len(),
            vocabulary_size: self.postings.len(),
            total_postings: self.postings.values().map(|p| p.len() as usize).sum(),
            text_size: self.texts.iter().map(Vec::len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built() -> KGramIndex {
        let corpus = Corpus::from_pairs([
            ("d0", "comfortable seating legroom"),
            ("d1", "discomfort with narrow legroom"),
            ("d2", "leg space"),
        ]);
        let mut index = KGramIndex::new();
        index.build(&corpus).unwrap();
        index
    }

    #[test]
    fn test_substring_query() {
        let index = built();
        let docs = index.matching_docs("comfort").unwrap();
        assert_eq!(docs.iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_absent_gram_short_circuits() {
        let index = built();
        assert!(index.matching_docs("zebra").unwrap().is_empty());
    }

    #[test]
    fn test_short_query_falls_back_to_scan() {
        let index = built();
        // "le" is shorter than k=3; d0/d1 contain "legroom", d2 "leg"
        let docs = index.matching_docs("le").unwrap();
        assert_eq!(docs.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_verification_drops_gram_collisions() {
        // Both grams of "abcd" (k=3: "abc", "bcd") exist in the corpus,
        // but only d0 contains the literal string
        let corpus = Corpus::from_pairs([("d0", "xabcdx"), ("d1", "abc and bcd apart")]);
        let mut index = KGramIndex::new();
        index.build(&corpus).unwrap();

        let docs = index.matching_docs("abcd").unwrap();
        assert_eq!(docs.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_positions() {
        let index = built();
        assert_eq!(index.positions("legroom", 0).unwrap(), vec![20]);
        assert_eq!(index.positions("comfort", 1).unwrap(), vec![3]);
        assert!(index.positions("legroom", 2).unwrap().is_empty());
    }

    #[test]
    fn test_positions_unknown_doc_is_empty() {
        let index = built();
        assert!(index.positions("legroom", 99).unwrap().is_empty());
    }

    #[test]
    fn test_zero_k_rejected() {
        assert!(matches!(KGramIndex::with_k(0), Err(Error::Usage(_))));
    }

    #[test]
    fn test_not_built() {
        let index = KGramIndex::new();
        assert!(matches!(index.matching_docs("x"), Err(Error::NotBuilt)));
    }

    #[test]
    fn test_text_shorter_than_k() {
        let corpus = Corpus::from_pairs([("d0", "ab")]);
        let mut index = KGramIndex::new();
        index.build(&corpus).unwrap();

        // No grams indexed, but the short-query fallback still finds it
        assert_eq!(index.stats().vocabulary_size, 0);
        assert_eq!(index.matching_docs("ab").unwrap().len(), 1);
    }
}
