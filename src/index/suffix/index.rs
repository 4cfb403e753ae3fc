//! Suffix array backend: binary-search substring lookup.

use super::builder::{build_suffix_array, ConcatText, Construction, SENTINEL_BYTE};
use crate::corpus::{Corpus, DocId};
use crate::error::{Error, Result};
use crate::index::{Capability, IndexStats, Matcher};
use roaring::RoaringBitmap;
use tracing::info;

/// Substring backend over a sorted suffix array of the concatenated
/// corpus text.
///
/// The array is constructed eagerly at the end of `build`, so every
/// query path is read-only; an already-built index is safe to query
/// from concurrent readers. Substring semantics, positions supported.
#[derive(Debug, Default)]
pub struct SuffixIndex {
    construction: Construction,
    concat: ConcatText,
    sa: Vec<u32>,
    doc_count: usize,
    built: bool,
}

impl SuffixIndex {
    /// Index using the default rank-classes construction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index using an explicit construction variant.
    pub fn with_construction(construction: Construction) -> Self {
        Self {
            construction,
            ..Self::default()
        }
    }

    #[inline]
    fn suffix_at(&self, sa_index: usize) -> &[u8] {
        &self.concat.text[self.sa[sa_index] as usize..]
    }

    /// First index whose suffix sorts at or after `pattern`.
    fn lower_bound(&self, pattern: &[u8]) -> usize {
        let mut lo = 0;
        let mut hi = self.sa.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let suffix = self.suffix_at(mid);
            let cmp_len = pattern.len().min(suffix.len());

            if &suffix[..cmp_len] < pattern {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo
    }

    /// First index at or after `start` whose suffix does not start with
    /// `pattern`. Bounds the half-open range of pattern-prefixed
    /// suffixes without manufacturing a synthetic top-of-alphabet byte.
    fn upper_bound(&self, pattern: &[u8], start: usize) -> usize {
        let mut lo = start;
        let mut hi = self.sa.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let suffix = self.suffix_at(mid);

            if suffix.len() >= pattern.len() && &suffix[..pattern.len()] == pattern {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo
    }

    /// The `[lo, hi)` range of suffixes starting with `pattern`.
    fn search(&self, pattern: &[u8]) -> (usize, usize) {
        // A pattern containing the sentinel could only match across
        // document boundaries
        if pattern.is_empty() || pattern.contains(&SENTINEL_BYTE) {
            return (0, 0);
        }
        let lo = self.lower_bound(pattern);
        let hi = self.upper_bound(pattern, lo);
        (lo, hi)
    }
}

impl Matcher for SuffixIndex {
    fn name(&self) -> &'static str {
        match self.construction {
            Construction::RankClasses => "suffix",
            Construction::Resort => "suffix-resort",
        }
    }

    fn capability(&self) -> Capability {
        Capability::Positions
    }

    fn build(&mut self, corpus: &Corpus) -> Result<()> {
        self.concat = ConcatText::from_corpus(corpus);
        self.sa = build_suffix_array(&self.concat.text, self.construction);
        self.doc_count = corpus.len();
        self.built = true;
        info!(
            docs = self.doc_count,
            text_size = self.concat.text.len(),
            construction = ?self.construction,
            "suffix array built"
        );
        Ok(())
    }

    fn matching_docs(&self, term: &str) -> Result<RoaringBitmap> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let pattern = term.to_lowercase();
        let (lo, hi) = self.search(pattern.as_bytes());

        let mut docs = RoaringBitmap::new();
        for i in lo..hi {
            // Suffixes starting on a sentinel resolve to no document
            if let Some(boundary) = self.concat.position_to_boundary(self.sa[i]) {
                docs.insert(boundary.doc_id);
            }
        }
        Ok(docs)
    }

    fn positions(&self, term: &str, doc: DocId) -> Result<Vec<usize>> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let pattern = term.to_lowercase();
        let (lo, hi) = self.search(pattern.as_bytes());

        let mut positions = Vec::new();
        for i in lo..hi {
            let pos = self.sa[i];
            if let Some(boundary) = self.concat.position_to_boundary(pos) {
                if boundary.doc_id == doc {
                    positions.push((pos - boundary.start) as usize);
                }
            }
        }
        positions.sort_unstable();
        Ok(positions)
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.doc_count,
            vocabulary_size: 0,
            total_postings: self.sa.len(),
            text_size: self.concat.text.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::from_pairs([
            ("d0", "comfortable seating legroom"),
            ("d1", "discomfort with narrow legroom"),
            ("d2", "leg space"),
        ])
    }

    fn built(construction: Construction) -> SuffixIndex {
        let mut index = SuffixIndex::with_construction(construction);
        index.build(&corpus()).unwrap();
        index
    }

    #[test]
    fn test_substring_query() {
        for construction in [Construction::RankClasses, Construction::Resort] {
            let index = built(construction);
            let docs = index.matching_docs("comfort").unwrap();
            assert_eq!(docs.iter().collect::<Vec<_>>(), vec![0, 1]);
        }
    }

    #[test]
    fn test_no_match_is_empty() {
        let index = built(Construction::RankClasses);
        assert!(index.matching_docs("nonexistent").unwrap().is_empty());
        assert!(index.matching_docs("").unwrap().is_empty());
    }

    #[test]
    fn test_case_folded() {
        let index = built(Construction::RankClasses);
        assert_eq!(index.matching_docs("LEGROOM").unwrap().len(), 2);
    }

    #[test]
    fn test_positions() {
        let index = built(Construction::RankClasses);
        assert_eq!(index.positions("legroom", 0).unwrap(), vec![20]);
        assert_eq!(index.positions("legroom", 1).unwrap(), vec![23]);
        assert!(index.positions("legroom", 2).unwrap().is_empty());
    }

    #[test]
    fn test_overlapping_positions() {
        let mut index = SuffixIndex::new();
        index.build(&Corpus::from_pairs([("d0", "aaaa")])).unwrap();
        assert_eq!(index.positions("aa", 0).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_match_cannot_span_documents() {
        // "hello" ends d0 and "world" starts d1; the sentinel between
        // them must prevent a phantom "oworld" match
        let mut index = SuffixIndex::new();
        index
            .build(&Corpus::from_pairs([("d0", "hello"), ("d1", "world")]))
            .unwrap();
        assert!(index.matching_docs("oworld").unwrap().is_empty());
        assert!(index.matching_docs("o\u{0}w").unwrap().is_empty());
    }

    #[test]
    fn test_pattern_longer_than_any_suffix() {
        let mut index = SuffixIndex::new();
        index.build(&Corpus::from_pairs([("d0", "abc")])).unwrap();
        assert!(index.matching_docs("abcdef").unwrap().is_empty());
    }

    #[test]
    fn test_not_built() {
        let index = SuffixIndex::new();
        assert!(matches!(index.matching_docs("x"), Err(Error::NotBuilt)));
        assert!(matches!(index.positions("x", 0), Err(Error::NotBuilt)));
    }

    #[test]
    fn test_empty_corpus() {
        let mut index = SuffixIndex::new();
        index.build(&Corpus::new()).unwrap();
        assert!(index.matching_docs("anything").unwrap().is_empty());
    }

    #[test]
    fn test_names_by_construction() {
        assert_eq!(SuffixIndex::new().name(), "suffix");
        assert_eq!(
            SuffixIndex::with_construction(Construction::Resort).name(),
            "suffix-resort"
        );
    }
}
