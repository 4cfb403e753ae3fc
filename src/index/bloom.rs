//! Probabilistic filter backend with two-phase lookup.

use crate::corpus::{Corpus, DocId};
use crate::error::{Error, Result};
use crate::index::{IndexStats, Matcher};
use crate::utils::text;
use crate::utils::BloomFilter;
use roaring::RoaringBitmap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bloom filter sizing. Larger `bits` / more `hashes` trade memory and
/// build time for fewer false positives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BloomConfig {
    /// Bit-array size. The array is fixed-size regardless of corpus size.
    pub bits: usize,
    /// Probe positions per term.
    pub hashes: u32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            bits: 1 << 20,
            hashes: 3,
        }
    }
}

/// Filter observability: fill level and the theoretical false-positive
/// rate `(bits_set / bits)^hashes`. Advisory only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BloomStats {
    pub bits: usize,
    pub hashes: u32,
    pub bits_set: usize,
    pub load_factor: f64,
    pub theoretical_fpr: f64,
}

/// Exact-term backend fronted by a bloom filter.
///
/// Lookup is two-phase: probe the filter first, and if any probed bit is
/// unset the term is provably absent and the query finishes in O(k).
/// When every bit is set the term is only possibly present, so the
/// backend falls back to an exhaustive scan over the stored per-document
/// term sets. The asymmetry is the point of the structure: sub-linear
/// negatives, linear verified positives, and no observable false
/// positives either way.
#[derive(Debug)]
pub struct BloomIndex {
    config: BloomConfig,
    filter: BloomFilter,
    term_sets: Vec<FxHashSet<String>>,
    built: bool,
}

impl Default for BloomIndex {
    fn default() -> Self {
        let config = BloomConfig::default();
        Self {
            config,
            filter: BloomFilter::new(config.bits, config.hashes),
            term_sets: Vec::new(),
            built: false,
        }
    }
}

impl BloomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with explicit filter sizing.
    ///
    /// Non-positive sizes are rejected up front, before any work begins.
    pub fn with_config(config: BloomConfig) -> Result<Self> {
        if config.bits == 0 {
            return Err(Error::usage("bloom filter size must be positive"));
        }
        if config.hashes == 0 {
            return Err(Error::usage("bloom filter hash count must be positive"));
        }
        Ok(Self {
            config,
            filter: BloomFilter::new(config.bits, config.hashes),
            term_sets: Vec::new(),
            built: false,
        })
    }

    /// Filter-level statistics for the observability hook.
    pub fn filter_stats(&self) -> BloomStats {
        let bits_set = self.filter.bits_set();
        let load_factor = self.filter.load_factor();
        BloomStats {
            bits: self.filter.num_bits(),
            hashes: self.filter.num_hashes(),
            bits_set,
            load_factor,
            theoretical_fpr: load_factor.powi(self.filter.num_hashes() as i32),
        }
    }
}

impl Matcher for BloomIndex {
    fn name(&self) -> &'static str {
        "bloom"
    }

    fn build(&mut self, corpus: &Corpus) -> Result<()> {
        self.filter = BloomFilter::new(self.config.bits, self.config.hashes);
        self.term_sets = Vec::with_capacity(corpus.len());

        for doc in corpus.iter() {
            let terms = text::unique_terms(&doc.text);
            for term in &terms {
                self.filter.insert(term);
            }
            self.term_sets.push(terms);
        }

        self.built = true;
        debug!(
            docs = self.term_sets.len(),
            bits_set = self.filter.bits_set(),
            load_factor = self.filter.load_factor(),
            "bloom index built"
        );
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

        // Phase 1: any unset probe bit proves the term absent, O(k)
        if !self.filter.might_contain(&term) {
            debug!(term = %term, "bloom negative fast path");
            return Ok(docs);
        }

        // Phase 2: possibly present; verify against every document's
        // stored term set to eliminate false positives
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
