//! Corpus concatenation and suffix array construction.
//!
//! Documents are lowercased and joined with a sentinel byte that sorts
//! below every content byte. Two rank-doubling constructions are
//! provided; they produce the identical sorted array and differ only in
//! build cost.

use crate::corpus::{Corpus, DocId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Separates documents in the concatenated text. Sorts strictly below
/// every valid content byte.
pub const SENTINEL_BYTE: u8 = 0x00;

/// Above this text size the resort construction sorts in parallel.
const PARALLEL_SORT_THRESHOLD: usize = 100_000;

/// Document extent in the concatenated text.
#[derive(Debug, Clone, Copy)]
pub struct DocBoundary {
    pub doc_id: DocId,
    /// Start position (inclusive).
    pub start: u32,
    /// End position (exclusive, before the sentinel).
    pub end: u32,
}

/// Lowercased corpus text with sentinel separators and the boundary map
/// that recovers `(doc, local offset)` from a global position.
#[derive(Debug, Default)]
pub struct ConcatText {
    pub text: Vec<u8>,
    pub boundaries: Vec<DocBoundary>,
}

impl ConcatText {
    /// Concatenate a corpus. Empty documents contribute no text and no
    /// boundary; they have no suffixes to index.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut text = Vec::with_capacity(corpus.text_size() + corpus.len());
        let mut boundaries = Vec::with_capacity(corpus.len());

        for doc in corpus.iter() {
            let lowered = doc.text.to_lowercase();
            if lowered.is_empty() {
                continue;
            }
            let start = text.len() as u32;
            text.extend_from_slice(lowered.as_bytes());
            let end = text.len() as u32;
            text.push(SENTINEL_BYTE);
            boundaries.push(DocBoundary {
                doc_id: doc.doc_id,
                start,
                end,
            });
        }

        Self { text, boundaries }
    }

    /// Boundary of the document containing a global text position, or
    /// None for sentinel positions.
    pub fn position_to_boundary(&self, pos: u32) -> Option<&DocBoundary> {
        let idx = self
            .boundaries
            .binary_search_by(|b| {
                if pos < b.start {
                    std::cmp::Ordering::Greater
                } else if pos >= b.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()?;
        Some(&self.boundaries[idx])
    }
}

/// Which suffix array construction to run.
///
/// Both are iterative rank-doubling and yield the identical array; only
/// the per-round sorting strategy differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Construction {
    /// Counting-sort passes over equivalence classes, O(n log n).
    #[default]
    RankClasses,
    /// Full comparison re-sort every doubling round, O(n log^2 n).
    /// Sorts in parallel for large texts.
    Resort,
}

/// Build the sorted suffix array of `text`.
pub fn build_suffix_array(text: &[u8], construction: Construction) -> Vec<u32> {
    match construction {
        Construction::RankClasses => build_rank_classes(text),
        Construction::Resort => build_resort(text),
    }
}

/// Rank doubling with a full re-sort of the array at every round.
///
/// Suffix start positions are ordered by the pair
/// `(rank[i], rank[i + k])`, with -1 standing in for positions past the
/// end; ranks are then recompressed so equal pairs share a rank and the
/// sequence strictly increases with sort order. Rounds double `k` until
/// every rank is distinct.
fn build_resort(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sa: Vec<u32> = (0..n as u32).collect();
    let mut rank: Vec<i64> = text.iter().map(|&b| b as i64).collect();
    let mut tmp = vec![0i64; n];
    let mut k = 1usize;

    loop {
        let pair = |i: usize| (rank[i], if i + k < n { rank[i + k] } else { -1 });

        if n > PARALLEL_SORT_THRESHOLD {
            sa.par_sort_unstable_by_key(|&i| pair(i as usize));
        } else {
            sa.sort_unstable_by_key(|&i| pair(i as usize));
        }

        tmp[sa[0] as usize] = 0;
        for idx in 1..n {
            let cur = sa[idx] as usize;
            let prev = sa[idx - 1] as usize;
            tmp[cur] = tmp[prev] + (pair(cur) != pair(prev)) as i64;
        }
        rank.copy_from_slice(&tmp);

        if rank[sa[n - 1] as usize] as usize == n - 1 {
            break;
        }
        k <<= 1;
    }

    sa
}

/// Rank doubling that keeps equivalence classes and re-orders each round
/// with two stable counting-sort passes instead of a comparison sort.
fn build_rank_classes(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sa = vec![0usize; n];
    let mut rank = vec![0usize; n];
    let mut tmp = vec![0usize; n];

    // Round zero: counting sort by byte value
    let mut count = vec![0usize; 256];
    for &b in text {
        count[b as usize] += 1;
    }
    for i in 1..256 {
        count[i] += count[i - 1];
    }
    for i in (0..n).rev() {
        let b = text[i] as usize;
        count[b] -= 1;
        sa[count[b]] = i;
    }

    rank[sa[0]] = 0;
    let mut classes = 1usize;
    for i in 1..n {
        if text[sa[i]] != text[sa[i - 1]] {
            classes += 1;
        }
        rank[sa[i]] = classes - 1;
    }

    let mut k = 1usize;
    while classes < n {
        // Order by the second pair element: positions whose second half
        // runs past the end (key -1) sort first, then the rest follow
        // the current suffix order shifted left by k.
        let mut order = Vec::with_capacity(n);
        order.extend(n.saturating_sub(k)..n);
        for &j in &sa {
            if j >= k {
                order.push(j - k);
            }
        }

        // Stable counting sort by the first pair element
        let mut count = vec![0usize; classes];
        for &r in &rank {
            count[r] += 1;
        }
        let mut pos = vec![0usize; classes];
        let mut sum = 0;
        for (c, p) in pos.iter_mut().enumerate() {
            *p = sum;
            sum += count[c];
        }
        for &i in &order {
            sa[pos[rank[i]]] = i;
            pos[rank[i]] += 1;
        }

        // Recompress ranks from adjacent pair comparisons
        let pair = |i: usize| (rank[i], if i + k < n { rank[i + k] as i64 } else { -1 });
        tmp[sa[0]] = 0;
        let mut new_classes = 1usize;
        for idx in 1..n {
            if pair(sa[idx]) != pair(sa[idx - 1]) {
                new_classes += 1;
            }
            tmp[sa[idx]] = new_classes - 1;
        }
        std::mem::swap(&mut rank, &mut tmp);
        classes = new_classes;
        k <<= 1;
    }

    sa.into_iter().map(|i| i as u32).collect()
}
