//! Bit-array bloom filter for probabilistic term membership.
//!
//! Probes are derived from a single pair of seeded ahash computations via
//! double hashing, which keeps insertion and lookup cache-friendly while
//! still giving `k` independent-enough bit positions per term.

use ahash::RandomState;
use std::hash::{BuildHasher, Hasher};

/// A space-efficient probabilistic set of terms.
///
/// A negative answer is exact; a positive answer may be a false positive
/// and requires external verification. Bits are only ever set, never
/// cleared, for the lifetime of the filter.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array stored as u64 words for efficient access
    bits: Vec<u64>,
    /// Number of bits in the filter
    num_bits: usize,
    /// Number of probe positions per term
    num_hashes: u32,
}

impl BloomFilter {
    /// Create a filter with an explicit bit count and probe count.
    ///
    /// The bit count is rounded up to a whole number of u64 words.
    /// Callers validate that both parameters are positive.
    pub fn new(num_bits: usize, num_hashes: u32) -> Self {
        let num_words = num_bits.max(1).div_ceil(64);
        Self {
            bits: vec![0u64; num_words],
            num_bits: num_words * 64,
            num_hashes: num_hashes.max(1),
        }
    }

    /// Create a filter sized for an expected element count and target
    /// false-positive rate.
    ///
    /// Uses `m = -n * ln(p) / ln(2)^2` bits and `k = (m/n) * ln(2)` probes.
    pub fn optimal(expected_elements: usize, false_positive_rate: f64) -> Self {
        let n = expected_elements.max(1) as f64;
        let p = false_positive_rate.clamp(0.0001, 0.5);
        let ln2_sq = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let num_bits = ((-n * p.ln()) / ln2_sq).ceil() as usize;
        let num_bits = num_bits.max(64);

        let num_hashes = ((num_bits as f64 / n) * std::f64::consts::LN_2).round() as u32;
        Self::new(num_bits, num_hashes.clamp(1, 16))
    }

    /// Insert a term by setting its probe bits.
    #[inline]
    pub fn insert(&mut self, term: &str) {
        let (h1, h2) = self.hash_pair(term);

        for i in 0..self.num_hashes as u64 {
            // Double hashing: h(i) = h1 + i*h2
            let hash = h1.wrapping_add(i.wrapping_mul(h2));
            let bit_index = (hash as usize) % self.num_bits;
            self.bits[bit_index / 64] |= 1u64 << (bit_index % 64);
        }
    }

    /// Check whether a term might be in the set.
    /// Returns false if definitely absent, true if possibly present.
    #[inline]
    pub fn might_contain(&self, term: &str) -> bool {
        let (h1, h2) = self.hash_pair(term);

        for i in 0..self.num_hashes as u64 {
            let hash = h1.wrapping_add(i.wrapping_mul(h2));
            let bit_index = (hash as usize) % self.num_bits;

            if (self.bits[bit_index / 64] & (1u64 << (bit_index % 64))) == 0 {
                return false;
            }
        }
        true
    }

    /// Compute two hash values for double hashing.
    ///
    /// Two independently seeded hashers; reusing one hasher after
    /// finish() corrupts the distribution.
    #[inline]
    fn hash_pair(&self, term: &str) -> (u64, u64) {
        let mut hasher1 = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
        hasher1.write(term.as_bytes());
        let h1 = hasher1.finish();

        let mut hasher2 = RandomState::with_seeds(
            0x517cc1b727220a95,
            0x9e3779b97f4a7c15,
            0xbf58476d1ce4e5b9,
            0x94d049bb133111eb,
        )
        .build_hasher();
        hasher2.write(term.as_bytes());
        let h2 = hasher2.finish();

        (h1, h2)
    }

    /// Number of bits in the filter.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of probe positions per term.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Number of bits currently set.
    pub fn bits_set(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Fraction of bits set. Higher means more collisions.
    pub fn load_factor(&self) -> f64 {
        self.bits_set() as f64 / self.num_bits as f64
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.bits.len() * 8 + std::mem::size_of::<Self>()
    }
}
