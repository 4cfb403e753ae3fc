//! Explicit backend registry.
//!
//! A name-to-constructor table populated at startup, so tooling can
//! enumerate and instantiate backends without any runtime type
//! introspection.

use crate::error::{Error, Result};
use crate::index::{
    AhoCorasickIndex, BloomIndex, Construction, KGramIndex, KmpIndex, Matcher, PostingsIndex,
    ScanIndex, SuffixIndex, TrieIndex,
};
use rustc_hash::FxHashMap;

type Constructor = fn() -> Box<dyn Matcher>;

/// Mapping from backend name to constructor.
pub struct Registry {
    backends: FxHashMap<&'static str, Constructor>,
}

impl Registry {
    /// A registry with no backends registered.
    pub fn empty() -> Self {
        Self {
            backends: FxHashMap::default(),
        }
    }

    /// Register (or replace) a backend under a name.
    pub fn register(&mut self, name: &'static str, constructor: Constructor) {
        self.backends.insert(name, constructor);
    }

    /// Instantiate a backend by name.
    pub fn create(&self, name: &str) -> Result<Box<dyn Matcher>> {
        match self.backends.get(name) {
            Some(constructor) => Ok(constructor()),
            None => Err(Error::UnknownBackend(name.to_string())),
        }
    }

    /// Registered names, sorted for stable display.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.backends.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    /// The full backend table.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("scan", || Box::new(ScanIndex::new()));
        registry.register("kmp", || Box::new(KmpIndex::new()));
        registry.register("postings", || Box::new(PostingsIndex::new()));
        registry.register("bloom", || Box::new(BloomIndex::new()));
        registry.register("kgram", || Box::new(KGramIndex::new()));
        registry.register("trie", || Box::new(TrieIndex::new()));
        registry.register("suffix", || Box::new(SuffixIndex::new()));
        registry.register("suffix-resort", || {
            Box::new(SuffixIndex::with_construction(Construction::Resort))
        });
        registry.register("aho", || Box::new(AhoCorasickIndex::new()));
        registry
    }
}
