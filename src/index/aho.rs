//! Aho-Corasick multi-pattern automaton.
//!
//! Scans each document once and reports every occurrence of every
//! compiled pattern simultaneously, overlapping matches included. The
//! automaton is rebuilt from scratch on every [`AhoCorasickIndex::compile`];
//! there is no incremental pattern insertion.

use crate::corpus::{Corpus, DocId};
use crate::error::{Error, Result};
use crate::index::{Capability, IndexStats, Matcher};
use crate::utils::text;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::debug;

/// Arena index of an automaton state. State 0 is the root.
type StateId = u32;

#[derive(Debug, Default)]
struct State {
    next: FxHashMap<u8, StateId>,
    fail: StateId,
    /// Pattern indices recognized on reaching this state, failure
    /// outputs merged in at build time.
    output: Vec<u32>,
}

/// One reported occurrence: the matched pattern and its 0-based start
/// offset in the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: String,
    pub start: usize,
}

/// Multi-pattern automaton over the corpus.
///
/// As a [`Matcher`] this backend answers single-term queries by direct
/// substring scanning of the stored texts; its reason to exist is the
/// patterns API: [`compile`](Self::compile) a pattern set once, then
/// [`find_all`](Self::find_all) reports all occurrences of all patterns
/// in one linear pass per document.
#[derive(Debug, Default)]
pub struct AhoCorasickIndex {
    texts: Vec<Vec<u8>>,
    patterns: Vec<String>,
    states: Vec<State>,
    built: bool,
}

impl AhoCorasickIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile an automaton for `patterns`, replacing any prior one.
    ///
    /// Patterns are lowercased. An empty pattern is a malformed list and
    /// is rejected up front; an empty list compiles to a root-only
    /// automaton that matches nothing.
    pub fn compile<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<()> {
        if patterns.iter().any(|p| p.as_ref().is_empty()) {
            return Err(Error::usage("patterns must be non-empty"));
        }

        self.patterns = patterns.iter().map(|p| p.as_ref().to_lowercase()).collect();
        self.states = vec![State::default()];

        // Phase 1: trie of all patterns
        for (pid, pattern) in self.patterns.iter().enumerate() {
            let mut state: StateId = 0;
            for &b in pattern.as_bytes() {
                state = match self.states[state as usize].next.get(&b).copied() {
                    Some(child) => child,
                    None => {
                        let child = self.states.len() as StateId;
                        self.states.push(State::default());
                        self.states[state as usize].next.insert(b, child);
                        child
                    }
                };
            }
            self.states[state as usize].output.push(pid as u32);
        }

        // Phase 2: failure links, breadth-first from the root. Each new
        // state's failure target is found by walking its parent's
        // failure chain; the target's outputs are merged in so shorter
        // patterns ending at the same position are never missed.
        let mut queue: VecDeque<StateId> = VecDeque::new();
        let root_children: Vec<StateId> = self.states[0].next.values().copied().collect();
        for s in root_children {
            self.states[s as usize].fail = 0;
            queue.push_back(s);
        }

        while let Some(r) = queue.pop_front() {
            let transitions: Vec<(u8, StateId)> = self.states[r as usize]
                .next
                .iter()
                .map(|(&b, &s)| (b, s))
                .collect();

            for (b, s) in transitions {
                queue.push_back(s);

                let mut f = self.states[r as usize].fail;
                while f != 0 && !self.states[f as usize].next.contains_key(&b) {
                    f = self.states[f as usize].fail;
                }
                let target = self.states[f as usize].next.get(&b).copied().unwrap_or(0);

                self.states[s as usize].fail = target;
                let merged = self.states[target as usize].output.clone();
                self.states[s as usize].output.extend(merged);
            }
        }

        debug!(
            patterns = self.patterns.len(),
            states = self.states.len(),
            "automaton compiled"
        );
        Ok(())
    }

    /// All pattern occurrences in one document, in text order.
    ///
    /// Single linear pass: per byte, follow failure links while no
    /// transition exists and the state is not the root, then take the
    /// transition (or stay at the root). Every output at the resulting
    /// state is emitted with `start = i + 1 - pattern_len`.
    pub fn find_all(&self, doc: DocId) -> Result<Vec<PatternMatch>> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let mut matches = Vec::new();
        let Some(doc_text) = self.texts.get(doc as usize) else {
            return Ok(matches);
        };
        if self.patterns.is_empty() {
            return Ok(matches);
        }

        let mut state: StateId = 0;
        for (i, &b) in doc_text.iter().enumerate() {
            while state != 0 && !self.states[state as usize].next.contains_key(&b) {
                state = self.states[state as usize].fail;
            }
            state = self.states[state as usize].next.get(&b).copied().unwrap_or(0);

            for &pid in &self.states[state as usize].output {
                let pattern = &self.patterns[pid as usize];
                matches.push(PatternMatch {
                    pattern: pattern.clone(),
                    start: i + 1 - pattern.len(),
                });
            }
        }
        Ok(matches)
    }

    /// The compiled pattern set.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Matcher for AhoCorasickIndex {
    fn name(&self) -> &'static str {
        "aho"
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
        debug!(docs = self.texts.len(), "automaton corpus stored");
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
            if text::contains(doc_text, pattern.as_bytes()) {
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
            Some(doc_text) => Ok(text::find_positions(doc_text, pattern.as_bytes())),
            None => Ok(Vec::new()),
        }
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.texts.len(),
            vocabulary_size: self.patterns.len(),
            total_postings: self.states.len(),
            text_size: self.texts.iter().map(Vec::len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(docs: &[(&str, &str)]) -> AhoCorasickIndex {
        let mut index = AhoCorasickIndex::new();
        index
            .build(&Corpus::from_pairs(docs.iter().copied()))
            .unwrap();
        index
    }

    fn pairs(matches: &[PatternMatch]) -> Vec<(&str, usize)> {
        matches.iter().map(|m| (m.pattern.as_str(), m.start)).collect()
    }

    #[test]
    fn test_overlapping_patterns_both_found() {
        let mut index = built(&[("d0", "xabcx")]);
        index.compile(&["ab", "bc"]).unwrap();

        let matches = index.find_all(0).unwrap();
        assert_eq!(pairs(&matches), vec![("ab", 1), ("bc", 2)]);
    }

    #[test]
    fn test_shorter_suffix_pattern_not_missed() {
        // "she" ends where "he" ends; the merged output set must report both
        let mut index = built(&[("d0", "ushers")]);
        index.compile(&["she", "he", "hers"]).unwrap();

        let matches = index.find_all(0).unwrap();
        assert_eq!(pairs(&matches), vec![("she", 1), ("he", 2), ("hers", 2)]);
    }

    #[test]
    fn test_repeated_pattern() {
        let mut index = built(&[("d0", "aaaa")]);
        index.compile(&["aa"]).unwrap();

        let matches = index.find_all(0).unwrap();
        assert_eq!(pairs(&matches), vec![("aa", 0), ("aa", 1), ("aa", 2)]);
    }

    #[test]
    fn test_case_folded_patterns_and_text() {
        let mut index = built(&[("d0", "Comfortable Seating")]);
        index.compile(&["SEAT"]).unwrap();

        let matches = index.find_all(0).unwrap();
        assert_eq!(pairs(&matches), vec![("seat", 12)]);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let mut index = built(&[("d0", "abc")]);
        assert!(matches!(index.compile(&["ab", ""]), Err(Error::Usage(_))));
    }

    #[test]
    fn test_empty_pattern_list_matches_nothing() {
        let mut index = built(&[("d0", "abc")]);
        index.compile::<&str>(&[]).unwrap();
        assert!(index.find_all(0).unwrap().is_empty());
    }

    #[test]
    fn test_recompile_replaces_patterns() {
        let mut index = built(&[("d0", "abc")]);
        index.compile(&["ab"]).unwrap();
        index.compile(&["bc"]).unwrap();

        let matches = index.find_all(0).unwrap();
        assert_eq!(pairs(&matches), vec![("bc", 1)]);
    }

    #[test]
    fn test_unknown_doc_is_empty() {
        let mut index = built(&[("d0", "abc")]);
        index.compile(&["ab"]).unwrap();
        assert!(index.find_all(42).unwrap().is_empty());
    }

    #[test]
    fn test_find_all_requires_build() {
        let mut index = AhoCorasickIndex::new();
        index.compile(&["ab"]).unwrap();
        assert!(matches!(index.find_all(0), Err(Error::NotBuilt)));
    }

    #[test]
    fn test_matcher_fallback() {
        let index = built(&[("d0", "comfortable"), ("d1", "discomfort"), ("d2", "leg")]);
        let docs = index.matching_docs("comfort").unwrap();
        assert_eq!(docs.iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(index.positions("comfort", 1).unwrap(), vec![3]);
    }
}
