//! Prefix trie over document terms.

use crate::corpus::{Corpus, DocId};
use crate::error::{Error, Result};
use crate::index::{IndexStats, Matcher};
use crate::utils::text;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Arena index of a trie node. Node 0 is the root.
type NodeId = u32;

#[derive(Debug, Default)]
struct TrieNode {
    children: FxHashMap<u8, NodeId>,
    /// Documents whose term ends exactly at this node.
    docs: RoaringBitmap,
}

/// Byte trie over each document's distinct terms.
///
/// Lookup has prefix semantics, not exact-term semantics: the result is
/// the union of documents stored at the reached node and its entire
/// subtree. Subtree collection is iterative with an explicit worklist,
/// so pathological shared prefixes cannot exhaust the call stack.
/// Membership only.
#[derive(Debug)]
pub struct TrieIndex {
    nodes: Vec<TrieNode>,
    term_count: usize,
    total_postings: usize,
    doc_count: usize,
    built: bool,
}

impl Default for TrieIndex {
    fn default() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            term_count: 0,
            total_postings: 0,
            doc_count: 0,
            built: false,
        }
    }
}

impl TrieIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, term: &str, doc_id: DocId) {
        let mut node = 0;
        for &b in term.as_bytes() {
            node = match self.nodes[node as usize].children.get(&b).copied() {
                Some(child) => child,
                None => {
                    let child = self.nodes.len() as NodeId;
                    self.nodes.push(TrieNode::default());
                    self.nodes[node as usize].children.insert(b, child);
                    child
                }
            };
        }

        let docs = &mut self.nodes[node as usize].docs;
        if docs.is_empty() {
            self.term_count += 1;
        }
        if docs.insert(doc_id) {
            self.total_postings += 1;
        }
    }

    /// Walk the trie along `prefix`, or None if the walk falls off.
    fn find_node(&self, prefix: &[u8]) -> Option<NodeId> {
        let mut node = 0;
        for b in prefix {
            node = *self.nodes[node as usize].children.get(b)?;
        }
        Some(node)
    }

    /// Union of document sets at `node` and every descendant.
    fn collect_subtree(&self, node: NodeId) -> RoaringBitmap {
        let mut docs = RoaringBitmap::new();
        let mut worklist = vec![node];

        while let Some(current) = worklist.pop() {
            let current = &self.nodes[current as usize];
            docs |= &current.docs;
            worklist.extend(current.children.values().copied());
        }

        docs
    }
}

impl Matcher for TrieIndex {
    fn name(&self) -> &'static str {
        "trie"
    }

    fn build(&mut self, corpus: &Corpus) -> Result<()> {
        self.nodes = vec![TrieNode::default()];
        self.term_count = 0;
        self.total_postings = 0;
        self.doc_count = corpus.len();

        for doc in corpus.iter() {
            for term in text::unique_terms(&doc.text) {
                self.insert(&term, doc.doc_id);
            }
        }

        self.built = true;
        debug!(
            docs = self.doc_count,
            nodes = self.nodes.len(),
            terms = self.term_count,
            "trie index built"
        );
        Ok(())
    }

    fn matching_docs(&self, term: &str) -> Result<RoaringBitmap> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let prefix = term.to_lowercase();
        if prefix.is_empty() {
            return Ok(RoaringBitmap::new());
        }

        match self.find_node(prefix.as_bytes()) {
            Some(node) => Ok(self.collect_subtree(node)),
            None => Ok(RoaringBitmap::new()),
        }
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.doc_count,
            vocabulary_size: self.term_count,
            total_postings: self.total_postings,
            text_size: 0,
        }
    }
}
