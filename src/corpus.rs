//! Document storage shared by the engine and every backend.

use rustc_hash::FxHashMap;

/// Unique identifier for a document in a built corpus.
///
/// Ids are dense and assigned in insertion order, which makes them usable
/// as direct indexes into per-document side tables.
pub type DocId = u32;

/// One indexed document: an external name and its raw text.
///
/// Immutable once the corpus is built. `text` is stored as provided;
/// backends normalize (lowercase) during their own build step.
#[derive(Debug, Clone)]
pub struct Document {
    pub doc_id: DocId,
    pub name: String,
    pub text: String,
}

/// An in-memory document collection with name interning.
///
/// Adding a document whose name is already present replaces that
/// document's text and reuses its id, mirroring map semantics.
#[derive(Debug, Default)]
pub struct Corpus {
    docs: Vec<Document>,
    by_name: FxHashMap<String, DocId>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from `(name, text)` pairs.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut corpus = Self::new();
        for (name, text) in pairs {
            corpus.add(name.into(), text.into());
        }
        corpus
    }

    /// Insert or replace one document, returning its id.
    pub fn add(&mut self, name: String, text: String) -> DocId {
        if let Some(&id) = self.by_name.get(&name) {
            self.docs[id as usize].text = text;
            return id;
        }
        let id = self.docs.len() as DocId;
        self.by_name.insert(name.clone(), id);
        self.docs.push(Document {
            doc_id: id,
            name,
            text,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Document by dense id. Ids handed out by this corpus are always valid.
    pub fn get(&self, doc_id: DocId) -> Option<&Document> {
        self.docs.get(doc_id as usize)
    }

    /// Resolve an external document name to its dense id.
    pub fn id_of(&self, name: &str) -> Option<DocId> {
        self.by_name.get(name).copied()
    }

    /// Documents in insertion (ascending id) order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    /// Total text size in bytes across all documents.
    pub fn text_size(&self) -> usize {
        self.docs.iter().map(|d| d.text.len()).sum()
    }
}
