//! Query orchestration over a single matching backend.

use crate::corpus::{Corpus, Document};
use crate::error::{Error, Result};
use crate::index::{Capability, IndexStats, Matcher};
use crate::registry::Registry;
use crate::utils::text;
use roaring::RoaringBitmap;
use std::str::FromStr;
use tracing::{debug, info};

/// How per-term document sets are combined into a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Every term must match a document ("and").
    All,
    /// At least one term must match ("or").
    Any,
}

impl FromStr for MatchMode {
    type Err = Error;

    /// Accepts `"and"` or `"or"`, ASCII case-insensitive. Anything else
    /// is a usage error, never a silent default.
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("and") {
            Ok(MatchMode::All)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(MatchMode::Any)
        } else {
            Err(Error::usage(format!(
                "match mode must be 'and' or 'or', got '{s}'"
            )))
        }
    }
}

/// Combines one backend with a document store and an AND/OR term policy.
///
/// `build` ingests `(name, text)` pairs, fully replacing any previously
/// built state, and builds the backend eagerly so queries never mutate.
/// Results carry no ranking; they ascend by document id, which is
/// insertion order.
pub struct SearchEngine {
    backend: Box<dyn Matcher>,
    corpus: Corpus,
    built: bool,
}

impl SearchEngine {
    pub fn new(backend: Box<dyn Matcher>) -> Self {
        Self {
            backend,
            corpus: Corpus::new(),
            built: false,
        }
    }

    /// Construct with a backend from the default registry.
    pub fn with_backend(name: &str) -> Result<Self> {
        Ok(Self::new(Registry::default().create(name)?))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn capability(&self) -> Capability {
        self.backend.capability()
    }

    /// Ingest and index a corpus, replacing all prior state.
    pub fn build<I, S, T>(&mut self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        self.corpus = Corpus::from_pairs(documents);
        self.backend.build(&self.corpus)?;
        self.built = true;
        info!(
            backend = self.backend.name(),
            docs = self.corpus.len(),
            "engine built"
        );
        Ok(())
    }

    /// Documents matching the query under the given mode, ascending by
    /// document id (insertion order). An empty or all-punctuation query
    /// matches nothing.
    ///
    /// `MatchMode::All` intersects per-term sets and short-circuits to
    /// the empty result as soon as the running intersection is empty;
    /// `MatchMode::Any` unions them.
    pub fn search(&self, query: &str, mode: MatchMode) -> Result<Vec<&Document>> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        let terms = text::tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut acc: Option<RoaringBitmap> = None;
        for term in &terms {
            let docs = self.backend.matching_docs(term)?;
            acc = Some(match (acc, mode) {
                (None, _) => docs,
                (Some(acc), MatchMode::All) => acc & docs,
                (Some(acc), MatchMode::Any) => acc | docs,
            });
            if mode == MatchMode::All && acc.as_ref().is_some_and(RoaringBitmap::is_empty) {
                debug!(term = %term, "AND intersection empty, short-circuiting");
                return Ok(Vec::new());
            }
        }

        let matched = acc.unwrap_or_default();
        Ok(matched
            .iter()
            .filter_map(|doc_id| self.corpus.get(doc_id))
            .collect())
    }

    /// Occurrence offsets of the whole query string inside one named
    /// document (raw-text contract). Unknown names yield an empty
    /// result; membership-only backends yield
    /// [`Error::PositionsUnsupported`].
    pub fn positions(&self, query: &str, doc_name: &str) -> Result<Vec<usize>> {
        if !self.built {
            return Err(Error::NotBuilt);
        }

        match self.corpus.id_of(doc_name) {
            Some(doc) => self.backend.positions(query, doc),
            None => Ok(Vec::new()),
        }
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.corpus.iter()
    }

    /// Backend statistics, advisory only.
    pub fn stats(&self) -> IndexStats {
        self.backend.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::PostingsIndex;

    fn built(backend: &str) -> SearchEngine {
        let mut engine = SearchEngine::with_backend(backend).unwrap();
        engine
            .build([
                ("d0", "comfortable seating legroom"),
                ("d1", "discomfort with narrow legroom"),
                ("d2", "leg space"),
            ])
            .unwrap();
        engine
    }

    fn names(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn test_match_mode_parse() {
        assert_eq!("and".parse::<MatchMode>().unwrap(), MatchMode::All);
        assert_eq!("OR".parse::<MatchMode>().unwrap(), MatchMode::Any);
        assert!(matches!(
            "xor".parse::<MatchMode>(),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn test_and_search() {
        let engine = built("postings");
        let docs = engine.search("narrow legroom", MatchMode::All).unwrap();
        assert_eq!(names(&docs), vec!["d1"]);
    }

    #[test]
    fn test_or_search() {
        let engine = built("postings");
        let docs = engine.search("seating space", MatchMode::Any).unwrap();
        assert_eq!(names(&docs), vec!["d0", "d2"]);
    }

    #[test]
    fn test_and_short_circuits_on_missing_term() {
        let engine = built("postings");
        let docs = engine.search("legroom nonexistent", MatchMode::All).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_empty_query() {
        let engine = built("postings");
        assert!(engine.search("", MatchMode::All).unwrap().is_empty());
        assert!(engine.search("...", MatchMode::Any).unwrap().is_empty());
    }

    #[test]
    fn test_query_is_normalized() {
        let engine = built("postings");
        let docs = engine.search("LEGROOM, narrow!", MatchMode::All).unwrap();
        assert_eq!(names(&docs), vec!["d1"]);
    }

    #[test]
    fn test_results_in_insertion_order() {
        let engine = built("postings");
        let docs = engine.search("legroom leg space seating", MatchMode::Any).unwrap();
        assert_eq!(names(&docs), vec!["d0", "d1", "d2"]);
    }

    #[test]
    fn test_search_before_build() {
        let engine = SearchEngine::new(Box::new(PostingsIndex::new()));
        assert!(matches!(
            engine.search("x", MatchMode::All),
            Err(Error::NotBuilt)
        ));
    }

    #[test]
    fn test_positions_passthrough() {
        let engine = built("suffix");
        assert_eq!(engine.positions("legroom", "d0").unwrap(), vec![20]);
        assert!(engine.positions("legroom", "missing").unwrap().is_empty());
    }

    #[test]
    fn test_positions_on_membership_backend() {
        let engine = built("postings");
        assert!(matches!(
            engine.positions("legroom", "d0"),
            Err(Error::PositionsUnsupported("postings"))
        ));
    }

    #[test]
    fn test_rebuild_replaces_corpus() {
        let mut engine = built("postings");
        engine.build([("x", "entirely new corpus")]).unwrap();

        assert!(engine.search("legroom", MatchMode::All).unwrap().is_empty());
        assert_eq!(
            names(&engine.search("corpus", MatchMode::All).unwrap()),
            vec!["x"]
        );
    }

    #[test]
    fn test_unknown_backend() {
        assert!(matches!(
            SearchEngine::with_backend("ngram"),
            Err(Error::UnknownBackend(_))
        ));
    }
}
