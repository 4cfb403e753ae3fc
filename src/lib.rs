//! # TXI - In-Memory Text Search Engine
//!
//! TXI indexes a corpus of short text documents and answers term and
//! substring queries through interchangeable matching backends that all
//! satisfy one contract, so callers can swap strategies without changing
//! call sites.
//!
//! ## Architecture
//!
//! - [`corpus`] - document storage and dense id assignment
//! - [`index`] - the [`Matcher`](index::Matcher) contract and every backend
//! - [`engine`] - AND/OR query orchestration over one backend
//! - [`registry`] - explicit backend name-to-constructor table
//! - [`utils`] - bloom filter, KMP, tokenization
//!
//! ## Quick Start
//!
//! ```
//! use txi::{MatchMode, SearchEngine};
//!
//! let mut engine = SearchEngine::with_backend("kgram").unwrap();
//! engine
//!     .build([
//!         ("d0", "comfortable seating legroom"),
//!         ("d1", "discomfort with narrow legroom"),
//!         ("d2", "leg space"),
//!     ])
//!     .unwrap();
//!
//! let docs = engine.search("comfort", MatchMode::All).unwrap();
//! let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
//! assert_eq!(names, ["d0", "d1"]);
//! ```
//!
//! ## Backends
//!
//! | Name | Semantics | Lookup shape |
//! |------|-----------|--------------|
//! | `scan` | exact term | linear scan baseline |
//! | `kmp` | substring | per-document KMP scan |
//! | `postings` | exact term | inverted index |
//! | `bloom` | exact term | filter probe + verification scan |
//! | `kgram` | substring | gram intersection + verification |
//! | `trie` | term prefix | trie walk + subtree union |
//! | `suffix` / `suffix-resort` | substring | suffix array range search |
//! | `aho` | multi-pattern | automaton, one pass per document |
//!
//! Everything is built once, in memory, synchronously; queries are
//! read-only after the build. There is no ranking, persistence, or
//! incremental mutation.

pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod registry;
pub mod utils;

pub use corpus::{Corpus, DocId, Document};
pub use engine::{MatchMode, SearchEngine};
pub use error::{Error, Result};
pub use index::{Capability, IndexStats, Matcher};
pub use registry::Registry;
