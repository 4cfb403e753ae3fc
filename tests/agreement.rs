//! Cross-backend agreement and end-to-end engine properties.
//!
//! Every backend answers through the same contract, so the observable
//! document sets must line up: exact-term backends agree with the scan
//! baseline, substring backends agree with each other, and the engine's
//! AND/OR combination behaves identically on top of any of them.

use txi::{Error, MatchMode, Registry, SearchEngine};

const CORPUS: &[(&str, &str)] = &[
    ("d0", "comfortable seating legroom"),
    ("d1", "discomfort with narrow legroom"),
    ("d2", "leg space"),
    ("d3", "The seat was comfortable but the cabin felt cramped"),
    ("d4", "great legroom, terrible food"),
    ("d5", "window seat with a view"),
];

fn engine(backend: &str) -> SearchEngine {
    let mut engine = SearchEngine::with_backend(backend).unwrap();
    engine.build(CORPUS.iter().copied()).unwrap();
    engine
}

fn result_names(engine: &SearchEngine, query: &str, mode: MatchMode) -> Vec<String> {
    engine
        .search(query, mode)
        .unwrap()
        .iter()
        .map(|d| d.name.clone())
        .collect()
}

#[test]
fn exact_term_backends_agree_with_scan_baseline() {
    let baseline = engine("scan");
    let others = [engine("postings"), engine("bloom")];

    let queries = [
        "legroom",
        "seat",
        "comfortable",
        "cramped",
        "nonexistent",
        "legroom seat",
        "comfortable legroom",
    ];

    for query in queries {
        for mode in [MatchMode::All, MatchMode::Any] {
            let expected = result_names(&baseline, query, mode);
            for other in &others {
                assert_eq!(
                    result_names(other, query, mode),
                    expected,
                    "{} disagrees with scan on {:?} ({:?})",
                    other.backend_name(),
                    query,
                    mode
                );
            }
        }
    }
}

#[test]
fn substring_backends_agree() {
    let backends = [
        engine("kmp"),
        engine("kgram"),
        engine("suffix"),
        engine("suffix-resort"),
    ];

    let queries = ["comfort", "leg", "room", "seat", "zzz", "ea", "cabin felt"];

    for query in queries {
        let expected = result_names(&backends[0], query, MatchMode::All);
        for backend in &backends[1..] {
            assert_eq!(
                result_names(backend, query, MatchMode::All),
                expected,
                "{} disagrees with kmp on {:?}",
                backend.backend_name(),
                query
            );
        }
    }
}

#[test]
fn substring_backends_agree_on_positions() {
    let backends = [engine("kmp"), engine("kgram"), engine("suffix")];

    for backend in &backends {
        assert_eq!(
            backend.positions("legroom", "d0").unwrap(),
            vec![20],
            "{} positions",
            backend.backend_name()
        );
        assert_eq!(backend.positions("comfort", "d1").unwrap(), vec![3]);
        assert!(backend.positions("legroom", "d2").unwrap().is_empty());
        assert!(backend.positions("legroom", "no-such-doc").unwrap().is_empty());
    }
}

#[test]
fn round_trip_example() {
    // k-gram (k = 3 default) and suffix array must both resolve
    // "comfort" to exactly the two documents containing it as a substring
    for backend in ["kgram", "suffix", "suffix-resort"] {
        let mut engine = SearchEngine::with_backend(backend).unwrap();
        engine
            .build([
                ("d0", "comfortable seating legroom"),
                ("d1", "discomfort with narrow legroom"),
                ("d2", "leg space"),
            ])
            .unwrap();

        assert_eq!(
            result_names(&engine, "comfort", MatchMode::All),
            vec!["d0", "d1"],
            "backend {backend}"
        );
    }
}

#[test]
fn and_short_circuits_to_empty() {
    for backend in Registry::default().names() {
        let engine = engine(backend);
        assert!(
            engine
                .search("legroom nonexistent", MatchMode::All)
                .unwrap()
                .is_empty(),
            "backend {backend}"
        );
    }
}

#[test]
fn kmp_reports_overlapping_offsets() {
    let mut engine = SearchEngine::with_backend("kmp").unwrap();
    engine.build([("d0", "aaaa")]).unwrap();
    assert_eq!(engine.positions("aa", "d0").unwrap(), vec![0, 1, 2]);
}

#[test]
fn every_backend_rejects_queries_before_build() {
    let registry = Registry::default();
    for name in registry.names() {
        let backend = registry.create(name).unwrap();
        assert!(
            matches!(backend.matching_docs("x"), Err(Error::NotBuilt)),
            "backend {name} answered before build"
        );
    }
}

#[test]
fn empty_result_is_not_an_error() {
    for backend in Registry::default().names() {
        let engine = engine(backend);
        let docs = engine.search("qwxyz", MatchMode::All).unwrap();
        assert!(docs.is_empty(), "backend {backend}");
    }
}

#[test]
fn invalid_match_mode_is_a_usage_error() {
    let err = "fuzzy".parse::<MatchMode>().unwrap_err();
    assert!(matches!(err, Error::Usage(_)));
    assert!(err.to_string().contains("fuzzy"));
}

#[test]
fn or_unions_across_backends_identically() {
    let exact = engine("postings");
    let expected = result_names(&exact, "seating space view", MatchMode::Any);
    assert_eq!(expected, vec!["d0", "d2", "d5"]);

    for backend in ["scan", "bloom"] {
        assert_eq!(
            result_names(&engine(backend), "seating space view", MatchMode::Any),
            expected
        );
    }
}

#[test]
fn stats_serialize() {
    let engine = engine("kgram");
    let stats = engine.stats();
    let json = serde_json::to_value(stats).unwrap();

    assert_eq!(json["doc_count"], 6);
    assert!(json["vocabulary_size"].as_u64().unwrap() > 0);
    assert!(json["text_size"].as_u64().unwrap() > 0);
}
