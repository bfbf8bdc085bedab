//! Concurrency and thread-safety tests for the linker.
//!
//! These tests verify that:
//! - Linker, index, and memo can be shared across threads
//! - Concurrent links agree with sequential links
//! - Each memo key is computed once under contention

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use ontolink::prelude::*;
use ontolink::similarity::{Representation, RepresentationKind};
use ontolink::LinkMemo;

// =============================================================================
// Thread Safety Tests
// =============================================================================

#[test]
fn linker_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Linker>();
    assert_send_sync::<LabelIndex>();
    assert_send_sync::<LinkMemo>();
    assert_send_sync::<CanonicalLabelRecord>();
}

fn fruit_linker() -> Arc<Linker> {
    let normalizer = Arc::new(TextNormalizer::new());
    let mut index = LabelIndex::new();
    for (i, label) in [
        "red onion",
        "white onion",
        "diced onion",
        "green apple",
        "apple juice",
        "orange juice",
        "orange peel",
        "garlic clove",
    ]
    .iter()
    .enumerate()
    {
        index.insert(
            SemanticCategory::Food,
            CanonicalLabelRecord::new(*label, format!("C{}", i), normalizer.normalize(label)),
        );
    }
    Arc::new(Linker::new(
        Arc::new(index),
        normalizer,
        Box::new(NgramSimilarity),
    ))
}

// =============================================================================
// Concurrent Linking Tests
// =============================================================================

#[test]
fn concurrent_links_match_sequential() {
    let mentions = [
        "onions, red",
        "juice of apples",
        "orange",
        "cloves of garlic",
        "diced onions",
        "peeled oranges",
        "kiwi",
    ];

    let sequential = fruit_linker();
    let expected: Vec<_> = mentions
        .iter()
        .map(|m| {
            sequential
                .link(&Mention::new(SemanticCategory::Food, *m))
                .concept_id()
                .map(str::to_string)
        })
        .collect();

    let shared = fruit_linker();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let linker = Arc::clone(&shared);
            thread::spawn(move || {
                mentions
                    .iter()
                    .map(|m| {
                        linker
                            .link(&Mention::new(SemanticCategory::Food, *m))
                            .concept_id()
                            .map(str::to_string)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn representations_cached_once_across_threads() {
    let linker = fruit_linker();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let linker = Arc::clone(&linker);
            thread::spawn(move || {
                linker.link(&Mention::new(SemanticCategory::Food, "onion rings"));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = linker.index().category(SemanticCategory::Food).unwrap();
    assert!(records
        .records()
        .all(|r| r
            .cached_representation(RepresentationKind::NgramSet)
            .map(Representation::kind)
            == Some(RepresentationKind::NgramSet)));
}

/// Scores slowly and counts how many scans actually run.
struct SlowCounting {
    scans: Arc<AtomicUsize>,
}

impl SimilarityStrategy for SlowCounting {
    fn name(&self) -> &'static str {
        "slow"
    }
    fn kind(&self) -> RepresentationKind {
        RepresentationKind::TokenSet
    }
    fn preprocess(&self, text: &str) -> Representation {
        JaccardSimilarity.preprocess(text)
    }
    fn score(&self, a: &Representation, b: &Representation) -> Option<f64> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        thread::sleep(std::time::Duration::from_millis(5));
        JaccardSimilarity.score(a, b)
    }
}

#[test]
fn memo_key_computed_once_under_contention() {
    let scans = Arc::new(AtomicUsize::new(0));
    let mut index = LabelIndex::new();
    index.insert(
        SemanticCategory::Food,
        CanonicalLabelRecord::new("red onion", "A", "red onion"),
    );
    let normalizer: Arc<dyn Normalizer> = Arc::new(|s: &str| s.to_string());
    let linker = Arc::new(Linker::new(
        Arc::new(index),
        normalizer,
        Box::new(SlowCounting {
            scans: Arc::clone(&scans),
        }),
    ));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let linker = Arc::clone(&linker);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                linker
                    .link(&Mention::new(SemanticCategory::Food, "onion red sweet"))
                    .concept_id()
                    .map(str::to_string)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("A"));
    }
    // one record, one scan
    assert_eq!(scans.load(Ordering::SeqCst), 1);
    let stats = linker.memo().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, threads as u64 - 1);
}
