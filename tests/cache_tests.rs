//! Index cache tests: keys follow inputs, entries round-trip.

use std::sync::Arc;

use ontolink::cache::{CacheKey, IndexCache};
use ontolink::prelude::*;

const OBO: &str = "[Term]\nid: FOODON:00001002\nname: food product\n\n\
                   [Term]\nid: FOODON:1\nname: Diced Onion\nis_a: FOODON:00001002\n";

#[test]
fn cached_index_links_like_a_fresh_one() {
    let dir = tempfile::tempdir().unwrap();
    let cache = IndexCache::new(dir.path());
    let ontology = Ontology::from_obo_str(OBO).unwrap();
    let normalizer = Arc::new(TextNormalizer::new());
    let roots = TaxonomyRoots::foodon();
    let key = CacheKey::for_inputs(&ontology, normalizer.as_ref(), &roots);

    let fresh = cache
        .load_or_build(&key, || {
            Ok(LabelIndex::build(normalizer.as_ref(), &ontology, &roots))
        })
        .unwrap();
    let cached = cache
        .load_or_build(&key, || panic!("should come from the cache"))
        .unwrap();

    assert_eq!(fresh.total_records(), cached.total_records());
    assert_eq!(fresh.categories(), cached.categories());

    let linker = Linker::new(Arc::new(cached), normalizer, Box::new(JaccardSimilarity));
    let decision = linker.link(&Mention::new(SemanticCategory::Food, "onion, diced"));
    assert_eq!(
        decision.concept_id(),
        Some("http://purl.obolibrary.org/obo/FOODON_1")
    );
}

#[test]
fn changed_ontology_misses() {
    let normalizer = TextNormalizer::new();
    let roots = TaxonomyRoots::foodon();
    let a = Ontology::from_obo_str(OBO).unwrap();
    let b = Ontology::from_obo_str(&format!("{}\n[Term]\nid: FOODON:2\nname: leek\nis_a: FOODON:00001002\n", OBO))
        .unwrap();
    assert_ne!(
        CacheKey::for_inputs(&a, &normalizer, &roots),
        CacheKey::for_inputs(&b, &normalizer, &roots)
    );
}

#[test]
fn changed_normalizer_misses() {
    let ontology = Ontology::from_obo_str(OBO).unwrap();
    let roots = TaxonomyRoots::foodon();
    let lower = |s: &str| s.to_lowercase();
    assert_ne!(
        CacheKey::for_inputs(&ontology, &TextNormalizer::new(), &roots),
        CacheKey::for_inputs(&ontology, &lower, &roots)
    );
}
