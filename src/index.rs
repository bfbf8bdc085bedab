//! Label index: per category, normalized label → canonical label record.
//!
//! Built once per ontology load and shared read-only by every linking
//! call. The only mutation after construction is the compute-once cache of
//! each record's comparison representations, one per representation kind.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use ontolink_core::SemanticCategory;
use serde::{Deserialize, Serialize};

use crate::config::TaxonomyRoots;
use crate::normalize::Normalizer;
use crate::ontology::OntologyView;
use crate::similarity::{Representation, RepresentationKind, SimilarityStrategy};

/// One linkable label of a concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalLabelRecord {
    raw_label: String,
    concept_id: String,
    normalized_label: String,
    #[serde(skip)]
    representations: [OnceCell<Representation>; RepresentationKind::COUNT],
}

impl CanonicalLabelRecord {
    /// Create a record with no cached representation.
    #[must_use]
    pub fn new(
        raw_label: impl Into<String>,
        concept_id: impl Into<String>,
        normalized_label: impl Into<String>,
    ) -> Self {
        Self {
            raw_label: raw_label.into(),
            concept_id: concept_id.into(),
            normalized_label: normalized_label.into(),
            representations: Default::default(),
        }
    }

    /// Label as written in the ontology.
    #[must_use]
    pub fn raw_label(&self) -> &str {
        &self.raw_label
    }

    /// Concept IRI.
    #[must_use]
    pub fn concept_id(&self) -> &str {
        &self.concept_id
    }

    /// Normalized label; the record's key in its category.
    #[must_use]
    pub fn normalized_label(&self) -> &str {
        &self.normalized_label
    }

    /// Cached representation of the given kind, if one was computed.
    #[must_use]
    pub fn cached_representation(&self, kind: RepresentationKind) -> Option<&Representation> {
        self.representations[kind.slot()].get()
    }

    /// Representation of this label under `strategy`.
    ///
    /// Cached per representation kind, so strategies of different kinds can
    /// share an index. The first call for a kind preprocesses and publishes
    /// the result; concurrent first calls block until one of them has done so.
    pub fn representation_for(&self, strategy: &dyn SimilarityStrategy) -> &Representation {
        self.representations[strategy.kind().slot()]
            .get_or_init(|| strategy.preprocess(&self.normalized_label))
    }
}

impl PartialEq for CanonicalLabelRecord {
    fn eq(&self, other: &Self) -> bool {
        self.raw_label == other.raw_label
            && self.concept_id == other.concept_id
            && self.normalized_label == other.normalized_label
    }
}

impl Eq for CanonicalLabelRecord {}

/// Records of one category, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIndex {
    entries: IndexMap<String, Arc<CanonicalLabelRecord>>,
}

impl CategoryIndex {
    /// Exact lookup by normalized label.
    #[must_use]
    pub fn get(&self, normalized_label: &str) -> Option<&Arc<CanonicalLabelRecord>> {
        self.entries.get(normalized_label)
    }

    /// Records in insertion order. A label that was overwritten keeps the
    /// position of its first insertion.
    pub fn records(&self) -> impl Iterator<Item = &Arc<CanonicalLabelRecord>> + '_ {
        self.entries.values()
    }

    /// Number of distinct normalized labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the category has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, record: CanonicalLabelRecord) -> Option<Arc<CanonicalLabelRecord>> {
        self.entries
            .insert(record.normalized_label.clone(), Arc::new(record))
    }
}

/// Category → label map.
///
/// A category is present only if at least one of its taxonomy roots was
/// found; callers must treat absence as "nothing can link here".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelIndex {
    categories: HashMap<SemanticCategory, CategoryIndex>,
}

impl LabelIndex {
    /// An index with no categories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ontology with default builder settings.
    pub fn build(
        normalizer: &dyn Normalizer,
        ontology: &dyn OntologyView,
        roots: &TaxonomyRoots,
    ) -> Self {
        IndexBuilder::new(normalizer, roots).build(ontology)
    }

    /// Labels of a category, if the category is indexed.
    #[must_use]
    pub fn category(&self, category: SemanticCategory) -> Option<&CategoryIndex> {
        self.categories.get(&category)
    }

    /// Indexed categories, in category order.
    #[must_use]
    pub fn categories(&self) -> Vec<SemanticCategory> {
        let mut categories: Vec<_> = self.categories.keys().copied().collect();
        categories.sort();
        categories
    }

    /// Total number of records over all categories.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.categories.values().map(CategoryIndex::len).sum()
    }

    /// Mark a category as indexed, even if it ends up with no labels.
    pub fn ensure_category(&mut self, category: SemanticCategory) -> &mut CategoryIndex {
        self.categories.entry(category).or_default()
    }

    /// Insert a record under its normalized label, replacing and returning
    /// any previous record with the same key.
    pub fn insert(
        &mut self,
        category: SemanticCategory,
        record: CanonicalLabelRecord,
    ) -> Option<Arc<CanonicalLabelRecord>> {
        self.ensure_category(category).insert(record)
    }
}

/// Counters from one index build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Categories that ended up in the index.
    pub categories: usize,
    /// Distinct normalized labels over all categories.
    pub records: usize,
    /// Labels that replaced an earlier label with the same normalized form.
    pub collisions: usize,
    /// Configured roots that the ontology does not contain.
    pub missing_roots: usize,
}

/// Builds a [`LabelIndex`] from an ontology.
///
/// # Example
///
/// ```
/// use ontolink::config::TaxonomyRoots;
/// use ontolink::index::IndexBuilder;
/// use ontolink::normalize::TextNormalizer;
/// use ontolink::ontology::Ontology;
/// use ontolink_core::SemanticCategory;
///
/// let ontology = Ontology::from_obo_str("[Term]\nid: X:1\nname: Onions\n").unwrap();
/// let roots = TaxonomyRoots::empty()
///     .with_root(SemanticCategory::Food, "http://purl.obolibrary.org/obo/X_1");
/// let normalizer = TextNormalizer::new();
///
/// let (index, stats) = IndexBuilder::new(&normalizer, &roots).build_with_stats(&ontology);
/// assert_eq!(stats.records, 1);
/// let food = index.category(SemanticCategory::Food).unwrap();
/// assert_eq!(food.get("onion").unwrap().raw_label(), "Onions");
/// ```
pub struct IndexBuilder<'a> {
    normalizer: &'a dyn Normalizer,
    roots: &'a TaxonomyRoots,
    warn_on_collisions: bool,
}

impl<'a> IndexBuilder<'a> {
    /// Builder over the given normalizer and root table.
    pub fn new(normalizer: &'a dyn Normalizer, roots: &'a TaxonomyRoots) -> Self {
        Self {
            normalizer,
            roots,
            warn_on_collisions: false,
        }
    }

    /// Log a warning for each collision.
    #[must_use]
    pub fn warn_on_collisions(mut self, enabled: bool) -> Self {
        self.warn_on_collisions = enabled;
        self
    }

    /// Build the index.
    pub fn build(&self, ontology: &dyn OntologyView) -> LabelIndex {
        self.build_with_stats(ontology).0
    }

    /// Build the index and report what happened.
    pub fn build_with_stats(&self, ontology: &dyn OntologyView) -> (LabelIndex, BuildStats) {
        let mut index = LabelIndex::new();
        let mut stats = BuildStats::default();

        for category in self.roots.categories() {
            let mut found_root = false;
            for root in self.roots.roots(category) {
                let Some(labels) = ontology.descendant_labels(root) else {
                    log::warn!("taxonomy root {} for {} not found in ontology", root, category);
                    stats.missing_roots += 1;
                    continue;
                };
                found_root = true;
                index.ensure_category(category);

                for labeled in labels {
                    let normalized = self.normalizer.normalize(&labeled.label);
                    let record =
                        CanonicalLabelRecord::new(labeled.label, labeled.concept_id, normalized);
                    let winner = record.concept_id.clone();
                    if let Some(previous) = index.insert(category, record) {
                        stats.collisions += 1;
                        if self.warn_on_collisions {
                            log::warn!(
                                "{}: '{}' already in mapping (was {}, now {})",
                                category,
                                previous.normalized_label(),
                                previous.concept_id(),
                                winner
                            );
                        }
                    }
                }
            }
            if !found_root {
                log::warn!("{} has no resolvable taxonomy root; it will never link", category);
            }
        }

        stats.categories = index.categories.len();
        stats.records = index.total_records();
        log::info!(
            "label index built: {} categories, {} labels, {} collisions",
            stats.categories,
            stats.records,
            stats.collisions
        );
        (index, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::LabeledConcept;
    use crate::similarity::{JaccardSimilarity, NgramSimilarity, RepresentationKind};
    use std::collections::HashMap;

    struct FixedView(HashMap<&'static str, Vec<(&'static str, &'static str)>>);

    impl OntologyView for FixedView {
        fn descendant_labels(&self, root_iri: &str) -> Option<Vec<LabeledConcept>> {
            self.0.get(root_iri).map(|pairs| {
                pairs
                    .iter()
                    .map(|(label, id)| LabeledConcept {
                        label: label.to_string(),
                        concept_id: id.to_string(),
                    })
                    .collect()
            })
        }

        fn source_fingerprint(&self) -> &str {
            "fixed"
        }
    }

    fn lower(s: &str) -> String {
        s.to_lowercase()
    }

    #[test]
    fn test_collision_last_write_wins_keeps_position() {
        let view = FixedView(HashMap::from([(
            "root",
            vec![("Onion", "A"), ("Leek", "B"), ("ONION", "C")],
        )]));
        let roots = TaxonomyRoots::empty().with_root(SemanticCategory::Food, "root");
        let (index, stats) = IndexBuilder::new(&lower, &roots)
            .warn_on_collisions(true)
            .build_with_stats(&view);

        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.records, 2);
        let food = index.category(SemanticCategory::Food).unwrap();
        assert_eq!(food.get("onion").unwrap().concept_id(), "C");
        assert_eq!(food.get("onion").unwrap().raw_label(), "ONION");
        let order: Vec<&str> = food.records().map(|r| r.normalized_label()).collect();
        assert_eq!(order, vec!["onion", "leek"]);
    }

    #[test]
    fn test_unconfigured_and_unresolved_categories_absent() {
        let view = FixedView(HashMap::from([("food-root", vec![("Onion", "A")])]));
        let roots = TaxonomyRoots::empty()
            .with_root(SemanticCategory::Food, "food-root")
            .with_root(SemanticCategory::Color, "missing-root");
        let (index, stats) = IndexBuilder::new(&lower, &roots).build_with_stats(&view);

        assert!(index.category(SemanticCategory::Food).is_some());
        assert!(index.category(SemanticCategory::Color).is_none());
        assert!(index.category(SemanticCategory::Unit).is_none());
        assert_eq!(stats.missing_roots, 1);
        assert_eq!(index.categories(), vec![SemanticCategory::Food]);
    }

    #[test]
    fn test_resolved_root_without_labels_is_present_and_empty() {
        let view = FixedView(HashMap::from([("unit-root", vec![])]));
        let roots = TaxonomyRoots::empty().with_root(SemanticCategory::Unit, "unit-root");
        let index = LabelIndex::build(&lower, &view, &roots);
        assert!(index.category(SemanticCategory::Unit).unwrap().is_empty());
    }

    #[test]
    fn test_multiple_roots_merge() {
        let view = FixedView(HashMap::from([
            ("r1", vec![("Onion", "A")]),
            ("r2", vec![("Leek", "B")]),
        ]));
        let roots = TaxonomyRoots::empty()
            .with_root(SemanticCategory::Food, "r1")
            .with_root(SemanticCategory::Food, "r2");
        let index = LabelIndex::build(&lower, &view, &roots);
        assert_eq!(index.category(SemanticCategory::Food).unwrap().len(), 2);
    }

    #[test]
    fn test_representation_cached_once() {
        let record = CanonicalLabelRecord::new("Red Onion", "X", "red onion");
        assert!(record
            .cached_representation(RepresentationKind::TokenSet)
            .is_none());
        let first = record.representation_for(&JaccardSimilarity);
        let again = record.representation_for(&JaccardSimilarity);
        assert!(std::ptr::eq(first, again));
        assert_eq!(
            record.cached_representation(RepresentationKind::TokenSet),
            Some(first)
        );
    }

    #[test]
    fn test_each_kind_cached_separately() {
        let record = CanonicalLabelRecord::new("Red Onion", "X", "red onion");
        let tokens = record.representation_for(&JaccardSimilarity);
        let grams = record.representation_for(&NgramSimilarity);
        assert_eq!(tokens.kind(), RepresentationKind::TokenSet);
        assert_eq!(grams.kind(), RepresentationKind::NgramSet);
        assert_eq!(
            record
                .cached_representation(RepresentationKind::TokenSet)
                .map(Representation::kind),
            Some(RepresentationKind::TokenSet)
        );
        assert_eq!(
            record
                .cached_representation(RepresentationKind::NgramSet)
                .map(Representation::kind),
            Some(RepresentationKind::NgramSet)
        );
        assert!(std::ptr::eq(grams, record.representation_for(&NgramSimilarity)));
        assert!(record
            .cached_representation(RepresentationKind::SenseSequence)
            .is_none());
    }

    #[test]
    fn test_serde_roundtrip_drops_cache() {
        let mut index = LabelIndex::new();
        let record = CanonicalLabelRecord::new("Onion", "X", "onion");
        let _ = record.representation_for(&JaccardSimilarity);
        index.insert(SemanticCategory::Food, record);

        let json = serde_json::to_string(&index).unwrap();
        let back: LabelIndex = serde_json::from_str(&json).unwrap();
        let restored = back
            .category(SemanticCategory::Food)
            .unwrap()
            .get("onion")
            .unwrap();
        assert_eq!(restored.concept_id(), "X");
        assert!(restored
            .cached_representation(RepresentationKind::TokenSet)
            .is_none());
    }
}
