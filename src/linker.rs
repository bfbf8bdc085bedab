//! Mention → concept linking.
//!
//! # Algorithm
//!
//! For a mention of category `c` with text `t`:
//!
//! 1. Normalize `t`.
//! 2. **Exact match**: if `c` is indexed and has the normalized text as a
//!    key, that record wins outright. No threshold, no strategy call, and
//!    the memo is not touched.
//! 3. **Memo**: a decision already made for this key is returned as is.
//! 4. **Missing category**: `c` not indexed → unlinked.
//! 5. **Scan**: score every record of `c` in insertion order. A record
//!    becomes the running best when `score > threshold` and
//!    `score >= best` (so later records win ties). A score of exactly
//!    `1.0` stops the scan.
//! 6. Memoize the decision.
//!
//! Undefined scores (see [`SimilarityStrategy::score`]) are skipped; they
//! are never compared with the threshold or the running best.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use ontolink_core::{Mention, SemanticCategory};

use crate::config::{is_valid_threshold, LinkerConfig, MemoScope, DEFAULT_THRESHOLD};
use crate::error::Result;
use crate::index::{CanonicalLabelRecord, CategoryIndex, LabelIndex};
use crate::normalize::Normalizer;
use crate::sense::SenseInventory;
use crate::similarity::SimilarityStrategy;

/// How a linked mention was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    /// Normalized text equals an indexed normalized label.
    Exact,
    /// Best candidate of the similarity scan.
    Similarity,
}

/// Why a mention was not linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnlinkedReason {
    /// The mention's category has no label index.
    MissingCategoryIndex,
    /// No candidate scored above the threshold.
    BelowThreshold,
    /// The configured threshold for the category is unusable.
    InvalidThreshold,
}

/// Outcome of linking one mention.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkDecision {
    /// Matched a canonical label.
    Linked {
        /// The matched record.
        record: Arc<CanonicalLabelRecord>,
        /// Similarity score (`1.0` for exact matches).
        score: f64,
        /// How the match was found.
        method: MatchMethod,
    },
    /// Explicitly unlinked.
    Unlinked(UnlinkedReason),
}

impl LinkDecision {
    /// True for a match.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, LinkDecision::Linked { .. })
    }

    /// The matched record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&CanonicalLabelRecord> {
        match self {
            LinkDecision::Linked { record, .. } => Some(record),
            LinkDecision::Unlinked(_) => None,
        }
    }

    /// Concept IRI of the match, if any.
    #[must_use]
    pub fn concept_id(&self) -> Option<&str> {
        self.record().map(CanonicalLabelRecord::concept_id)
    }

    /// Match method, if linked.
    #[must_use]
    pub fn method(&self) -> Option<MatchMethod> {
        match self {
            LinkDecision::Linked { method, .. } => Some(*method),
            LinkDecision::Unlinked(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    category: Option<SemanticCategory>,
    text: String,
}

/// Hit/miss counters of a [`LinkMemo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Lookups answered from the memo.
    pub hits: u64,
    /// Lookups that computed a new decision.
    pub misses: u64,
    /// Distinct keys stored.
    pub entries: usize,
}

#[cfg(feature = "fast-lock")]
type MemoMutex<T> = parking_lot::Mutex<T>;
#[cfg(not(feature = "fast-lock"))]
type MemoMutex<T> = std::sync::Mutex<T>;

type MemoEntries = HashMap<MemoKey, Arc<OnceCell<LinkDecision>>>;

/// Per-run memo of similarity decisions.
///
/// Each key owns a compute-once cell: concurrent lookups of the same key
/// wait for a single computation instead of racing. The map lock is held
/// only long enough to fetch or insert the cell.
#[derive(Debug)]
pub struct LinkMemo {
    scope: MemoScope,
    entries: MemoMutex<MemoEntries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LinkMemo {
    /// Empty memo keyed according to `scope`.
    #[must_use]
    pub fn new(scope: MemoScope) -> Self {
        Self {
            scope,
            entries: MemoMutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Keying in effect.
    #[must_use]
    pub fn scope(&self) -> MemoScope {
        self.scope
    }

    #[cfg(feature = "fast-lock")]
    fn lock_entries(&self) -> parking_lot::MutexGuard<'_, MemoEntries> {
        self.entries.lock()
    }

    // Cells only ever hold finished decisions, so a poisoned map is still whole.
    #[cfg(not(feature = "fast-lock"))]
    fn lock_entries(&self) -> std::sync::MutexGuard<'_, MemoEntries> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn key(&self, category: SemanticCategory, normalized: &str) -> MemoKey {
        MemoKey {
            category: match self.scope {
                MemoScope::PerCategory => Some(category),
                MemoScope::Shared => None,
            },
            text: normalized.to_string(),
        }
    }

    /// Return the memoized decision for the key, computing it at most once.
    pub fn get_or_compute<F>(
        &self,
        category: SemanticCategory,
        normalized: &str,
        compute: F,
    ) -> LinkDecision
    where
        F: FnOnce() -> LinkDecision,
    {
        let key = self.key(category, normalized);
        let cell = {
            let mut entries = self.lock_entries();
            Arc::clone(entries.entry(key).or_default())
        };

        let mut computed = false;
        let decision = cell
            .get_or_init(|| {
                computed = true;
                compute()
            })
            .clone();

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        decision
    }

    /// Memoized decision, without computing.
    #[must_use]
    pub fn get(&self, category: SemanticCategory, normalized: &str) -> Option<LinkDecision> {
        let key = self.key(category, normalized);
        let entries = self.lock_entries();
        entries.get(&key).and_then(|cell| cell.get().cloned())
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// True when nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every decision and reset the counters.
    pub fn clear(&self) {
        self.lock_entries().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for LinkMemo {
    fn default() -> Self {
        Self::new(MemoScope::default())
    }
}

/// Links mentions against a shared [`LabelIndex`].
///
/// `Linker` is `Send + Sync`; one instance can serve many threads, sharing
/// its memo and the index's cached representations.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ontolink::index::{CanonicalLabelRecord, LabelIndex};
/// use ontolink::normalize::{Normalizer, TextNormalizer};
/// use ontolink::similarity::JaccardSimilarity;
/// use ontolink::Linker;
/// use ontolink_core::{Mention, SemanticCategory};
///
/// let normalizer = Arc::new(TextNormalizer::new());
/// let mut index = LabelIndex::new();
/// for (label, iri) in [("Onion", "X"), ("Diced Onion", "Y")] {
///     let normalized = normalizer.normalize(label);
///     index.insert(SemanticCategory::Food, CanonicalLabelRecord::new(label, iri, normalized));
/// }
///
/// let linker = Linker::new(Arc::new(index), normalizer, Box::new(JaccardSimilarity));
/// let decision = linker.link(&Mention::new(SemanticCategory::Food, "onions, diced"));
/// assert_eq!(decision.concept_id(), Some("Y"));
/// ```
pub struct Linker {
    index: Arc<LabelIndex>,
    normalizer: Arc<dyn Normalizer>,
    strategy: Box<dyn SimilarityStrategy>,
    threshold: f64,
    category_thresholds: BTreeMap<SemanticCategory, f64>,
    memo: LinkMemo,
}

impl Linker {
    /// Linker with the default threshold and a per-category memo.
    pub fn new(
        index: Arc<LabelIndex>,
        normalizer: Arc<dyn Normalizer>,
        strategy: Box<dyn SimilarityStrategy>,
    ) -> Self {
        Self {
            index,
            normalizer,
            strategy,
            threshold: DEFAULT_THRESHOLD,
            category_thresholds: BTreeMap::new(),
            memo: LinkMemo::default(),
        }
    }

    /// Linker configured from `config`.
    ///
    /// # Errors
    ///
    /// Fails if the global threshold is invalid, or the strategy needs a
    /// sense inventory and none was given.
    pub fn from_config(
        config: &LinkerConfig,
        index: Arc<LabelIndex>,
        normalizer: Arc<dyn Normalizer>,
        senses: Option<Arc<dyn SenseInventory>>,
    ) -> Result<Self> {
        config.validate()?;
        let strategy = config.strategy.build(senses)?;
        Ok(Self {
            index,
            normalizer,
            strategy,
            threshold: config.threshold,
            category_thresholds: config.category_thresholds.clone(),
            memo: LinkMemo::new(config.memo_scope),
        })
    }

    /// Set the global threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the threshold for one category.
    #[must_use]
    pub fn with_category_threshold(mut self, category: SemanticCategory, threshold: f64) -> Self {
        self.category_thresholds.insert(category, threshold);
        self
    }

    /// Replace the memo with an empty one of the given scope.
    #[must_use]
    pub fn with_memo_scope(mut self, scope: MemoScope) -> Self {
        self.memo = LinkMemo::new(scope);
        self
    }

    /// The index being linked against.
    #[must_use]
    pub fn index(&self) -> &LabelIndex {
        &self.index
    }

    /// The normalizer applied to mentions.
    #[must_use]
    pub fn normalizer(&self) -> &dyn Normalizer {
        self.normalizer.as_ref()
    }

    /// The similarity strategy.
    #[must_use]
    pub fn strategy(&self) -> &dyn SimilarityStrategy {
        self.strategy.as_ref()
    }

    /// The memo.
    #[must_use]
    pub fn memo(&self) -> &LinkMemo {
        &self.memo
    }

    /// Threshold in effect for a category.
    #[must_use]
    pub fn threshold_for(&self, category: SemanticCategory) -> f64 {
        self.category_thresholds
            .get(&category)
            .copied()
            .unwrap_or(self.threshold)
    }

    /// Link one mention. Always returns a decision.
    pub fn link(&self, mention: &Mention) -> LinkDecision {
        self.link_text(mention.category, &mention.text)
    }

    /// Link raw text under a category.
    pub fn link_text(&self, category: SemanticCategory, text: &str) -> LinkDecision {
        let normalized = self.normalizer.normalize(text);
        let category_index = self.index.category(category);

        if let Some(record) = category_index.and_then(|c| c.get(&normalized)) {
            log::trace!("{} {:?}: exact match {}", category, text, record.concept_id());
            return LinkDecision::Linked {
                record: Arc::clone(record),
                score: 1.0,
                method: MatchMethod::Exact,
            };
        }

        let decision = self.memo.get_or_compute(category, &normalized, || match category_index {
            None => LinkDecision::Unlinked(UnlinkedReason::MissingCategoryIndex),
            Some(records) => self.scan(category, &normalized, records),
        });
        log::debug!(
            "{} {:?} -> {}",
            category,
            text,
            decision.concept_id().unwrap_or("NONE")
        );
        decision
    }

    fn scan(
        &self,
        category: SemanticCategory,
        normalized: &str,
        records: &CategoryIndex,
    ) -> LinkDecision {
        let threshold = self.threshold_for(category);
        if !is_valid_threshold(threshold) {
            log::warn!(
                "threshold {} for {} is not in [0, 1]; mention {:?} left unlinked",
                threshold,
                category,
                normalized
            );
            return LinkDecision::Unlinked(UnlinkedReason::InvalidThreshold);
        }

        let strategy = self.strategy.as_ref();
        let mention_repr = strategy.preprocess(normalized);

        let mut best: Option<&Arc<CanonicalLabelRecord>> = None;
        let mut best_score = f64::NEG_INFINITY;

        for record in records.records() {
            let record_repr = record.representation_for(strategy);
            let Some(score) = strategy.score(&mention_repr, record_repr) else {
                continue;
            };
            if score.is_nan() {
                continue;
            }
            if score > threshold && score >= best_score {
                best_score = score;
                best = Some(record);
            }
            if score == 1.0 {
                break;
            }
        }

        match best {
            Some(record) => LinkDecision::Linked {
                record: Arc::clone(record),
                score: best_score,
                method: MatchMethod::Similarity,
            },
            None => LinkDecision::Unlinked(UnlinkedReason::BelowThreshold),
        }
    }
}

impl std::fmt::Debug for Linker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linker")
            .field("strategy", &self.strategy.name())
            .field("threshold", &self.threshold)
            .field("category_thresholds", &self.category_thresholds)
            .field("memo", &self.memo.stats())
            .finish_non_exhaustive()
    }
}
