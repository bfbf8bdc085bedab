//! Linker configuration.
//!
//! Everything that used to be a global default (threshold, similarity
//! selection, which taxonomy each category links into) is an explicit value
//! here, handed to the index builder and the linker at construction.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ontolink_core::SemanticCategory;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::similarity::StrategyKind;

/// Default minimum similarity a candidate must exceed.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// FoodOn "food product" class.
pub const FOODON_FOOD_ROOT: &str = "http://purl.obolibrary.org/obo/FOODON_00001002";

/// BFO "entity", the top of the process taxonomy in FoodOn.
pub const BFO_ENTITY_ROOT: &str = "http://purl.obolibrary.org/obo/BFO_0000001";

/// Which taxonomy roots each category may link into.
///
/// Categories without an entry get no label index and never link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonomyRoots(BTreeMap<SemanticCategory, Vec<String>>);

impl TaxonomyRoots {
    /// A table with no roots at all.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// FoodOn roots for `Food` and `Process`.
    #[must_use]
    pub fn foodon() -> Self {
        Self::empty()
            .with_root(SemanticCategory::Food, FOODON_FOOD_ROOT)
            .with_root(SemanticCategory::Process, BFO_ENTITY_ROOT)
    }

    /// Add a root for a category.
    #[must_use]
    pub fn with_root(mut self, category: SemanticCategory, iri: impl Into<String>) -> Self {
        self.0.entry(category).or_default().push(iri.into());
        self
    }

    /// Roots configured for a category (empty if none).
    #[must_use]
    pub fn roots(&self, category: SemanticCategory) -> &[String] {
        self.0.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Categories with at least one root, in category order.
    pub fn categories(&self) -> impl Iterator<Item = SemanticCategory> + '_ {
        self.0
            .iter()
            .filter(|(_, roots)| !roots.is_empty())
            .map(|(category, _)| *category)
    }

    /// Canonical text form, stable across runs; part of the cache key.
    #[must_use]
    pub fn fingerprint_material(&self) -> String {
        self.0
            .iter()
            .map(|(category, roots)| format!("{}={}", category, roots.join(",")))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl Default for TaxonomyRoots {
    fn default() -> Self {
        Self::foodon()
    }
}

/// What the link memo is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoScope {
    /// Key on (category, normalized text).
    #[default]
    PerCategory,
    /// Key on normalized text alone: a decision made for one category is
    /// reused for the same text in any other category.
    Shared,
}

/// Linker and index-builder settings.
///
/// # Example
///
/// ```
/// use ontolink::config::{LinkerConfig, MemoScope};
/// use ontolink::similarity::StrategyKind;
///
/// let config = LinkerConfig::from_json_str(r#"{
///     "strategy": "ngram",
///     "threshold": 0.6,
///     "category_thresholds": {"PROCESS": 0.8}
/// }"#).unwrap();
/// assert_eq!(config.strategy, StrategyKind::Ngram);
/// assert_eq!(config.memo_scope, MemoScope::PerCategory);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Similarity strategy.
    pub strategy: StrategyKind,
    /// A candidate must score strictly above this to be accepted.
    pub threshold: f64,
    /// Per-category overrides of `threshold`.
    pub category_thresholds: BTreeMap<SemanticCategory, f64>,
    /// Memo keying.
    pub memo_scope: MemoScope,
    /// Log a warning for every normalized-label collision during index build.
    pub warn_on_collisions: bool,
    /// Taxonomy roots per category.
    pub roots: TaxonomyRoots,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            threshold: DEFAULT_THRESHOLD,
            category_thresholds: BTreeMap::new(),
            memo_scope: MemoScope::default(),
            warn_on_collisions: false,
            roots: TaxonomyRoots::default(),
        }
    }
}

impl LinkerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
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

    /// Set the memo scope.
    #[must_use]
    pub fn with_memo_scope(mut self, scope: MemoScope) -> Self {
        self.memo_scope = scope;
        self
    }

    /// Enable or disable collision warnings.
    #[must_use]
    pub fn with_collision_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_collisions = enabled;
        self
    }

    /// Replace the taxonomy roots.
    #[must_use]
    pub fn with_roots(mut self, roots: TaxonomyRoots) -> Self {
        self.roots = roots;
        self
    }

    /// Check the global threshold.
    ///
    /// Per-category overrides are not checked here: a bad override only
    /// disables linking for that category (see [`crate::Linker`]).
    pub fn validate(&self) -> Result<()> {
        if !is_valid_threshold(self.threshold) {
            return Err(Error::configuration(format!(
                "threshold must be a finite number in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Effective threshold for a category.
    #[must_use]
    pub fn threshold_for(&self, category: SemanticCategory) -> f64 {
        self.category_thresholds
            .get(&category)
            .copied()
            .unwrap_or(self.threshold)
    }
}

/// Thresholds live in `[0, 1]`.
#[must_use]
pub fn is_valid_threshold(threshold: f64) -> bool {
    threshold.is_finite() && (0.0..=1.0).contains(&threshold)
}
