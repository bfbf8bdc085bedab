//! Similarity strategies for matching mentions against ontology labels.
//!
//! Every strategy has two halves: [`SimilarityStrategy::preprocess`] turns
//! normalized text into a comparison [`Representation`], and
//! [`SimilarityStrategy::score`] compares two representations. Labels are
//! preprocessed once and the result is cached on the index record, so the
//! per-mention cost is one preprocess plus one score per candidate.
//!
//! | Strategy | Representation | Score |
//! |----------|----------------|-------|
//! | [`JaccardSimilarity`] | token set | Jaccard |
//! | [`NgramSimilarity`] | set of every contiguous n-gram | Jaccard |
//! | [`SensePathSimilarity`] | content-word senses | mean best path similarity |

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sense::{SenseId, SenseInventory};

/// Which shape of representation a strategy produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    /// Set of whitespace-delimited tokens.
    TokenSet,
    /// Set of n-grams of every length.
    NgramSet,
    /// Ordered content-word senses.
    SenseSequence,
}

impl RepresentationKind {
    /// Number of kinds.
    pub const COUNT: usize = 3;

    /// Dense slot of this kind, in `0..COUNT`.
    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            RepresentationKind::TokenSet => 0,
            RepresentationKind::NgramSet => 1,
            RepresentationKind::SenseSequence => 2,
        }
    }
}

/// Preprocessed form of a text, opaque outside of its strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    /// Token set.
    Tokens(HashSet<String>),
    /// N-grams, each stored as its tokens joined by a single space.
    Ngrams(HashSet<String>),
    /// Senses in word order.
    Senses(Vec<SenseId>),
}

impl Representation {
    /// Shape of this representation.
    #[must_use]
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Representation::Tokens(_) => RepresentationKind::TokenSet,
            Representation::Ngrams(_) => RepresentationKind::NgramSet,
            Representation::Senses(_) => RepresentationKind::SenseSequence,
        }
    }

    /// True when there is nothing to compare.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Representation::Tokens(s) | Representation::Ngrams(s) => s.is_empty(),
            Representation::Senses(v) => v.is_empty(),
        }
    }
}

/// Interchangeable scoring function over preprocessed text.
///
/// Implementations must be deterministic. `score` returns `None` when the
/// inputs are degenerate and no meaningful score exists; callers treat that
/// as "no usable score", never as `0.0`.
pub trait SimilarityStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Shape of the representations this strategy produces.
    fn kind(&self) -> RepresentationKind;

    /// Turn normalized text into a comparison representation.
    fn preprocess(&self, text: &str) -> Representation;

    /// Score two representations, in `[0.0, 1.0]` when defined.
    fn score(&self, a: &Representation, b: &Representation) -> Option<f64>;
}

/// Jaccard coefficient of two sets, `0.0` if either is empty.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use ontolink::similarity::jaccard;
///
/// let a: HashSet<&str> = ["onion", "dice"].into_iter().collect();
/// let b: HashSet<&str> = ["onion"].into_iter().collect();
/// assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
/// assert_eq!(jaccard(&a, &HashSet::new()), 0.0);
/// ```
#[must_use]
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Token-set overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardSimilarity;

impl SimilarityStrategy for JaccardSimilarity {
    fn name(&self) -> &'static str {
        "jaccard"
    }

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::TokenSet
    }

    fn preprocess(&self, text: &str) -> Representation {
        Representation::Tokens(text.split_whitespace().map(str::to_string).collect())
    }

    fn score(&self, a: &Representation, b: &Representation) -> Option<f64> {
        match (a, b) {
            (Representation::Tokens(a), Representation::Tokens(b)) => Some(jaccard(a, b)),
            _ => None,
        }
    }
}

/// Every contiguous n-gram of a token slice, from unigrams up to the whole
/// slice.
///
/// The iterator is finite and cheap to clone, so a sequence can be
/// restarted by cloning it before consumption.
///
/// ```
/// use ontolink::similarity::everygrams;
///
/// let tokens = ["red", "onion", "ring"];
/// let grams: Vec<_> = everygrams(&tokens).map(|g| g.join(" ")).collect();
/// assert_eq!(
///     grams,
///     ["red", "onion", "ring", "red onion", "onion ring", "red onion ring"]
/// );
/// ```
#[must_use]
pub fn everygrams<T>(tokens: &[T]) -> Everygrams<'_, T> {
    Everygrams {
        tokens,
        n: 1,
        start: 0,
    }
}

/// Iterator returned by [`everygrams`].
#[derive(Debug)]
pub struct Everygrams<'a, T> {
    tokens: &'a [T],
    n: usize,
    start: usize,
}

impl<T> Clone for Everygrams<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens,
            n: self.n,
            start: self.start,
        }
    }
}

impl<'a, T> Iterator for Everygrams<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.n > self.tokens.len() {
            return None;
        }
        let gram = &self.tokens[self.start..self.start + self.n];
        self.start += 1;
        if self.start + self.n > self.tokens.len() {
            self.n += 1;
            self.start = 0;
        }
        Some(gram)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.tokens.len();
        if self.n > len {
            return (0, Some(0));
        }
        // windows left at the current length, then every longer length
        let current = len + 1 - self.n - self.start;
        let longer: usize = (self.n + 1..=len).map(|n| len + 1 - n).sum();
        (current + longer, Some(current + longer))
    }
}

impl<T> ExactSizeIterator for Everygrams<'_, T> {}

/// N-gram overlap: Jaccard over the sets of every contiguous n-gram.
///
/// Rewards shared word order on top of shared words: "red onion" and
/// "onion red" share both unigrams but no bigram.
#[derive(Debug, Clone, Copy, Default)]
pub struct NgramSimilarity;

impl SimilarityStrategy for NgramSimilarity {
    fn name(&self) -> &'static str {
        "ngram"
    }

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::NgramSet
    }

    fn preprocess(&self, text: &str) -> Representation {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        Representation::Ngrams(everygrams(&tokens).map(|gram| gram.join(" ")).collect())
    }

    fn score(&self, a: &Representation, b: &Representation) -> Option<f64> {
        match (a, b) {
            (Representation::Ngrams(a), Representation::Ngrams(b)) => Some(jaccard(a, b)),
            _ => None,
        }
    }
}

/// Sense-path similarity over content-word senses.
///
/// For each sense of the first text, take its best path similarity against
/// any sense of the second, then average. Asymmetric. Undefined when either
/// side has no senses, or when no sense of the first text relates to any
/// sense of the second.
#[derive(Clone)]
pub struct SensePathSimilarity {
    inventory: Arc<dyn SenseInventory>,
}

impl SensePathSimilarity {
    /// Score with senses from `inventory`.
    pub fn new(inventory: Arc<dyn SenseInventory>) -> Self {
        Self { inventory }
    }
}

impl fmt::Debug for SensePathSimilarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensePathSimilarity").finish_non_exhaustive()
    }
}

impl SimilarityStrategy for SensePathSimilarity {
    fn name(&self) -> &'static str {
        "wordnet-path"
    }

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::SenseSequence
    }

    fn preprocess(&self, text: &str) -> Representation {
        Representation::Senses(self.inventory.senses(text))
    }

    fn score(&self, a: &Representation, b: &Representation) -> Option<f64> {
        let (Representation::Senses(a), Representation::Senses(b)) = (a, b) else {
            return None;
        };
        if a.is_empty() || b.is_empty() {
            return None;
        }

        let mut total = 0.0;
        let mut counted = 0usize;
        for &sense in a {
            let best = b
                .iter()
                .filter_map(|&other| self.inventory.path_similarity(sense, other))
                .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))));
            if let Some(best) = best {
                total += best;
                counted += 1;
            }
        }

        if counted == 0 {
            None
        } else {
            Some(total / counted as f64)
        }
    }
}

/// Strategy selector, as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Token-set overlap.
    #[default]
    Jaccard,
    /// N-gram overlap.
    Ngram,
    /// Sense-path similarity; needs a sense inventory.
    WordnetPath,
}

impl StrategyKind {
    /// Map a one-letter code (`j`, `e`, `w`, any case) to a strategy.
    ///
    /// Anything unrecognized selects [`StrategyKind::Jaccard`].
    ///
    /// ```
    /// use ontolink::similarity::StrategyKind;
    ///
    /// assert_eq!(StrategyKind::from_short_code("E"), StrategyKind::Ngram);
    /// assert_eq!(StrategyKind::from_short_code("w"), StrategyKind::WordnetPath);
    /// assert_eq!(StrategyKind::from_short_code("x"), StrategyKind::Jaccard);
    /// ```
    #[must_use]
    pub fn from_short_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "e" => StrategyKind::Ngram,
            "w" => StrategyKind::WordnetPath,
            _ => StrategyKind::Jaccard,
        }
    }

    /// Long name (`jaccard`, `ngram`, `wordnet-path`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Jaccard => "jaccard",
            StrategyKind::Ngram => "ngram",
            StrategyKind::WordnetPath => "wordnet-path",
        }
    }

    /// Instantiate the strategy.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when `WordnetPath` is requested without a
    /// sense inventory.
    pub fn build(
        &self,
        senses: Option<Arc<dyn SenseInventory>>,
    ) -> Result<Box<dyn SimilarityStrategy>> {
        match self {
            StrategyKind::Jaccard => Ok(Box::new(JaccardSimilarity)),
            StrategyKind::Ngram => Ok(Box::new(NgramSimilarity)),
            StrategyKind::WordnetPath => senses
                .map(|inv| Box::new(SensePathSimilarity::new(inv)) as Box<dyn SimilarityStrategy>)
                .ok_or_else(|| {
                    Error::configuration("wordnet-path similarity requires a sense lexicon")
                }),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    /// Accepts long names and one-letter codes; unlike
    /// [`StrategyKind::from_short_code`] this rejects unknown input.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "jaccard" | "j" => Ok(StrategyKind::Jaccard),
            "ngram" | "everygram" | "e" => Ok(StrategyKind::Ngram),
            "wordnet-path" | "wordnet" | "w" => Ok(StrategyKind::WordnetPath),
            other => Err(Error::configuration(format!(
                "unknown similarity '{}' (expected jaccard, ngram, or wordnet-path)",
                other
            ))),
        }
    }
}
