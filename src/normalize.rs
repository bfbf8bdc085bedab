//! Text normalization for labels and mentions.
//!
//! Ontology labels and mention texts go through the same transform before
//! they are compared, so "Onions, diced" and "diced onion" end up as token
//! sequences over the same stemmed vocabulary.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Words dropped before stemming.
pub const DEFAULT_STOPWORDS: &[&str] = &["the", "a", "an", "at", "by", "for", "in", "into", "on", "to"];

/// FoodOn marks default forms of some entities with this suffix.
const WHOLE_MARKER: &str = "(whole)";

/// Upper bound on stemming passes per token. Snowball settles in two or
/// three passes on real words.
const MAX_STEM_PASSES: usize = 8;

/// Deterministic text → canonical string transform.
///
/// Implementations must be total and idempotent:
/// `normalize(normalize(t)) == normalize(t)`.
pub trait Normalizer: Send + Sync {
    /// Normalize a label or mention text.
    fn normalize(&self, text: &str) -> String;

    /// Identifier of the transform, used to key cached label indexes.
    ///
    /// Two normalizers with the same version must produce identical output.
    fn version(&self) -> &str {
        "custom"
    }
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, text: &str) -> String {
        self(text)
    }
}

/// Case-folding, punctuation stripping, stopword removal, and stemming.
///
/// # Example
///
/// ```
/// use ontolink::normalize::{Normalizer, TextNormalizer};
///
/// let normalizer = TextNormalizer::new();
/// assert_eq!(normalizer.normalize("Onions, diced"), "onion dice");
/// assert_eq!(normalizer.normalize("Diced Onion"), "dice onion");
/// assert_eq!(normalizer.normalize("apple (whole)"), "appl");
/// ```
pub struct TextNormalizer {
    stemmer: Stemmer,
    stopwords: BTreeSet<String>,
    version: String,
}

impl TextNormalizer {
    /// Normalizer with the default English stopword list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stopwords(DEFAULT_STOPWORDS.iter().copied())
    }

    /// Normalizer with a custom stopword list (matched after lowercasing).
    #[must_use]
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords: BTreeSet<String> = stopwords
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();
        let version = format!(
            "snowball-en/1;stopwords={}",
            stopwords.iter().cloned().collect::<Vec<_>>().join(",")
        );
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stopwords,
            version,
        }
    }

    /// Stem a single lowercase token until the stemmer leaves it unchanged.
    #[must_use]
    pub fn stem_token(&self, token: &str) -> String {
        let mut current = token.to_string();
        for _ in 0..MAX_STEM_PASSES {
            let next = self.stemmer.stem(&current);
            if next == current {
                break;
            }
            current = next.into_owned();
        }
        current
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("stopwords", &self.stopwords)
            .field("version", &self.version)
            .finish()
    }
}

impl Normalizer for TextNormalizer {
    fn normalize(&self, text: &str) -> String {
        static NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z]+").unwrap());

        let text = text.replace(WHOLE_MARKER, " ");
        let letters_only = NON_LETTERS.replace_all(&text, " ").to_lowercase();

        letters_only
            .split_whitespace()
            .filter(|token| !self.is_stopword(token))
            .map(|token| self.stem_token(token))
            // a stem can collide with a stopword ("ons" -> "on")
            .filter(|stem| !stem.is_empty() && !self.is_stopword(stem))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_and_case() {
        let n = TextNormalizer::new();
        assert_eq!(n.normalize("Red-Onion!!"), "red onion");
        assert_eq!(n.normalize("  ONION   "), "onion");
    }

    #[test]
    fn test_stopwords_removed() {
        let n = TextNormalizer::new();
        assert_eq!(n.normalize("salt to the taste"), "salt tast");
        assert_eq!(n.normalize("the a an"), "");
    }

    #[test]
    fn test_digits_are_separators() {
        let n = TextNormalizer::new();
        assert_eq!(n.normalize("2 cups"), "cup");
        assert_eq!(n.normalize("12"), "");
    }

    #[test]
    fn test_whole_marker_removed() {
        let n = TextNormalizer::new();
        assert_eq!(n.normalize("carrot (whole)"), n.normalize("carrot"));
    }

    #[test]
    fn test_idempotent_on_examples() {
        let n = TextNormalizer::new();
        for text in [
            "Onions, diced",
            "generalizations of abilities",
            "finely chopped fresh parsley leaves",
            "ons",
            "",
        ] {
            let once = n.normalize(text);
            assert_eq!(n.normalize(&once), once, "not idempotent for {:?}", text);
        }
    }

    #[test]
    fn test_custom_stopwords_change_version() {
        let default = TextNormalizer::new();
        let custom = TextNormalizer::with_stopwords(["of"]);
        assert_ne!(default.version(), custom.version());
        assert_eq!(custom.normalize("cup of tea"), "cup tea");
    }

    #[test]
    fn test_closure_normalizer() {
        let lower = |s: &str| s.to_lowercase();
        assert_eq!(Normalizer::normalize(&lower, "ABC"), "abc");
        assert_eq!(Normalizer::version(&lower), "custom");
    }
}
