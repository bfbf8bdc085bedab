//! Lexical senses for the sense-path similarity strategy.
//!
//! A [`SenseInventory`] turns normalized text into a sequence of opaque
//! sense handles (one per content word) and scores pairs of senses by
//! their distance in a hypernym hierarchy. [`SenseLexicon`] is an
//! in-memory inventory in the shape of WordNet: synsets linked to their
//! hypernyms, and lemmas pointing at synsets with a part of speech.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::Normalizer;

/// Opaque handle to one lexical sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenseId(pub u32);

/// Part of speech attached to a lemma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    /// Noun.
    Noun,
    /// Verb.
    Verb,
    /// Adjective.
    Adjective,
    /// Adverb.
    Adverb,
    /// Determiners, prepositions, and everything else.
    #[serde(other)]
    Other,
}

impl PartOfSpeech {
    /// Only content words carry a sense.
    #[must_use]
    pub const fn is_content(&self) -> bool {
        !matches!(self, PartOfSpeech::Other)
    }
}

/// Source of sense sequences and sense-to-sense similarity.
pub trait SenseInventory: Send + Sync {
    /// Senses of the content words of `text`, in word order.
    ///
    /// Function words and unknown words contribute nothing, so the result
    /// may legitimately be empty.
    fn senses(&self, text: &str) -> Vec<SenseId>;

    /// Path similarity in `(0, 1]`, or `None` when the senses are unrelated.
    fn path_similarity(&self, a: SenseId, b: SenseId) -> Option<f64>;
}

/// Synset entry of the lexicon file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynsetEntry {
    /// Synset name, e.g. `onion.n.01`.
    pub id: String,
    /// Names of direct hypernyms.
    #[serde(default)]
    pub hypernyms: Vec<String>,
}

/// Lemma entry of the lexicon file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LemmaEntry {
    /// Surface lemma; normalized with the same normalizer as mentions.
    pub lemma: String,
    /// Part of speech of this reading.
    pub pos: PartOfSpeech,
    /// Synset the reading belongs to.
    pub synset: String,
}

/// On-disk lexicon format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconFile {
    /// Synsets with their hypernym links.
    pub synsets: Vec<SynsetEntry>,
    /// Lemmas, most frequent reading first.
    pub lemmas: Vec<LemmaEntry>,
}

/// WordNet-shaped in-memory sense inventory.
///
/// # Example
///
/// ```
/// use ontolink::normalize::TextNormalizer;
/// use ontolink::sense::{LexiconFile, LemmaEntry, PartOfSpeech, SenseInventory, SenseLexicon, SynsetEntry};
///
/// let file = LexiconFile {
///     synsets: vec![
///         SynsetEntry { id: "vegetable.n.01".into(), hypernyms: vec![] },
///         SynsetEntry { id: "onion.n.01".into(), hypernyms: vec!["vegetable.n.01".into()] },
///     ],
///     lemmas: vec![LemmaEntry { lemma: "onions".into(), pos: PartOfSpeech::Noun, synset: "onion.n.01".into() }],
/// };
/// let lexicon = SenseLexicon::from_file(file, &TextNormalizer::new()).unwrap();
/// assert_eq!(lexicon.senses("onion").len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SenseLexicon {
    /// Edges point from a synset to its hypernyms.
    graph: DiGraph<String, ()>,
    lemmas: HashMap<String, Vec<(PartOfSpeech, SenseId)>>,
    /// Per synset: every ancestor (itself included) with its hop distance.
    ancestors: Vec<HashMap<NodeIndex, usize>>,
}

impl SenseLexicon {
    /// Build from a parsed lexicon file, keying lemmas by `normalizer`.
    pub fn from_file(file: LexiconFile, normalizer: &dyn Normalizer) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut by_name: HashMap<String, NodeIndex> = HashMap::new();

        for synset in &file.synsets {
            if by_name.contains_key(&synset.id) {
                return Err(Error::parse(format!("duplicate synset '{}'", synset.id)));
            }
            let idx = graph.add_node(synset.id.clone());
            by_name.insert(synset.id.clone(), idx);
        }

        for synset in &file.synsets {
            let child = by_name[&synset.id];
            for hypernym in &synset.hypernyms {
                let parent = by_name.get(hypernym).ok_or_else(|| {
                    Error::parse(format!(
                        "synset '{}' names unknown hypernym '{}'",
                        synset.id, hypernym
                    ))
                })?;
                graph.add_edge(child, *parent, ());
            }
        }

        let mut lemmas: HashMap<String, Vec<(PartOfSpeech, SenseId)>> = HashMap::new();
        for entry in &file.lemmas {
            let idx = by_name.get(&entry.synset).ok_or_else(|| {
                Error::parse(format!(
                    "lemma '{}' names unknown synset '{}'",
                    entry.lemma, entry.synset
                ))
            })?;
            let key = normalizer.normalize(&entry.lemma);
            if key.is_empty() || key.contains(' ') {
                log::debug!("skipping lemma '{}' (normalized to {:?})", entry.lemma, key);
                continue;
            }
            lemmas
                .entry(key)
                .or_default()
                .push((entry.pos, SenseId(idx.index() as u32)));
        }

        let ancestors = graph
            .node_indices()
            .map(|idx| ancestor_distances(&graph, idx))
            .collect();

        Ok(Self {
            graph,
            lemmas,
            ancestors,
        })
    }

    /// Parse a JSON lexicon.
    pub fn from_json_str(json: &str, normalizer: &dyn Normalizer) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Self::from_file(file, normalizer)
    }

    /// Load a JSON lexicon from disk.
    pub fn from_path(path: impl AsRef<Path>, normalizer: &dyn Normalizer) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json, normalizer)
    }

    /// Synset name behind a handle.
    #[must_use]
    pub fn synset_name(&self, id: SenseId) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(id.0 as usize))
            .map(String::as_str)
    }

    /// Number of synsets.
    #[must_use]
    pub fn synset_count(&self) -> usize {
        self.graph.node_count()
    }
}

fn ancestor_distances(graph: &DiGraph<String, ()>, start: NodeIndex) -> HashMap<NodeIndex, usize> {
    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    distances.insert(start, 0);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        let depth = distances[&node];
        for parent in graph.neighbors_directed(node, Direction::Outgoing) {
            if !distances.contains_key(&parent) {
                distances.insert(parent, depth + 1);
                queue.push_back(parent);
            }
        }
    }
    distances
}

impl SenseInventory for SenseLexicon {
    fn senses(&self, text: &str) -> Vec<SenseId> {
        text.split_whitespace()
            .filter_map(|token| {
                self.lemmas
                    .get(token)?
                    .iter()
                    .find(|(pos, _)| pos.is_content())
                    .map(|(_, id)| *id)
            })
            .collect()
    }

    fn path_similarity(&self, a: SenseId, b: SenseId) -> Option<f64> {
        let up_a = self.ancestors.get(a.0 as usize)?;
        let up_b = self.ancestors.get(b.0 as usize)?;

        let (small, large) = if up_a.len() <= up_b.len() {
            (up_a, up_b)
        } else {
            (up_b, up_a)
        };
        let shortest = small
            .iter()
            .filter_map(|(node, da)| large.get(node).map(|db| da + db))
            .min()?;

        Some(1.0 / (shortest as f64 + 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::TextNormalizer;

    fn lexicon() -> SenseLexicon {
        let json = r#"{
            "synsets": [
                {"id": "food.n.01"},
                {"id": "vegetable.n.01", "hypernyms": ["food.n.01"]},
                {"id": "onion.n.01", "hypernyms": ["vegetable.n.01"]},
                {"id": "leek.n.01", "hypernyms": ["vegetable.n.01"]},
                {"id": "dice.v.01"}
            ],
            "lemmas": [
                {"lemma": "onion", "pos": "noun", "synset": "onion.n.01"},
                {"lemma": "leek", "pos": "noun", "synset": "leek.n.01"},
                {"lemma": "vegetable", "pos": "noun", "synset": "vegetable.n.01"},
                {"lemma": "dice", "pos": "verb", "synset": "dice.v.01"},
                {"lemma": "of", "pos": "preposition", "synset": "food.n.01"}
            ]
        }"#;
        SenseLexicon::from_json_str(json, &TextNormalizer::new()).unwrap()
    }

    #[test]
    fn test_senses_skip_unknown_and_function_words() {
        let lex = lexicon();
        let senses = lex.senses("onion of zzz leek");
        assert_eq!(senses.len(), 2);
        assert_eq!(lex.synset_name(senses[0]), Some("onion.n.01"));
        assert_eq!(lex.synset_name(senses[1]), Some("leek.n.01"));
    }

    #[test]
    fn test_path_similarity_values() {
        let lex = lexicon();
        let n = TextNormalizer::new();
        let sense = |word: &str| lex.senses(&n.normalize(word))[0];
        let onion = sense("onion");
        let leek = sense("leek");
        let veg = sense("vegetable");
        let dice = sense("dice");

        assert_eq!(lex.path_similarity(onion, onion), Some(1.0));
        assert_eq!(lex.path_similarity(onion, veg), Some(0.5));
        assert!((lex.path_similarity(onion, leek).unwrap() - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(lex.path_similarity(onion, dice), None);
    }

    #[test]
    fn test_unknown_hypernym_rejected() {
        let json = r#"{"synsets": [{"id": "a", "hypernyms": ["missing"]}], "lemmas": []}"#;
        let err = SenseLexicon::from_json_str(json, &TextNormalizer::new()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
