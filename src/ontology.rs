//! Ontology access for index construction.
//!
//! The label index only needs one question answered: for a taxonomy root,
//! which (label, concept) pairs sit at or below it? [`OntologyView`] is that
//! question; [`Ontology`] answers it from an is-a graph loaded from an OBO
//! flat file or a JSON concept list.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Base IRI for OBO Foundry CURIEs.
pub const OBO_PURL_BASE: &str = "http://purl.obolibrary.org/obo/";

/// IAO "alternative term" annotation property.
const IAO_ALTERNATIVE_TERM: &str = "IAO:0000118";

/// A label together with the concept it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabeledConcept {
    /// Human-readable label or synonym.
    pub label: String,
    /// Concept IRI.
    pub concept_id: String,
}

/// What the index builder needs from an ontology.
pub trait OntologyView {
    /// Every (label, concept) pair for the root and all of its descendants,
    /// including synonyms. `None` when the root is not in the ontology.
    fn descendant_labels(&self, root_iri: &str) -> Option<Vec<LabeledConcept>>;

    /// Stable fingerprint of the ontology source, for cache keys.
    fn source_fingerprint(&self) -> &str;
}

/// One ontology class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Full IRI.
    pub iri: String,
    /// SKOS preferred label, if any.
    #[serde(default)]
    pub pref_label: Option<String>,
    /// rdfs:label / OBO name.
    #[serde(default)]
    pub label: Option<String>,
    /// Exact, narrow, and alternative-term synonyms.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// IRIs of direct superclasses.
    #[serde(default)]
    pub parents: Vec<String>,
}

impl Concept {
    /// Best display label: preferred label, then label, then the IRI's
    /// local name.
    #[must_use]
    pub fn best_label(&self) -> &str {
        self.pref_label
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or_else(|| local_name(&self.iri))
    }

    /// Best label followed by synonyms, de-duplicated in first-seen order.
    #[must_use]
    pub fn possible_labels(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        std::iter::once(self.best_label())
            .chain(self.synonyms.iter().map(String::as_str))
            .filter(|label| seen.insert(*label))
            .collect()
    }
}

/// JSON ontology file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologyFile {
    /// All classes.
    pub concepts: Vec<Concept>,
}

/// Is-a hierarchy of concepts.
///
/// # Example
///
/// ```
/// use ontolink::ontology::{Ontology, OntologyView};
///
/// let obo = r#"
/// [Term]
/// id: FOODON:1
/// name: food
///
/// [Term]
/// id: FOODON:2
/// name: onion
/// synonym: "Allium cepa" EXACT []
/// is_a: FOODON:1 ! food
/// "#;
/// let ontology = Ontology::from_obo_str(obo).unwrap();
/// let labels = ontology
///     .descendant_labels("http://purl.obolibrary.org/obo/FOODON_1")
///     .unwrap();
/// assert_eq!(labels.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Ontology {
    /// Edges point from a class to its subclasses.
    graph: DiGraph<Concept, ()>,
    by_iri: HashMap<String, NodeIndex>,
    fingerprint: String,
}

impl Ontology {
    /// Build from concepts. Parent links to unknown IRIs are ignored.
    pub fn from_concepts(concepts: Vec<Concept>, fingerprint: impl Into<String>) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(concepts.len(), concepts.len());
        let mut by_iri = HashMap::with_capacity(concepts.len());

        for concept in concepts {
            if by_iri.contains_key(&concept.iri) {
                return Err(Error::ontology(format!("duplicate concept '{}'", concept.iri)));
            }
            let iri = concept.iri.clone();
            let idx = graph.add_node(concept);
            by_iri.insert(iri, idx);
        }

        let mut dangling = 0usize;
        let nodes: Vec<NodeIndex> = graph.node_indices().collect();
        for child in nodes {
            let parents = graph[child].parents.clone();
            for parent in parents {
                match by_iri.get(&parent) {
                    Some(&p) => {
                        graph.add_edge(p, child, ());
                    }
                    None => dangling += 1,
                }
            }
        }
        if dangling > 0 {
            log::debug!("{} parent links point outside the ontology", dangling);
        }

        Ok(Self {
            graph,
            by_iri,
            fingerprint: fingerprint.into(),
        })
    }

    /// Parse a JSON concept list.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: OntologyFile = serde_json::from_str(json)?;
        Self::from_concepts(file.concepts, sha256_hex(json.as_bytes()))
    }

    /// Parse an OBO flat file.
    pub fn from_obo_str(obo: &str) -> Result<Self> {
        let concepts = parse_obo(obo)?;
        Self::from_concepts(concepts, sha256_hex(obo.as_bytes()))
    }

    /// Load from disk: `.obo` files as OBO, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let is_obo = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("obo"));
        if is_obo {
            Self::from_obo_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    /// Look up a concept by IRI.
    #[must_use]
    pub fn concept(&self, iri: &str) -> Option<&Concept> {
        self.by_iri.get(iri).map(|&idx| &self.graph[idx])
    }

    /// Number of concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True if there are no concepts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// The root and every transitive subclass, breadth-first.
    #[must_use]
    pub fn descendants(&self, root_iri: &str) -> Option<Vec<&Concept>> {
        let &root = self.by_iri.get(root_iri)?;
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        let mut out = Vec::new();

        while let Some(node) = queue.pop_front() {
            out.push(&self.graph[node]);
            let mut children: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .collect();
            // petgraph yields the most recently added edge first
            children.reverse();
            for child in children {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        Some(out)
    }
}

impl OntologyView for Ontology {
    fn descendant_labels(&self, root_iri: &str) -> Option<Vec<LabeledConcept>> {
        let concepts = self.descendants(root_iri)?;
        Some(
            concepts
                .into_iter()
                .flat_map(|concept| {
                    concept
                        .possible_labels()
                        .into_iter()
                        .map(move |label| LabeledConcept {
                            label: label.to_string(),
                            concept_id: concept.iri.clone(),
                        })
                })
                .collect(),
        )
    }

    fn source_fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Hex-encoded SHA-256.
pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Expand an OBO CURIE (`FOODON:00001002`) to its PURL; full IRIs pass through.
#[must_use]
pub fn expand_curie(id: &str) -> String {
    if id.contains("://") {
        return id.to_string();
    }
    match id.split_once(':') {
        Some((prefix, local)) => format!("{}{}_{}", OBO_PURL_BASE, prefix, local),
        None => id.to_string(),
    }
}

fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

/// Read a double-quoted OBO string, returning it and the remainder.
fn take_quoted(value: &str) -> Option<(String, &str)> {
    let rest = value.trim_start().strip_prefix('"')?;
    let mut out = String::new();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
            }
            '"' => return Some((out, &rest[i + 1..])),
            other => out.push(other),
        }
    }
    None
}

fn strip_comment(value: &str) -> &str {
    match value.find(" !") {
        Some(pos) => value[..pos].trim_end(),
        None => value.trim_end(),
    }
}

fn parse_obo(obo: &str) -> Result<Vec<Concept>> {
    let mut concepts = Vec::new();
    let mut current: Option<Concept> = None;
    let mut in_term = false;
    let mut obsolete = false;

    fn finish(concept: Option<Concept>, obsolete: bool, concepts: &mut Vec<Concept>) {
        if let Some(concept) = concept {
            if !obsolete {
                concepts.push(concept);
            }
        }
    }

    for (lineno, raw) in obo.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') {
            finish(current.take(), obsolete, &mut concepts);
            obsolete = false;
            in_term = line == "[Term]";
            continue;
        }
        if !in_term {
            continue;
        }
        let Some((tag, value)) = line.split_once(':') else {
            return Err(Error::parse(format!(
                "line {}: expected 'tag: value', got '{}'",
                lineno + 1,
                line
            )));
        };
        let value = value.trim();
        let concept = current.get_or_insert_with(Concept::default);

        match tag {
            "id" => concept.iri = expand_curie(strip_comment(value)),
            "name" => concept.label = Some(value.to_string()),
            "synonym" => {
                let (text, rest) = take_quoted(value).ok_or_else(|| {
                    Error::parse(format!("line {}: unterminated synonym", lineno + 1))
                })?;
                let scope = rest.split_whitespace().next().unwrap_or("RELATED");
                if matches!(scope, "EXACT" | "NARROW") {
                    concept.synonyms.push(text);
                }
            }
            "property_value" => {
                if let Some(rest) = value.strip_prefix(IAO_ALTERNATIVE_TERM) {
                    if let Some((text, _)) = take_quoted(rest) {
                        concept.synonyms.push(text);
                    }
                }
            }
            "is_a" => {
                let parent = strip_comment(value);
                // skip qualifiers like `{source="..."}`
                let parent = parent.split_whitespace().next().unwrap_or(parent);
                concept.parents.push(expand_curie(parent));
            }
            "is_obsolete" => obsolete = value == "true",
            _ => {}
        }
    }
    finish(current.take(), obsolete, &mut concepts);

    if let Some(missing) = concepts.iter().position(|c| c.iri.is_empty()) {
        return Err(Error::parse(format!("term #{} has no id", missing + 1)));
    }
    Ok(concepts)
}
