//! # ontolink
//!
//! Link entity mentions to ontology concepts.
//!
//! - **Index**: per-category map from normalized label to concept, built
//!   from the descendants of configured taxonomy roots
//! - **Similarity**: token-set Jaccard, every-n-gram Jaccard, or
//!   lexical-sense path similarity
//! - **Linking**: exact normalized match first, then a thresholded
//!   similarity scan with a shared memo
//! - **Batch**: BRAT, NER JSON, and TAISTI CSV readers feeding a CSV report
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ontolink::prelude::*;
//!
//! let ontology = Ontology::from_obo_str(
//!     "[Term]\nid: FOODON:00001002\nname: food product\n\n\
//!      [Term]\nid: FOODON:1\nname: onion\nis_a: FOODON:00001002\n\n\
//!      [Term]\nid: FOODON:2\nname: diced onion\nis_a: FOODON:1\n",
//! )
//! .unwrap();
//!
//! let normalizer = Arc::new(TextNormalizer::new());
//! let index = LabelIndex::build(normalizer.as_ref(), &ontology, &TaxonomyRoots::foodon());
//! let linker = Linker::new(Arc::new(index), normalizer, Box::new(JaccardSimilarity));
//!
//! let decision = linker.link(&Mention::new(SemanticCategory::Food, "Onions, diced"));
//! assert_eq!(decision.concept_id(), Some("http://purl.obolibrary.org/obo/FOODON_2"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `cli` | yes | `ontolink` binary (clap, env_logger) |
//! | `fast-lock` | yes | `parking_lot` mutex for the link memo |
//!
//! ## Concurrency
//!
//! A [`Linker`] is `Send + Sync`. Per-label representations are computed
//! once and published to every thread; concurrent lookups of the same memo
//! key wait for a single computation.

#![warn(missing_docs)]

pub mod batch;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
mod error;
pub mod index;
pub mod ingest;
pub mod linker;
pub mod normalize;
pub mod ontology;
pub mod report;
pub mod sense;
pub mod similarity;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    pub use crate::config::{LinkerConfig, MemoScope, TaxonomyRoots};
    pub use crate::error::{Error, Result};
    pub use crate::index::{CanonicalLabelRecord, LabelIndex};
    pub use crate::linker::{LinkDecision, Linker, MatchMethod, UnlinkedReason};
    pub use crate::normalize::{Normalizer, TextNormalizer};
    pub use crate::ontology::{Ontology, OntologyView};
    pub use crate::similarity::{
        JaccardSimilarity, NgramSimilarity, SensePathSimilarity, SimilarityStrategy, StrategyKind,
    };
    pub use ontolink_core::{Mention, SemanticCategory};
}

// Re-exports
pub use batch::{link_documents, BatchStats};
pub use cache::{CacheKey, IndexCache};
pub use config::{LinkerConfig, MemoScope, TaxonomyRoots};
pub use error::{Error, Result};
pub use index::{BuildStats, CanonicalLabelRecord, CategoryIndex, IndexBuilder, LabelIndex};
pub use linker::{LinkDecision, LinkMemo, Linker, MatchMethod, MemoStats, UnlinkedReason};
pub use normalize::{Normalizer, TextNormalizer};
pub use ontology::{Concept, LabeledConcept, Ontology, OntologyView};
pub use report::{ReportRow, ReportWriter};
pub use sense::{SenseId, SenseInventory, SenseLexicon};
pub use similarity::{
    JaccardSimilarity, NgramSimilarity, Representation, SensePathSimilarity, SimilarityStrategy,
    StrategyKind,
};

pub use ontolink_core::{AnnotatedDoc, Annotation, AnnotationSource, Mention, SemanticCategory};
