//! Annotated documents and the mentions they carry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::SemanticCategory;
use crate::error::{Error, Result};

/// Where an annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationSource {
    /// Manual annotation export (BRAT standoff).
    Brat,
    /// Automatic recognizer output (JSON).
    Ner,
    /// Tabular dataset export (CSV with embedded entity JSON).
    TaistiCsv,
}

impl AnnotationSource {
    /// Name written to reports.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            AnnotationSource::Brat => "BRAT",
            AnnotationSource::Ner => "NER",
            AnnotationSource::TaistiCsv => "TAISTI_CSV",
        }
    }
}

impl fmt::Display for AnnotationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// A text span to resolve, with its declared category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Declared category; decides which taxonomy the mention may link into.
    pub category: SemanticCategory,
    /// Text as it appeared in the source.
    pub text: String,
}

impl Mention {
    /// Create a mention.
    #[must_use]
    pub fn new(category: SemanticCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

/// One annotation, in the format shared by every reader.
///
/// For recognizer output `file_id` is the document's position in the
/// input rather than a real file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Identifier within the file (`T3` for BRAT, an index otherwise).
    pub id: String,
    /// Numeric file/document identifier.
    pub file_id: u64,
    /// Start offset in the source text.
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Category label exactly as the source spelled it.
    pub category: String,
    /// Covered text.
    pub text: String,
    /// Origin of the annotation.
    pub source: AnnotationSource,
}

impl Annotation {
    /// Create an annotation, rejecting inverted spans.
    pub fn new(
        id: impl Into<String>,
        file_id: u64,
        start: usize,
        end: usize,
        category: impl Into<String>,
        text: impl Into<String>,
        source: AnnotationSource,
    ) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_span(format!("start {} > end {}", start, end)));
        }
        Ok(Self {
            id: id.into(),
            file_id,
            start,
            end,
            category: category.into(),
            text: text.into(),
            source,
        })
    }

    /// Category after mapping the raw label.
    #[must_use]
    pub fn semantic_category(&self) -> SemanticCategory {
        SemanticCategory::from_annotation_label(&self.category)
    }

    /// The mention to hand to the linker.
    #[must_use]
    pub fn mention(&self) -> Mention {
        Mention::new(self.semantic_category(), self.text.clone())
    }
}

/// A source document with all of its annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDoc {
    /// Document identifier.
    pub id: u64,
    /// Path the document was read from.
    pub path: String,
    /// Full text, empty when the source only ships entities.
    pub text: String,
    /// Annotations in source order.
    pub annotations: Vec<Annotation>,
}
