//! Annotation readers.
//!
//! Each reader turns one annotation source into [`AnnotatedDoc`]s with
//! the raw category label preserved on every annotation; mapping labels
//! to [`ontolink_core::SemanticCategory`] happens at link time.

pub mod brat;
pub mod ner_json;
pub mod taisti_csv;

use std::path::{Path, PathBuf};

use ontolink_core::AnnotatedDoc;

use crate::error::Result;

pub use brat::{parse_brat_annotations, read_brat_folder};
pub use ner_json::{parse_ner_json, read_ner_json};
pub use taisti_csv::{read_taisti_csv, read_taisti_csv_from};

/// Where annotations come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationInput {
    /// Folder of `<n>.txt` / `<n>.ann` pairs.
    Brat(PathBuf),
    /// NER output JSON file.
    Ner(PathBuf),
    /// TAISTI dataset CSV file.
    TaistiCsv(PathBuf),
}

impl AnnotationInput {
    /// Path of the source.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            AnnotationInput::Brat(p) | AnnotationInput::Ner(p) | AnnotationInput::TaistiCsv(p) => p,
        }
    }

    /// Read every document of the source.
    pub fn read(&self) -> Result<Vec<AnnotatedDoc>> {
        let docs = match self {
            AnnotationInput::Brat(dir) => read_brat_folder(dir)?,
            AnnotationInput::Ner(file) => read_ner_json(file)?,
            AnnotationInput::TaistiCsv(file) => read_taisti_csv(file)?,
        };
        log::info!(
            "read {} documents ({} annotations) from {}",
            docs.len(),
            docs.iter().map(|d| d.annotations.len()).sum::<usize>(),
            self.path().display()
        );
        Ok(docs)
    }
}
