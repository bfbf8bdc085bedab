//! NER output JSON.
//!
//! ```json
//! [
//!   { "text": "diced onion",
//!     "entities_list": [{ "start": 6, "end": 11, "label": "FOOD", "text": "onion" }] }
//! ]
//! ```
//!
//! Documents are numbered by position; annotation ids are the entity's
//! position within its document.

use std::fs;
use std::path::Path;

use ontolink_core::{AnnotatedDoc, Annotation, AnnotationSource};
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
struct NerDocument {
    #[serde(default)]
    text: String,
    entities_list: Vec<NerEntity>,
}

#[derive(Debug, Deserialize)]
struct NerEntity {
    start: usize,
    end: usize,
    label: String,
    text: String,
}

/// Read an NER output file.
pub fn read_ner_json(path: impl AsRef<Path>) -> Result<Vec<AnnotatedDoc>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    parse_ner_json(&json, &path.display().to_string())
}

/// Parse NER output; `path` is recorded on every document.
pub fn parse_ner_json(json: &str, path: &str) -> Result<Vec<AnnotatedDoc>> {
    let documents: Vec<NerDocument> = serde_json::from_str(json)?;

    documents
        .into_iter()
        .enumerate()
        .map(|(i, doc)| -> Result<AnnotatedDoc> {
            let file_id = i as u64;
            let annotations = doc
                .entities_list
                .into_iter()
                .enumerate()
                .map(|(j, e)| {
                    Annotation::new(
                        j.to_string(),
                        file_id,
                        e.start,
                        e.end,
                        e.label,
                        e.text,
                        AnnotationSource::Ner,
                    )
                })
                .collect::<ontolink_core::Result<Vec<_>>>()?;
            Ok(AnnotatedDoc {
                id: file_id,
                path: path.to_string(),
                text: doc.text,
                annotations,
            })
        })
        .collect()
}
