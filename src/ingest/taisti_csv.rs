//! TAISTI recipe dataset CSV.
//!
//! The file must have an `ingredients_entities` column holding a JSON
//! array of `{ "type", "start", "end", "entity" }`. Only entities whose
//! type mentions "food" are kept; rows are numbered by position.

use std::fs::File;
use std::io;
use std::path::Path;

use ontolink_core::{AnnotatedDoc, Annotation, AnnotationSource};
use serde::Deserialize;

use crate::error::{Error, Result};

const ENTITIES_COLUMN: &str = "ingredients_entities";

#[derive(Debug, Deserialize)]
struct TaistiEntity {
    #[serde(rename = "type")]
    kind: String,
    start: usize,
    end: usize,
    entity: String,
}

/// Read a TAISTI CSV file.
pub fn read_taisti_csv(path: impl AsRef<Path>) -> Result<Vec<AnnotatedDoc>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_taisti_csv_from(file, &path.display().to_string())
}

/// Read TAISTI CSV from any reader; `path` is recorded on every document.
pub fn read_taisti_csv_from<R: io::Read>(reader: R, path: &str) -> Result<Vec<AnnotatedDoc>> {
    let mut csv = csv::Reader::from_reader(reader);
    let column = csv
        .headers()?
        .iter()
        .position(|h| h == ENTITIES_COLUMN)
        .ok_or_else(|| Error::invalid_input(format!("{}: no '{}' column", path, ENTITIES_COLUMN)))?;

    let mut docs = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let record = record?;
        let file_id = row as u64;
        let raw = record.get(column).unwrap_or("");
        let entities: Vec<TaistiEntity> = serde_json::from_str(raw).map_err(|e| {
            Error::parse(format!("{} row {}: {}: {}", path, row + 1, ENTITIES_COLUMN, e))
        })?;

        let mut annotations = Vec::new();
        for (j, e) in entities.into_iter().enumerate() {
            if !e.kind.to_lowercase().contains("food") {
                continue;
            }
            annotations.push(Annotation::new(
                j.to_string(),
                file_id,
                e.start,
                e.end,
                e.kind,
                e.entity,
                AnnotationSource::TaistiCsv,
            )?);
        }

        if row > 0 && row % 1000 == 0 {
            log::debug!("read {} rows from {}", row, path);
        }
        docs.push(AnnotatedDoc {
            id: file_id,
            path: path.to_string(),
            text: String::new(),
            annotations,
        });
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "title,ingredients_entities\n\
        soup,\"[{\"\"type\"\":\"\"FOOD\"\",\"\"start\"\":0,\"\"end\"\":5,\"\"entity\"\":\"\"onion\"\"},{\"\"type\"\":\"\"QUANTITY\"\",\"\"start\"\":6,\"\"end\"\":7,\"\"entity\"\":\"\"2\"\"},{\"\"type\"\":\"\"possible_food\"\",\"\"start\"\":8,\"\"end\"\":12,\"\"entity\"\":\"\"salt\"\"}]\"\n\
        empty,[]\n";

    #[test]
    fn test_food_entities_only() {
        let docs = read_taisti_csv_from(CSV.as_bytes(), "t.csv").unwrap();
        assert_eq!(docs.len(), 2);
        let anns = &docs[0].annotations;
        assert_eq!(anns.len(), 2);
        // ids keep the position in the original entity list
        assert_eq!(anns[0].id, "0");
        assert_eq!(anns[1].id, "2");
        assert_eq!(anns[1].category, "possible_food");
        assert_eq!(anns[1].source, AnnotationSource::TaistiCsv);
        assert!(docs[0].text.is_empty());
        assert_eq!(docs[1].id, 1);
        assert!(docs[1].annotations.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let err = read_taisti_csv_from("a,b\n1,2\n".as_bytes(), "t.csv").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_bad_json_cell() {
        let err = read_taisti_csv_from("ingredients_entities\nnot-json\n".as_bytes(), "t.csv")
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
