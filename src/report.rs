//! CSV link report.
//!
//! One headerless row per mention:
//!
//! ```text
//! file_id,mention_id,category,start,end,text,source,concept_id,label
//! 12,T1,FOOD,6,11,onion,BRAT,http://purl.obolibrary.org/obo/FOODON_03316347,onion
//! 12,T2,UNIT,12,14,kg,BRAT,NONE,NONE
//! ```

use std::fs::File;
use std::io;
use std::path::Path;

use ontolink_core::Annotation;
use serde::Serialize;

use crate::error::Result;
use crate::index::CanonicalLabelRecord;

/// Marker written in both link columns of an unlinked mention.
pub const UNLINKED_MARKER: &str = "NONE";

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow<'a> {
    /// Source document id.
    pub file_id: u64,
    /// Mention id within the document.
    pub mention_id: &'a str,
    /// Raw category label from the annotation.
    pub category: &'a str,
    /// Span start.
    pub start: usize,
    /// Span end.
    pub end: usize,
    /// Mention text.
    pub text: &'a str,
    /// Annotation source kind.
    pub source: &'a str,
    /// Linked concept IRI, or [`UNLINKED_MARKER`].
    pub concept_id: &'a str,
    /// Raw label of the linked concept, or [`UNLINKED_MARKER`].
    pub label: &'a str,
}

impl<'a> ReportRow<'a> {
    /// Row for `annotation`, linked to `record` when given.
    #[must_use]
    pub fn new(annotation: &'a Annotation, record: Option<&'a CanonicalLabelRecord>) -> Self {
        let (concept_id, label) = match record {
            Some(r) => (r.concept_id(), r.raw_label()),
            None => (UNLINKED_MARKER, UNLINKED_MARKER),
        };
        Self {
            file_id: annotation.file_id,
            mention_id: &annotation.id,
            category: &annotation.category,
            start: annotation.start,
            end: annotation.end,
            text: &annotation.text,
            source: annotation.source.as_label(),
            concept_id,
            label,
        }
    }
}

/// Writes report rows as CSV.
#[derive(Debug)]
pub struct ReportWriter<W: io::Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl ReportWriter<File> {
    /// Create (or truncate) a report file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: io::Write> ReportWriter<W> {
    /// Report over any writer.
    pub fn new(writer: W) -> Self {
        let inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        Self { inner, rows: 0 }
    }

    /// Append one row.
    pub fn write_row(&mut self, row: &ReportRow<'_>) -> Result<()> {
        self.inner.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush buffered rows.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| crate::Error::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontolink_core::AnnotationSource;

    #[test]
    fn test_rows() {
        let ann = Annotation::new("T1", 4, 0, 9, "FOOD", "onion, red", AnnotationSource::Brat).unwrap();
        let record = CanonicalLabelRecord::new("Red Onion", "http://x/1", "red onion");

        let mut report = ReportWriter::new(Vec::new());
        report.write_row(&ReportRow::new(&ann, Some(&record))).unwrap();
        report.write_row(&ReportRow::new(&ann, None)).unwrap();
        assert_eq!(report.rows(), 2);

        let out = String::from_utf8(report.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "4,T1,FOOD,0,9,\"onion, red\",BRAT,http://x/1,Red Onion\n\
             4,T1,FOOD,0,9,\"onion, red\",BRAT,NONE,NONE\n"
        );
    }
}
