//! BRAT standoff folders.
//!
//! A folder holds `<n>.txt` documents, each with a sibling `<n>.ann`.
//! Only text-bound (`T`) lines are read:
//!
//! ```text
//! T1	FOOD 10 15	onion
//! T2	FOOD 20 24;30 35	red pepper
//! ```
//!
//! Discontinuous spans (offsets containing `;`) are skipped.

use std::fs;
use std::path::Path;

use ontolink_core::{AnnotatedDoc, Annotation, AnnotationSource};

use crate::error::{Error, Result};

/// Read every `<n>.txt` + `<n>.ann` pair in `dir`, ordered by file id.
///
/// # Errors
///
/// A `.txt` whose stem is not a number, a missing `.ann`, or a malformed
/// `T` line.
pub fn read_brat_folder(dir: impl AsRef<Path>) -> Result<Vec<AnnotatedDoc>> {
    let dir = dir.as_ref();
    let mut docs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "txt") {
            continue;
        }
        let file_id = file_id(&path)?;
        let text = fs::read_to_string(&path)?;
        let ann_path = path.with_extension("ann");
        let ann = fs::read_to_string(&ann_path).map_err(|e| {
            Error::invalid_input(format!("{}: {}", ann_path.display(), e))
        })?;
        let annotations = parse_brat_annotations(&ann, file_id)
            .map_err(|e| Error::parse(format!("{}: {}", ann_path.display(), e)))?;

        docs.push(AnnotatedDoc {
            id: file_id,
            path: path.display().to_string(),
            text,
            annotations,
        });
    }

    docs.sort_by_key(|d| d.id);
    Ok(docs)
}

/// Parse the contents of one `.ann` file.
pub fn parse_brat_annotations(ann: &str, file_id: u64) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();

    for (lineno, line) in ann.lines().enumerate() {
        if !line.starts_with('T') {
            continue;
        }
        let malformed = || Error::parse(format!("line {}: malformed annotation {:?}", lineno + 1, line));

        let mut fields = line.trim_end().splitn(3, '\t');
        let (Some(id), Some(details), Some(text)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };
        if details.contains(';') {
            continue;
        }

        let mut parts = details.split_whitespace();
        let (Some(category), Some(start), Some(end), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let start = start.parse().map_err(|_| malformed())?;
        let end = end.parse().map_err(|_| malformed())?;

        annotations.push(Annotation::new(
            id,
            file_id,
            start,
            end,
            category,
            text,
            AnnotationSource::Brat,
        )?);
    }

    Ok(annotations)
}

fn file_id(path: &Path) -> Result<u64> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse().ok())
        .ok_or_else(|| {
            Error::invalid_input(format!(
                "BRAT file name must be <number>.txt: {}",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_bound_lines() {
        let ann = "T1\tFOOD 0 5\tonion\nR1\tRel Arg1:T1 Arg2:T2\nT2\tPROCESS 6 11\tdiced\n#1\tNote T1\tx\n";
        let anns = parse_brat_annotations(ann, 7).unwrap();
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].id, "T1");
        assert_eq!(anns[0].file_id, 7);
        assert_eq!((anns[0].start, anns[0].end), (0, 5));
        assert_eq!(anns[1].category, "PROCESS");
        assert_eq!(anns[1].text, "diced");
        assert_eq!(anns[1].source, AnnotationSource::Brat);
    }

    #[test]
    fn test_discontinuous_skipped() {
        let ann = "T1\tFOOD 0 3;8 12\tred pepper\nT2\tFOOD 20 25\tonion\n";
        let anns = parse_brat_annotations(ann, 1).unwrap();
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].id, "T2");
    }

    #[test]
    fn test_text_with_tab_kept() {
        let anns = parse_brat_annotations("T1\tFOOD 0 9\tsalt\tpepper\n", 1).unwrap();
        assert_eq!(anns[0].text, "salt\tpepper");
    }

    #[test]
    fn test_malformed_line() {
        assert!(parse_brat_annotations("T1\tFOOD zero 5\tonion\n", 1).is_err());
        assert!(parse_brat_annotations("T1 FOOD 0 5 onion\n", 1).is_err());
        assert!(parse_brat_annotations("T1\tFOOD 9 5\tonion\n", 1).is_err());
    }

    #[test]
    fn test_read_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("12.txt"), "diced onion").unwrap();
        fs::write(dir.path().join("12.ann"), "T1\tFOOD 6 11\tonion\n").unwrap();
        fs::write(dir.path().join("3.txt"), "salt").unwrap();
        fs::write(dir.path().join("3.ann"), "").unwrap();
        fs::write(dir.path().join("annotation.conf"), "[entities]").unwrap();

        let docs = read_brat_folder(dir.path()).unwrap();
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3, 12]);
        assert_eq!(docs[1].text, "diced onion");
        assert_eq!(docs[1].annotations[0].file_id, 12);
        assert!(docs[0].annotations.is_empty());
    }

    #[test]
    fn test_non_numeric_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("recipe.txt"), "x").unwrap();
        fs::write(dir.path().join("recipe.ann"), "").unwrap();
        assert!(matches!(
            read_brat_folder(dir.path()),
            Err(Error::InvalidInput(_))
        ));
    }
}
