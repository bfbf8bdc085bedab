//! Reader tests over files on disk.

use std::fs;

use ontolink::ingest::AnnotationInput;
use ontolink::{AnnotationSource, SemanticCategory};

#[test]
fn brat_folder_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("2.txt"), "Dice two onions and a pinch of salt.").unwrap();
    fs::write(
        dir.path().join("2.ann"),
        "T1\tPROCESS 0 4\tDice\n\
         T2\tFOOD 9 15\tonions\n\
         T3\tFOOD 22 27;31 35\tpinch salt\n\
         A1\tNegated T2\n\
         T4\tpossible_substite 31 35\tsalt\n",
    )
    .unwrap();

    let docs = AnnotationInput::Brat(dir.path().to_path_buf()).read().unwrap();
    assert_eq!(docs.len(), 1);
    let anns = &docs[0].annotations;
    assert_eq!(
        anns.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
        ["T1", "T2", "T4"]
    );
    assert_eq!(anns[0].semantic_category(), SemanticCategory::Process);
    // substitutes are food mentions
    assert_eq!(anns[2].semantic_category(), SemanticCategory::Food);
    assert_eq!(anns[2].category, "possible_substite");
    assert!(anns.iter().all(|a| a.source == AnnotationSource::Brat && a.file_id == 2));
}

#[test]
fn brat_missing_ann_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("1.txt"), "text").unwrap();
    assert!(AnnotationInput::Brat(dir.path().to_path_buf()).read().is_err());
}

#[test]
fn ner_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ner.json");
    fs::write(
        &path,
        r#"[{"text": "salt and pepper",
             "entities_list": [
                {"start": 0, "end": 4, "label": "FOOD", "text": "salt"},
                {"start": 9, "end": 15, "label": "color", "text": "pepper"}]}]"#,
    )
    .unwrap();

    let docs = AnnotationInput::Ner(path.clone()).read().unwrap();
    assert_eq!(docs[0].path, path.display().to_string());
    assert_eq!(docs[0].text, "salt and pepper");
    let mention = docs[0].annotations[1].mention();
    assert_eq!(mention.category, SemanticCategory::Color);
    assert_eq!(mention.text, "pepper");
}

#[test]
fn taisti_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.csv");
    fs::write(
        &path,
        "id,ingredients_entities\n\
         1,\"[{\"\"type\"\": \"\"FOOD\"\", \"\"start\"\": 2, \"\"end\"\": 7, \"\"entity\"\": \"\"flour\"\"}, \
{\"\"type\"\": \"\"UNIT\"\", \"\"start\"\": 0, \"\"end\"\": 1, \"\"entity\"\": \"\"g\"\"}]\"\n\
         2,[]\n",
    )
    .unwrap();

    let docs = AnnotationInput::TaistiCsv(path).read().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].annotations.len(), 1);
    assert_eq!(docs[0].annotations[0].text, "flour");
    assert_eq!(docs[0].annotations[0].source, AnnotationSource::TaistiCsv);
    assert_eq!(docs[1].id, 1);
}

#[test]
fn unreadable_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(AnnotationInput::Ner(missing).read().is_err());
}
