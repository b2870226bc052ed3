// ============================================================
// Layer 4 - Dataset Loader
// ============================================================
// Reads annotated documents from a JSONL file:
//
//   {"text": "Facture ACME Energy ...", "label": "facture"}
//   {"text": "Bulletin de paie ...",    "label": "bulletin"}
//
// Blank lines are skipped. A malformed line stops the load with
// its 1-based line number.

use std::{fs, path::Path};

use crate::data::dataset::LabelledText;
use crate::error::{Error, Result};

pub fn load_jsonl(path: &Path) -> Result<Vec<LabelledText>> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| Error::Dataset {
        path: path.to_path_buf(),
        line: 0,
        message: e.to_string(),
    })?;

    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: LabelledText = serde_json::from_str(line).map_err(|e| Error::Dataset {
            path: path.to_path_buf(),
            line: index + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    tracing::info!("Loaded {} labelled documents from '{}'", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_records_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.jsonl");
        fs::write(
            &path,
            "{\"text\": \"Facture ACME\", \"label\": \"facture\"}\n\n   \n{\"text\": \"Salaire net\", \"label\": \"bulletin\", \"source\": \"scan\"}\n",
        )
        .unwrap();

        let records = load_jsonl(&path).unwrap();
        assert_eq!(
            records,
            vec![
                LabelledText::new("Facture ACME", "facture"),
                LabelledText::new("Salaire net", "bulletin"),
            ]
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.jsonl");
        fs::write(&path, "{\"text\": \"a\", \"label\": \"x\"}\n{\"text\": \"b\"}\n").unwrap();

        match load_jsonl(&path) {
            Err(Error::Dataset { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_jsonl(Path::new("/no/such/train.jsonl")),
            Err(Error::NotFound(_))
        ));
    }
}
