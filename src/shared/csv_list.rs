//! Single-column CSV lists (choice lists and the member roster).
//!
//! Files have no header row; only the first column of each record is read.

use std::io::Read;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// Trimmed, non-blank values of the first column
pub fn first_column<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(first) = record.get(0) {
            let value = first.trim_start_matches(UTF8_BOM).trim();
            if !value.is_empty() {
                values.push(value.to_string());
            }
        }
    }

    Ok(values)
}

/// Read a list file from disk. Missing file → `Ok(None)`.
pub async fn load_first_column(path: &Path) -> std::io::Result<Option<Vec<String>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    first_column(bytes.as_slice())
        .map(Some)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_column_skips_blanks() {
        let data = "\u{feff}Wild boar\n\n  Sika deer  ,extra\n,\nRaccoon\n";
        assert_eq!(
            first_column(data.as_bytes()).unwrap(),
            vec!["Wild boar", "Sika deer", "Raccoon"]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_first_column(&tmp.path().join("animals.csv"))
            .await
            .unwrap()
            .is_none());

        std::fs::write(tmp.path().join("animals.csv"), "Boar\nDeer\n").unwrap();
        assert_eq!(
            load_first_column(&tmp.path().join("animals.csv"))
                .await
                .unwrap(),
            Some(vec!["Boar".to_string(), "Deer".to_string()])
        );
    }
}
