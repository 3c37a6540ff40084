use crate::core::{Record, RecordSource};
use crate::utils::error::{ExportError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Rows from a local JSON Lines file, e.g. a previously downloaded split.
pub struct JsonLinesSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: u64,
    next_index: u64,
}

impl JsonLinesSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|e| {
            ExportError::acquisition(format!("cannot open {}: {}", path.display(), e))
        })?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
            next_index: 0,
        })
    }
}

#[async_trait]
impl RecordSource for JsonLinesSource {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            let line = self.lines.next_line().await.map_err(|e| {
                ExportError::acquisition(format!(
                    "read error in {} after line {}: {}",
                    self.path.display(),
                    self.line_no,
                    e
                ))
            })?;
            let Some(line) = line else {
                return Ok(None);
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            let value: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
                ExportError::acquisition(format!(
                    "{}:{} is not valid JSON: {}",
                    self.path.display(),
                    self.line_no,
                    e
                ))
            })?;

            let serde_json::Value::Object(obj) = value else {
                return Err(ExportError::acquisition(format!(
                    "{}:{} is not a JSON object",
                    self.path.display(),
                    self.line_no
                )));
            };

            let record = Record::new(self.next_index, obj.into_iter().collect());
            self.next_index += 1;
            return Ok(Some(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_reads_objects_and_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"text": "a\nb"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"text": "c", "id": 2}}"#).unwrap();

        let mut source = JsonLinesSource::open(file.path()).await.unwrap();

        let first = source.next_record().await.unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.text_field("text").unwrap(), "a\nb");

        let second = source.next_record().await.unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.text_field("text").unwrap(), "c");

        assert!(source.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_object_line_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"text": "ok"}}"#).unwrap();
        writeln!(file, r#"["not", "an", "object"]"#).unwrap();

        let mut source = JsonLinesSource::open(file.path()).await.unwrap();
        source.next_record().await.unwrap();

        match source.next_record().await {
            Err(ExportError::AcquisitionFailure { message }) => {
                assert!(message.ends_with(":2 is not a JSON object"), "{}", message);
            }
            other => panic!("expected AcquisitionFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_acquisition_failure() {
        let result = JsonLinesSource::open("/definitely/not/here.jsonl").await;
        assert!(matches!(
            result,
            Err(ExportError::AcquisitionFailure { .. })
        ));
    }
}
