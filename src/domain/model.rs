use crate::utils::error::{ExportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One dataset row. `index` is the position in yield order, starting at 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub index: u64,
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(index: u64, data: HashMap<String, serde_json::Value>) -> Self {
        Self { index, data }
    }

    /// Single-column record, as produced by text-only datasets.
    pub fn with_text(index: u64, field: &str, text: impl Into<String>) -> Self {
        let mut data = HashMap::new();
        data.insert(field.to_string(), serde_json::Value::String(text.into()));
        Self { index, data }
    }

    /// Null or non-string values count as missing.
    pub fn text_field(&self, field: &str) -> Result<&str> {
        self.data
            .get(field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExportError::FieldMissing {
                field: field.to_string(),
                record_index: self.index,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub output_path: String,
    pub records_written: u64,
    pub bytes_written: u64,
    pub newlines_replaced: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExportSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_present() {
        let record = Record::with_text(0, "text", " = Valkyria Chronicles III = \n");
        assert_eq!(
            record.text_field("text").unwrap(),
            " = Valkyria Chronicles III = \n"
        );
    }

    #[test]
    fn test_text_field_absent_or_wrong_type() {
        let mut data = HashMap::new();
        data.insert("text".to_string(), serde_json::Value::Null);
        data.insert("id".to_string(), serde_json::json!(12));
        let record = Record::new(4, data);

        for field in ["text", "id", "body"] {
            match record.text_field(field) {
                Err(ExportError::FieldMissing {
                    field: f,
                    record_index,
                }) => {
                    assert_eq!(f, field);
                    assert_eq!(record_index, 4);
                }
                other => panic!("expected FieldMissing, got {:?}", other),
            }
        }
    }
}
