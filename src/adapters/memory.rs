use crate::core::{Record, RecordSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Records already held in memory.
pub struct VecSource {
    total: u64,
    records: std::vec::IntoIter<Record>,
}

impl VecSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            total: records.len() as u64,
            records: records.into_iter(),
        }
    }

    pub fn from_texts<I, T>(field: &str, texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let records = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Record::with_text(i as u64, field, text))
            .collect();
        Self::new(records)
    }
}

#[async_trait]
impl RecordSource for VecSource {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.records.next())
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.total)
    }
}
