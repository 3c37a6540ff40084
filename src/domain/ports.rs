use crate::domain::model::{ExportSummary, Record};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;

/// Pull-based record sequence. `Ok(None)` means the split is exhausted.
#[async_trait]
pub trait RecordSource: Send {
    async fn next_record(&mut self) -> Result<Option<Record>>;

    /// Total rows the source expects to yield, when it knows.
    fn size_hint(&self) -> Option<u64> {
        None
    }
}

#[async_trait]
impl<R: RecordSource + ?Sized> RecordSource for Box<R> {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        (**self).next_record().await
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

pub trait Storage: Send + Sync {
    type Writer: Write + Send;

    /// Creates or truncates `path`.
    fn create(&self, path: &str) -> Result<Self::Writer>;

    /// Location reported back to the user for `path`.
    fn display_path(&self, path: &str) -> String {
        path.to_string()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn dataset(&self) -> &str;
    fn config_name(&self) -> &str;
    fn split(&self) -> &str;
    fn text_field(&self) -> &str;
    fn output_path(&self) -> &str;
    fn endpoint(&self) -> &str;
    fn page_size(&self) -> usize;
    fn max_records(&self) -> Option<u64>;
    fn timeout_seconds(&self) -> u64;
    fn hf_token(&self) -> Option<&str>;

    fn progress_interval(&self) -> u64 {
        10_000
    }
}

#[async_trait]
pub trait Pipeline: Send {
    async fn export(&mut self) -> Result<ExportSummary>;
}
