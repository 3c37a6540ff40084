use crate::core::transform::{count_newlines, flatten_newlines};
use crate::core::{ConfigProvider, ExportSummary, Pipeline, RecordSource, Storage};
use crate::utils::error::{ExportError, Result};
use chrono::Utc;
use std::io::Write;

pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    records: u64,
    bytes: u64,
    newlines: u64,
}

/// Streams records into a text file, one flattened text field per line.
pub struct LineExporter<R: RecordSource, S: Storage> {
    source: R,
    storage: S,
    text_field: String,
    output_path: String,
    progress_interval: u64,
}

impl<R: RecordSource, S: Storage> LineExporter<R, S> {
    pub fn new(
        source: R,
        storage: S,
        text_field: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            source,
            storage,
            text_field: text_field.into(),
            output_path: output_path.into(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn from_config<C: ConfigProvider>(source: R, storage: S, config: &C) -> Self {
        Self::new(source, storage, config.text_field(), config.output_path())
            .with_progress_interval(config.progress_interval())
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    async fn write_records<W: Write>(
        &mut self,
        writer: &mut W,
        counters: &mut Counters,
    ) -> Result<()> {
        let total = self.source.size_hint();

        while let Some(record) = self.source.next_record().await? {
            let text = record.text_field(&self.text_field)?;
            let line = flatten_newlines(text);

            writer
                .write_all(line.as_bytes())
                .and_then(|_| writer.write_all(b"\n"))
                .map_err(|e| ExportError::write_failure(&self.output_path, e))?;

            counters.records += 1;
            counters.bytes += line.len() as u64 + 1;
            counters.newlines += count_newlines(text) as u64;

            if counters.records % self.progress_interval == 0 {
                match total {
                    Some(total) => tracing::info!("Exported {}/{} records", counters.records, total),
                    None => tracing::info!("Exported {} records", counters.records),
                }
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl<R: RecordSource, S: Storage> Pipeline for LineExporter<R, S> {
    async fn export(&mut self) -> Result<ExportSummary> {
        let started_at = Utc::now();
        let mut writer = self.storage.create(&self.output_path)?;
        tracing::debug!("Opened {} for writing", self.output_path);

        let mut counters = Counters::default();
        let streamed = self.write_records(&mut writer, &mut counters).await;
        let flushed = writer
            .flush()
            .map_err(|e| ExportError::write_failure(&self.output_path, e));
        drop(writer);

        if let Err(e) = streamed {
            if let Err(flush_err) = flushed {
                tracing::warn!("Flush after failure also failed: {}", flush_err);
            }
            tracing::debug!(
                "Export stopped after {} records; partial output left in place",
                counters.records
            );
            return Err(e);
        }
        flushed?;

        Ok(ExportSummary {
            output_path: self.storage.display_path(&self.output_path),
            records_written: counters.records,
            bytes_written: counters.bytes,
            newlines_replaced: counters.newlines,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
