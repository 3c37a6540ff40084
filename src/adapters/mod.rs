// Adapters layer: concrete record sources and storage backends.

pub mod datasets_server;
pub mod jsonl;
pub mod memory;
pub mod storage;

use crate::core::{ConfigProvider, RecordSource};
use crate::utils::error::Result;
use std::path::Path;

/// A local JSON Lines file wins over the remote dataset when both are given.
pub async fn open_source<C: ConfigProvider>(
    config: &C,
    input_jsonl: Option<&Path>,
) -> Result<Box<dyn RecordSource>> {
    match input_jsonl {
        Some(path) => {
            tracing::info!("Reading records from {}", path.display());
            Ok(Box::new(jsonl::JsonLinesSource::open(path).await?))
        }
        None => {
            tracing::info!(
                "Loading {} (config {}, split {}) from {}",
                config.dataset(),
                config.config_name(),
                config.split(),
                config.endpoint()
            );
            Ok(Box::new(datasets_server::DatasetsServerSource::from_config(
                config,
            )?))
        }
    }
}
