pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{
    datasets_server::DatasetsServerSource, jsonl::JsonLinesSource, memory::VecSource,
    storage::LocalStorage,
};
pub use config::{toml_config::TomlConfig, CliConfig};
pub use core::{engine::ExportEngine, exporter::LineExporter};
pub use domain::model::{ExportSummary, Record};
pub use utils::error::{ExportError, Result};
