pub mod engine;
pub mod exporter;
pub mod transform;

pub use crate::domain::model::{ExportSummary, Record};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSource, Storage};
pub use crate::utils::error::Result;
