pub mod toml_config;

use crate::adapters::datasets_server::{DEFAULT_ENDPOINT, MAX_PAGE_SIZE};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATASET: &str = "Salesforce/wikitext";
pub const DEFAULT_CONFIG_NAME: &str = "wikitext-103-v1";
pub const DEFAULT_SPLIT: &str = "train";
pub const DEFAULT_TEXT_FIELD: &str = "text";
pub const DEFAULT_OUTPUT: &str = "wikitext103_train.txt";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[cfg(feature = "cli")]
use clap::Parser;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "wikitext-export"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Export a Hugging Face text dataset split as one line per record")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_DATASET))]
    pub dataset: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_CONFIG_NAME))]
    pub config_name: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_SPLIT))]
    pub split: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_TEXT_FIELD))]
    pub text_field: String,

    #[cfg_attr(feature = "cli", arg(short, long, default_value = DEFAULT_OUTPUT))]
    pub output: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_ENDPOINT))]
    pub endpoint: String,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = MAX_PAGE_SIZE))]
    pub page_size: usize,

    #[cfg_attr(feature = "cli", arg(long, help = "Stop after this many records"))]
    pub max_records: Option<u64>,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS))]
    pub timeout_seconds: u64,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Read records from a local JSON Lines file instead")
    )]
    pub input_jsonl: Option<String>,

    #[serde(skip_serializing)]
    #[cfg_attr(feature = "cli", arg(long, env = "HF_TOKEN", hide_env_values = true))]
    pub hf_token: Option<String>,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage"))]
    pub monitor: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON lines"))]
    pub log_json: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Print the run summary as JSON on stdout"))]
    pub json_summary: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            split: DEFAULT_SPLIT.to_string(),
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: MAX_PAGE_SIZE,
            max_records: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            input_jsonl: None,
            hf_token: None,
            verbose: false,
            monitor: false,
            log_json: false,
            json_summary: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn config_name(&self) -> &str {
        &self.config_name
    }

    fn split(&self) -> &str {
        &self.split
    }

    fn text_field(&self) -> &str {
        &self.text_field
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn max_records(&self) -> Option<u64> {
        self.max_records
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn hf_token(&self) -> Option<&str> {
        self.hf_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Checks shared by every configuration front end.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validation::validate_dataset_id("dataset", config.dataset())?;
    validation::validate_non_empty_string("config_name", config.config_name())?;
    validation::validate_non_empty_string("split", config.split())?;
    validation::validate_non_empty_string("text_field", config.text_field())?;
    validation::validate_path("output", config.output_path())?;
    validation::validate_url("endpoint", config.endpoint())?;
    validation::validate_range("page_size", config.page_size(), 1, MAX_PAGE_SIZE)?;
    validation::validate_range("timeout_seconds", config.timeout_seconds(), 1, 3600)?;
    Ok(())
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;
        if let Some(path) = &self.input_jsonl {
            validation::validate_path("input_jsonl", path)?;
        }
        Ok(())
    }
}
