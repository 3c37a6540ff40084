use crate::adapters::datasets_server::{DEFAULT_ENDPOINT, MAX_PAGE_SIZE};
use crate::config::{
    validate_provider, DEFAULT_CONFIG_NAME, DEFAULT_DATASET, DEFAULT_SPLIT, DEFAULT_TEXT_FIELD,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::exporter::DEFAULT_PROGRESS_INTERVAL;
use crate::core::ConfigProvider;
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    pub export: ExportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_config_name")]
    pub config: String,
    #[serde(default = "default_split")]
    pub split: String,
    pub endpoint: Option<String>,
    pub page_size: Option<usize>,
    pub max_records: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub token: Option<String>,
    pub input_jsonl: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub text_field: Option<String>,
    pub progress_interval: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

fn default_config_name() -> String {
    DEFAULT_CONFIG_NAME.to_string()
}

fn default_split() -> String {
    DEFAULT_SPLIT.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            config: default_config_name(),
            split: default_split(),
            endpoint: None,
            page_size: None,
            max_records: None,
            timeout_seconds: None,
            token: None,
            input_jsonl: None,
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ExportError::ConfigValidationError {
                field: "config_file".to_string(),
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ExportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Expands `${VAR}`; unset variables are left verbatim.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn input_jsonl(&self) -> Option<&Path> {
        self.source.input_jsonl.as_deref().map(Path::new)
    }
}

impl ConfigProvider for TomlConfig {
    fn dataset(&self) -> &str {
        &self.source.dataset
    }

    fn config_name(&self) -> &str {
        &self.source.config
    }

    fn split(&self) -> &str {
        &self.source.split
    }

    fn text_field(&self) -> &str {
        self.export.text_field.as_deref().unwrap_or(DEFAULT_TEXT_FIELD)
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn page_size(&self) -> usize {
        self.source.page_size.unwrap_or(MAX_PAGE_SIZE)
    }

    fn max_records(&self) -> Option<u64> {
        self.source.max_records
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn hf_token(&self) -> Option<&str> {
        // An unresolved `${HF_TOKEN}` means the variable was not set.
        self.source
            .token
            .as_deref()
            .filter(|t| !t.is_empty() && !t.starts_with("${"))
    }

    fn progress_interval(&self) -> u64 {
        self.export
            .progress_interval
            .unwrap_or(DEFAULT_PROGRESS_INTERVAL)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;
        if let Some(path) = &self.source.input_jsonl {
            validation::validate_path("source.input_jsonl", path)?;
        }
        if let Some(interval) = self.export.progress_interval {
            validation::validate_range("export.progress_interval", interval, 1, u64::MAX)?;
        }
        Ok(())
    }
}
