use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Dataset acquisition failed: {message}")]
    AcquisitionFailure { message: String },

    #[error("Record {record_index} has no string field '{field}'")]
    FieldMissing { field: String, record_index: u64 },

    #[error("Cannot write output '{path}': {source}")]
    WriteFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Acquisition,
    Data,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::AcquisitionFailure {
            message: message.into(),
        }
    }

    pub fn write_failure(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AcquisitionFailure { .. } | Self::ApiError(_) => ErrorCategory::Acquisition,
            Self::FieldMissing { .. } => ErrorCategory::Data,
            Self::WriteFailure { .. } => ErrorCategory::Output,
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// Network failures may succeed on a later run; everything else needs a fix first.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Acquisition => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::AcquisitionFailure { .. } => {
                "Check the dataset, config and split names, and set HF_TOKEN for gated datasets"
            }
            Self::ApiError(_) => "Check network connectivity and the datasets-server endpoint",
            Self::FieldMissing { .. } => {
                "Pass --text-field with a column that exists in every row of the split"
            }
            Self::WriteFailure { .. } => {
                "Check that the output directory exists, is writable and has free space"
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::AcquisitionFailure { message } => {
                format!("Could not load the dataset: {}", message)
            }
            Self::FieldMissing {
                field,
                record_index,
            } => format!(
                "Row {} has no text in column '{}'; the output stops before it",
                record_index, field
            ),
            Self::WriteFailure { path, .. } => format!("Could not write to {}", path),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Stderr text shown for a fatal error.
pub fn render_failure(e: &ExportError) -> String {
    format!("❌ {}\n💡 {}", e.user_friendly_message(), e.recovery_suggestion())
}

/// Logs `e`, prints it for the user and exits with its severity's code.
pub fn exit_with(stage: &str, e: &ExportError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    eprintln!("{}", render_failure(e));
    std::process::exit(e.exit_code())
}
