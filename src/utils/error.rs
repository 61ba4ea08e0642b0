use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Data source error ({source_name}): {message}")]
    DataSource {
        source_name: String,
        message: String,
    },

    #[error("Data source is missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No customer found for {key}")]
    NotFound { key: String },

    #[error("Invalid field(s) requested: {}", fields.join(", "))]
    InvalidField { fields: Vec<String> },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataSource,
    Request,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LookupError {
    pub fn data_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DataSource { .. }
            | Self::MissingColumns { .. }
            | Self::Csv(_)
            | Self::Io(_) => ErrorCategory::DataSource,
            Self::NotFound { .. } | Self::InvalidField { .. } | Self::InvalidRequest { .. } => {
                ErrorCategory::Request
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::DataSource => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::DataSource { .. } | Self::Io(_) => {
                "Check that the data file exists and is readable".to_string()
            }
            Self::MissingColumns { columns } => format!(
                "Add the missing column(s) to the header row: {}",
                columns.join(", ")
            ),
            Self::Csv(_) => {
                "Check the file delimiter and that every row has as many cells as the header"
                    .to_string()
            }
            Self::NotFound { .. } => "Verify the phone number or contract code".to_string(),
            Self::InvalidField { .. } => format!(
                "Request only these fields: {}",
                crate::domain::model::Field::names().join(", ")
            ),
            Self::InvalidRequest { .. } => "Fix the request parameters".to_string(),
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the configuration file, command-line flags and environment".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::DataSource => format!("Customer data could not be loaded: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Request => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
