use thiserror::Error;

#[derive(Error, Debug)]
pub enum RmaError {
    #[error("Malformed parameter '{name}': {reason}")]
    MalformedParameter { name: String, reason: String },

    #[error("Response envelope is missing field '{field}'")]
    MissingEnvelopeField { field: String },

    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP request to {url} failed with status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("Unsupported response format: {format} (expected json or xml)")]
    UnsupportedFormat { format: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    Processing { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl RmaError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        RmaError::MalformedParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RmaError::Transport(_) | RmaError::HttpStatus { .. } => ErrorSeverity::Medium,
            RmaError::MalformedParameter { .. }
            | RmaError::UnsupportedFormat { .. }
            | RmaError::Config { .. }
            | RmaError::InvalidConfigValue { .. }
            | RmaError::MissingEnvelopeField { .. }
            | RmaError::Parse(_)
            | RmaError::Xml(_)
            | RmaError::Csv(_)
            | RmaError::Processing { .. } => ErrorSeverity::High,
            RmaError::Io(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RmaError::Transport(_) | RmaError::HttpStatus { .. } => {
                "Check network connectivity and the configured endpoint, then retry"
            }
            RmaError::MalformedParameter { .. } => {
                "Check that each filter value matches its operator (lists only with in/nin, identifiers with asc/desc)"
            }
            RmaError::MissingEnvelopeField { .. } | RmaError::Parse(_) | RmaError::Xml(_) => {
                "The service returned an unexpected body; try --url-only and inspect the query"
            }
            RmaError::UnsupportedFormat { .. } => "Use 'json' or 'xml'",
            RmaError::Config { .. } | RmaError::InvalidConfigValue { .. } => {
                "Fix the configuration file or command line arguments"
            }
            RmaError::Io(_) | RmaError::Csv(_) | RmaError::Processing { .. } => {
                "Check the output path and file permissions"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RmaError>;
