use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsultaError {
    #[error("{message}")]
    Format { message: String },

    #[error("{message}")]
    Connection { message: String },

    #[error("query failed: {message}")]
    ServiceFault { message: String },

    /// `detail` is logged but never displayed.
    #[error("Error processing the query. Please try again later.")]
    Unexpected { detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML decoding error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl From<quick_xml::events::attributes::AttrError> for ConsultaError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ConsultaError::Xml(err.into())
    }
}

impl ConsultaError {
    pub fn format(message: impl Into<String>) -> Self {
        ConsultaError::Format {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        ConsultaError::Connection {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConsultaError::ValidationError {
            message: message.into(),
        }
    }

    /// True for the four kinds the fetcher is allowed to surface.
    pub fn is_core_kind(&self) -> bool {
        matches!(
            self,
            ConsultaError::Format { .. }
                | ConsultaError::Connection { .. }
                | ConsultaError::ServiceFault { .. }
                | ConsultaError::Unexpected { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ConsultaError::Connection { .. } => {
                "Could not connect to the case-tracking service. Please try again later."
                    .to_string()
            }
            ConsultaError::Http(_) | ConsultaError::Xml(_) => {
                "The case-tracking service returned an unreadable answer.".to_string()
            }
            ConsultaError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ConsultaError::Format { .. } => {
                "Use the form Sede - NroRegistro / Año, for example 2-12345/2024"
            }
            ConsultaError::Connection { .. } | ConsultaError::Http(_) => {
                "Check network access to the WSDL URL or pass another one with --wsdl"
            }
            ConsultaError::ServiceFault { .. } => {
                "The service rejected this identifier; verify it exists"
            }
            ConsultaError::Unexpected { .. } | ConsultaError::Xml(_) => {
                "Retry later; run with --verbose to see the logged detail"
            }
            ConsultaError::ConfigError { .. } | ConsultaError::InvalidConfigValueError { .. } => {
                "Review the TOML file and command line flags"
            }
            ConsultaError::ValidationError { .. } => "Correct the input and try again",
            ConsultaError::IoError(_) | ConsultaError::ZipError(_) | ConsultaError::CsvError(_) => {
                "Check that the output path exists and is writable"
            }
            ConsultaError::SerializationError(_) => "Report this as a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsultaError>;
