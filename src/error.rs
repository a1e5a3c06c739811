/*!
 * Error handling for provider directory operations
 *
 * Only the boundary of the pipeline can fail: fetching the payload and
 * extracting a record sequence from it. Normalization, query-state
 * transitions and view derivation never return errors.
 */

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use serde::{Serialize, Deserialize};

/// Directory library result type
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Error types with context and suggestions
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Non-success transport response or failed connection
    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
        url: String,
    },

    /// Payload shape not recognized, or recognized but empty
    #[error("Could not extract doctors data from API response: {reason}")]
    Extraction {
        reason: ExtractionFailure,
    },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },

    /// Export errors
    #[error("Export error: {message}")]
    Export {
        message: String,
        format: ExportFormat,
        suggestion: Option<String>,
    },

    /// Feature not enabled error
    #[error("Feature '{feature}' is not enabled")]
    FeatureNotEnabled {
        feature: String,
        enable_instruction: String,
    },

    /// Generic errors with custom message
    #[error("{message}")]
    Custom {
        message: String,
        suggestion: Option<String>,
    },
}

/// Named reasons a payload could not yield a record sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The body was not valid JSON
    InvalidJson(String),
    /// The body is JSON but has no sequence to take records from
    UnrecognizedShape(&'static str),
    /// A sequence was found but holds no records
    Empty {
        source: PayloadSource,
    },
}

/// Where in the payload the record sequence was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadSource {
    /// The body itself is the sequence
    Bare,
    /// The body's `doctors` field
    Doctors,
    /// The first sequence-valued field of the body
    Field(String),
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionFailure::InvalidJson(message) => write!(f, "body is not valid JSON ({})", message),
            ExtractionFailure::UnrecognizedShape(shape) => write!(f, "no record list found in {}", shape),
            ExtractionFailure::Empty { source } => write!(f, "record list in {} is empty", source),
        }
    }
}

impl fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadSource::Bare => write!(f, "response body"),
            PayloadSource::Doctors => write!(f, "field 'doctors'"),
            PayloadSource::Field(name) => write!(f, "field '{}'", name),
        }
    }
}

/// Export format for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    JsonLines,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "JSON"),
            ExportFormat::JsonLines => write!(f, "JSON Lines"),
            ExportFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl DirectoryError {
    /// Create an extraction error for the given failure
    pub fn extraction(reason: ExtractionFailure) -> Self {
        Self::Extraction { reason }
    }

    /// Create a network error for a non-success status code
    pub fn http_status(status: u16, url: &str) -> Self {
        Self::Network {
            message: format!("Network response was not ok (HTTP {})", status),
            status: Some(status),
            url: url.to_string(),
        }
    }

    /// Create a network error for a failed connection or read
    pub fn transport(message: impl Into<String>, url: &str) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
            url: url.to_string(),
        }
    }

    /// Create an I/O error that remembers which file was involved
    pub fn io_at(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::Io {
            message: format!("{}: {}", path.display(), source),
            source,
            path: Some(path),
        }
    }

    /// Create a feature not enabled error
    pub fn feature_required(feature: &str) -> Self {
        let enable_instruction = match feature {
            "fetch" => "Add 'docdir = { version = \"0.0\", features = [\"fetch\"] }' to your Cargo.toml, or load the payload from a file",
            _ => "Enable the required feature in your Cargo.toml",
        };

        Self::FeatureNotEnabled {
            feature: feature.to_string(),
            enable_instruction: enable_instruction.to_string(),
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { url, .. } => {
                format!("{}\n\nRequested URL: {}", self, url)
            }
            Self::Configuration { suggestion: Some(sug), .. }
            | Self::Export { suggestion: Some(sug), .. }
            | Self::Custom { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            Self::FeatureNotEnabled { enable_instruction, .. } => {
                format!("{}\n\nTo enable: {}", self, enable_instruction)
            }
            _ => self.to_string(),
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for DirectoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            path: None,
        }
    }
}

impl From<csv::Error> for DirectoryError {
    fn from(err: csv::Error) -> Self {
        Self::Export {
            message: err.to_string(),
            format: ExportFormat::Csv,
            suggestion: None,
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryError::Export {
            message: err.to_string(),
            format: ExportFormat::Json,
            suggestion: Some("Check if the data is serializable to JSON.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_message_names_source() {
        let err = DirectoryError::extraction(ExtractionFailure::Empty {
            source: PayloadSource::Doctors,
        });
        assert_eq!(
            err.to_string(),
            "Could not extract doctors data from API response: record list in field 'doctors' is empty"
        );
    }

    #[test]
    fn test_http_status_error() {
        let err = DirectoryError::http_status(404, "https://example.test/doctors.json");
        match &err {
            DirectoryError::Network { status, .. } => assert_eq!(*status, Some(404)),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.user_message().contains("https://example.test/doctors.json"));
    }

    #[test]
    fn test_feature_required_has_instruction() {
        let err = DirectoryError::feature_required("fetch");
        assert!(err.user_message().contains("To enable"));
    }
}
