//! Error types for dataset operations.

use super::admission::AdmissionError;
use super::validation::FilenameError;
use crate::tabular::{ChartError, ParseError};

/// Errors that can occur during dataset operations.
#[derive(Debug)]
pub enum DatasetError {
    /// Dataset not found for the requesting owner.
    NotFound(String),
    /// Uploaded filename failed validation.
    InvalidFilename(FilenameError),
    /// Upload admission rejected the file.
    Admission(AdmissionError),
    /// Aggregation request could not be served.
    Chart(ChartError),
    /// Parsing the stored file failed.
    Parse(ParseError),
    /// Storage error (reading, writing, listing).
    Storage(anyhow::Error),
    /// Catalog error (database operations).
    Catalog(anyhow::Error),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(_) => write!(f, "Dataset not found"),
            Self::InvalidFilename(e) => write!(f, "Invalid filename: {}", e),
            Self::Admission(e) => write!(f, "{}", e),
            Self::Chart(e) => write!(f, "{}", e),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Catalog(e) => write!(f, "Catalog error: {}", e),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidFilename(e) => Some(e),
            Self::Admission(e) => Some(e),
            Self::Chart(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Storage(e) | Self::Catalog(e) => e.source(),
            Self::NotFound(_) => None,
        }
    }
}

impl DatasetError {
    /// Returns true if this is a client error (4xx).
    ///
    /// Parse and storage failures stay server errors: the client's request
    /// was well-formed, the stored file or backend was not.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidFilename(_) | Self::Admission(_) | Self::Chart(_)
        )
    }

    /// Returns true if this is a not found error (404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
