use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilingError {
    #[error("Required report '{report}' was not found in the filing result")]
    MissingReport { report: String },

    #[error("Report '{report}' has an invalid structure: {detail}")]
    InvalidStructure { report: String, detail: String },

    #[error("No business income row found in report '{report}'")]
    NoBusinessIncome { report: String },

    #[error("{0}")]
    Processing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FilingError::MissingReport { .. } => ErrorCode::MissingReport,
            FilingError::InvalidStructure { .. } => ErrorCode::InvalidStructure,
            FilingError::NoBusinessIncome { .. } => ErrorCode::NoBusinessIncome,
            FilingError::Processing(_) | FilingError::Serialization(_) | FilingError::Io(_) => {
                ErrorCode::ProcessingError
            }
        }
    }

    pub fn to_validation_error(&self) -> ValidationError {
        ValidationError {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Stable, machine-checkable error codes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingReport,
    InvalidStructure,
    NoBusinessIncome,
    ProcessingError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingReport => "MISSING_REPORT",
            ErrorCode::InvalidStructure => "INVALID_STRUCTURE",
            ErrorCode::NoBusinessIncome => "NO_BUSINESS_INCOME",
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire form of a failed filing: a stable code plus a human readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&FilingError> for ValidationError {
    fn from(error: &FilingError) -> Self {
        error.to_validation_error()
    }
}

impl From<FilingError> for ValidationError {
    fn from(error: FilingError) -> Self {
        error.to_validation_error()
    }
}

pub type Result<T> = std::result::Result<T, FilingError>;
