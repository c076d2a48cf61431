//! Shared error type across vigil crates.

use thiserror::Error;

/// Stable error codes (used in logs and test assertions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric name already registered.
    DuplicateMetric,
    /// Metric name not registered.
    UnknownMetric,
    /// Update operation does not match the metric kind.
    KindMismatch,
    /// Label names do not match the declared label set.
    LabelMismatch,
    /// Metric or label name fails validation.
    InvalidName,
    /// Configuration could not be parsed or validated.
    BadConfig,
    /// Internal server error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorCode::UnknownMetric => "UNKNOWN_METRIC",
            ErrorCode::KindMismatch => "KIND_MISMATCH",
            ErrorCode::LabelMismatch => "LABEL_MISMATCH",
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VigilError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum VigilError {
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("metric {name} is a {actual}, not a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("metric {name} expects labels {expected:?}, got {got:?}")]
    LabelMismatch {
        name: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl VigilError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            VigilError::DuplicateMetric(_) => ErrorCode::DuplicateMetric,
            VigilError::UnknownMetric(_) => ErrorCode::UnknownMetric,
            VigilError::KindMismatch { .. } => ErrorCode::KindMismatch,
            VigilError::LabelMismatch { .. } => ErrorCode::LabelMismatch,
            VigilError::InvalidName(_) => ErrorCode::InvalidName,
            VigilError::BadConfig(_) => ErrorCode::BadConfig,
            VigilError::Internal(_) => ErrorCode::Internal,
        }
    }
}
