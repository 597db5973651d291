//! Filter error types
//!
//! Error codes:
//! - ROWFILTER_INVALID_SETTINGS: configuration rejected before any row is read
//! - ROWFILTER_CANCELED: run stopped on request
//! - ROWFILTER_SOURCE_FAILED: reading the input failed
//! - ROWFILTER_SINK_FAILED: writing an output failed
//!
//! Terminal filter outcomes are not errors and never appear here.

use std::fmt;

use crate::settings::SettingsError;
use crate::table::TableError;

/// Filter error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorCode {
    /// Invalid or inconsistent filter configuration
    InvalidSettings,
    /// Cooperative cancellation
    Canceled,
    /// Row source failure
    SourceFailed,
    /// Row sink failure
    SinkFailed,
}

impl FilterErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            FilterErrorCode::InvalidSettings => "ROWFILTER_INVALID_SETTINGS",
            FilterErrorCode::Canceled => "ROWFILTER_CANCELED",
            FilterErrorCode::SourceFailed => "ROWFILTER_SOURCE_FAILED",
            FilterErrorCode::SinkFailed => "ROWFILTER_SINK_FAILED",
        }
    }
}

impl fmt::Display for FilterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Filter error with code and human-readable message
#[derive(Debug, Clone, PartialEq)]
pub struct FilterError {
    code: FilterErrorCode,
    message: String,
}

impl FilterError {
    /// Create an invalid settings error
    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        Self {
            code: FilterErrorCode::InvalidSettings,
            message: reason.into(),
        }
    }

    /// Create a cancellation error
    pub fn canceled() -> Self {
        Self {
            code: FilterErrorCode::Canceled,
            message: "Execution canceled".into(),
        }
    }

    /// Create a source failure
    pub fn source_failed(reason: impl Into<String>) -> Self {
        Self {
            code: FilterErrorCode::SourceFailed,
            message: reason.into(),
        }
    }

    /// Create a sink failure
    pub fn sink_failed(reason: impl Into<String>) -> Self {
        Self {
            code: FilterErrorCode::SinkFailed,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> FilterErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the run was canceled rather than failed
    pub fn is_canceled(&self) -> bool {
        self.code == FilterErrorCode::Canceled
    }

    /// Returns true if the configuration was rejected
    pub fn is_invalid_settings(&self) -> bool {
        self.code == FilterErrorCode::InvalidSettings
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for FilterError {}

impl From<SettingsError> for FilterError {
    fn from(e: SettingsError) -> Self {
        Self::invalid_settings(e.to_string())
    }
}

impl From<TableError> for FilterError {
    fn from(e: TableError) -> Self {
        Self::source_failed(e.to_string())
    }
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            FilterErrorCode::InvalidSettings.code(),
            "ROWFILTER_INVALID_SETTINGS"
        );
        assert_eq!(FilterErrorCode::Canceled.code(), "ROWFILTER_CANCELED");
        assert_eq!(FilterErrorCode::SourceFailed.code(), "ROWFILTER_SOURCE_FAILED");
        assert_eq!(FilterErrorCode::SinkFailed.code(), "ROWFILTER_SINK_FAILED");
    }

    #[test]
    fn test_cancellation_is_distinguished() {
        assert!(FilterError::canceled().is_canceled());
        assert!(!FilterError::source_failed("disk").is_canceled());
        assert!(!FilterError::invalid_settings("bad").is_canceled());
    }

    #[test]
    fn test_settings_error_maps_to_invalid_settings() {
        let err: FilterError = SettingsError::MissingKey("column".into()).into();
        assert!(err.is_invalid_settings());
        assert!(err.message().contains("column"));
    }

    #[test]
    fn test_display() {
        let err = FilterError::invalid_settings("Column 'x' not found");
        assert_eq!(
            err.to_string(),
            "ROWFILTER_INVALID_SETTINGS: Column 'x' not found"
        );
    }
}
