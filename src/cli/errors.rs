//! CLI-specific error types
//!
//! Every CLI error is fatal: it is reported once and the process exits 1.

use std::fmt;
use std::io;

use crate::filter::{FilterError, FilterErrorCode};
use crate::table::TableError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Run configuration file error
    ConfigError,
    /// Input or output table error
    TableError,
    /// I/O error (stdout)
    IoError,
    /// Filter settings rejected
    InvalidFilter,
    /// Run canceled
    Canceled,
    /// Run failed while reading or writing rows
    RunFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ROWFILTER_CLI_CONFIG_ERROR",
            Self::TableError => "ROWFILTER_CLI_TABLE_ERROR",
            Self::IoError => "ROWFILTER_CLI_IO_ERROR",
            Self::InvalidFilter => "ROWFILTER_CLI_INVALID_FILTER",
            Self::Canceled => "ROWFILTER_CLI_CANCELED",
            Self::RunFailed => "ROWFILTER_CLI_RUN_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<TableError> for CliError {
    fn from(e: TableError) -> Self {
        Self::new(CliErrorCode::TableError, e.to_string())
    }
}

impl From<FilterError> for CliError {
    fn from(e: FilterError) -> Self {
        let code = match e.code() {
            FilterErrorCode::InvalidSettings => CliErrorCode::InvalidFilter,
            FilterErrorCode::Canceled => CliErrorCode::Canceled,
            FilterErrorCode::SourceFailed | FilterErrorCode::SinkFailed => CliErrorCode::RunFailed,
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_mapping() {
        let err: CliError = FilterError::canceled().into();
        assert_eq!(err.code(), &CliErrorCode::Canceled);

        let err: CliError = FilterError::invalid_settings("Column 'x' not found").into();
        assert_eq!(err.code_str(), "ROWFILTER_CLI_INVALID_FILTER");
        assert!(err.message().contains("Column 'x' not found"));
    }
}
