//! Table error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::types::ColumnType;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised by row sources and sinks
#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed line {line} in {path}: {reason}")]
    Malformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Row '{key}' has {actual} cells, schema declares {expected}")]
    ArityMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row '{key}': column '{column}' expects {expected}, got {actual}")]
    ColumnType {
        key: String,
        column: String,
        expected: ColumnType,
        actual: ColumnType,
    },

    #[error("Cannot decode {value} as {expected}")]
    CellType { value: String, expected: ColumnType },

    #[error("Duplicate row key '{0}'")]
    DuplicateKey(String),

    #[error("Sink '{0}' is closed")]
    SinkClosed(String),
}

impl TableError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TableError::Io {
            path: path.into(),
            source,
        }
    }
}
