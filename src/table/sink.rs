//! Row sinks
//!
//! A sink accepts schema-compatible rows until it is closed. Closing
//! finalizes the produced table; pushes after close are rejected.

use super::errors::{TableError, TableResult};
use super::source::MemoryTable;
use super::types::{Row, TableSchema};

/// Destination for filtered rows
pub trait RowSink {
    /// Appends a row
    fn push(&mut self, row: Row) -> TableResult<()>;

    /// Finalizes the output. Closing an already closed sink is a no-op.
    fn close(&mut self) -> TableResult<()>;

    /// Returns true once `close` has been called
    fn is_closed(&self) -> bool;
}

/// In-memory sink that keeps rows with their original positions
#[derive(Debug)]
pub struct TableBuffer {
    name: String,
    schema: TableSchema,
    rows: Vec<Row>,
    closed: bool,
}

impl TableBuffer {
    pub fn new(name: impl Into<String>, schema: TableSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
            closed: false,
        }
    }

    /// Returns the sink name used in error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns buffered rows in push order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts the closed buffer into a table with fresh positions
    pub fn into_table(self) -> TableResult<MemoryTable> {
        if !self.closed {
            return Err(TableError::InvalidSchema(format!(
                "buffer '{}' must be closed before use as a table",
                self.name
            )));
        }
        let rows = self
            .rows
            .into_iter()
            .map(|r| (r.key().to_string(), r.cells().to_vec()))
            .collect();
        MemoryTable::new(self.schema, rows)
    }
}

impl RowSink for TableBuffer {
    fn push(&mut self, row: Row) -> TableResult<()> {
        if self.closed {
            return Err(TableError::SinkClosed(self.name.clone()));
        }
        self.schema.check_cells(row.key(), row.cells())?;
        self.rows.push(row);
        Ok(())
    }

    fn close(&mut self) -> TableResult<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::types::{Cell, ColumnSpec, ColumnType};

    fn schema() -> TableSchema {
        TableSchema::new(vec![ColumnSpec::new("v", ColumnType::Int)]).unwrap()
    }

    #[test]
    fn test_push_after_close_rejected() {
        let mut buffer = TableBuffer::new("out", schema());
        buffer.push(Row::new("a", 0, vec![Cell::Int(1)])).unwrap();
        buffer.close().unwrap();

        let err = buffer.push(Row::new("b", 1, vec![Cell::Int(2)])).unwrap_err();
        assert!(matches!(err, TableError::SinkClosed(_)));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut buffer = TableBuffer::new("out", schema());
        buffer.close().unwrap();
        buffer.close().unwrap();
        assert!(buffer.is_closed());
    }

    #[test]
    fn test_rejects_incompatible_row() {
        let mut buffer = TableBuffer::new("out", schema());
        assert!(buffer.push(Row::new("a", 0, vec![Cell::from("x")])).is_err());
    }

    #[test]
    fn test_into_table_reindexes() {
        let mut buffer = TableBuffer::new("out", schema());
        buffer.push(Row::new("a", 4, vec![Cell::Int(1)])).unwrap();
        buffer.push(Row::new("b", 9, vec![Cell::Int(2)])).unwrap();
        assert!(TableBuffer::new("open", schema()).into_table().is_err());

        buffer.close().unwrap();
        let table = buffer.into_table().unwrap();
        let indexes: Vec<u64> = table.rows().iter().map(|r| r.index()).collect();
        assert_eq!(indexes, vec![0, 1]);
    }
}
