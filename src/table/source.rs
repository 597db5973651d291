//! Row source contract and the in-memory table
//!
//! A source exposes a schema and hands out independent forward-only
//! cursors. Each cursor advances on its own; the source itself is read-only
//! while cursors are open.

use std::collections::HashSet;

use super::errors::{TableError, TableResult};
use super::types::{Cell, Row, TableSchema};

/// Forward-only reader over a source
pub trait RowCursor: Send {
    /// Returns the next row, or `None` once the source is exhausted
    fn next_row(&mut self) -> TableResult<Option<Row>>;
}

/// An ordered, finite sequence of rows
pub trait RowSource: Send + Sync {
    /// Returns the column layout of every row
    fn schema(&self) -> &TableSchema;

    /// Returns the number of rows if known in advance
    fn row_count(&self) -> Option<u64> {
        None
    }

    /// Opens a new cursor positioned before the first row
    fn cursor(&self) -> TableResult<Box<dyn RowCursor + '_>>;
}

/// A fully materialized table
#[derive(Debug, Clone)]
pub struct MemoryTable {
    schema: TableSchema,
    rows: Vec<Row>,
}

impl MemoryTable {
    /// Creates a table from keyed cells; positions are assigned in order.
    ///
    /// Keys must be unique and cells must fit the schema.
    pub fn new(schema: TableSchema, rows: Vec<(String, Vec<Cell>)>) -> TableResult<Self> {
        let mut keys = HashSet::with_capacity(rows.len());
        let mut indexed = Vec::with_capacity(rows.len());

        for (index, (key, cells)) in rows.into_iter().enumerate() {
            schema.check_cells(&key, &cells)?;
            if !keys.insert(key.clone()) {
                return Err(TableError::DuplicateKey(key));
            }
            indexed.push(Row::new(key, index as u64, cells));
        }

        Ok(Self {
            schema,
            rows: indexed,
        })
    }

    /// Returns all rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowSource for MemoryTable {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn row_count(&self) -> Option<u64> {
        Some(self.rows.len() as u64)
    }

    fn cursor(&self) -> TableResult<Box<dyn RowCursor + '_>> {
        Ok(Box::new(MemoryCursor {
            rows: &self.rows,
            position: 0,
        }))
    }
}

struct MemoryCursor<'a> {
    rows: &'a [Row],
    position: usize,
}

impl RowCursor for MemoryCursor<'_> {
    fn next_row(&mut self) -> TableResult<Option<Row>> {
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::types::{ColumnSpec, ColumnType};

    fn table() -> MemoryTable {
        let schema = TableSchema::new(vec![ColumnSpec::new("v", ColumnType::Int)]).unwrap();
        MemoryTable::new(
            schema,
            (0..3).map(|i| (format!("Row{}", i), vec![Cell::Int(i)])).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_positions_assigned_in_order() {
        let t = table();
        let indexes: Vec<u64> = t.rows().iter().map(|r| r.index()).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(t.row_count(), Some(3));
    }

    #[test]
    fn test_independent_cursors() {
        let t = table();
        let mut a = t.cursor().unwrap();
        let mut b = t.cursor().unwrap();

        assert_eq!(a.next_row().unwrap().unwrap().key(), "Row0");
        assert_eq!(a.next_row().unwrap().unwrap().key(), "Row1");
        assert_eq!(b.next_row().unwrap().unwrap().key(), "Row0");
        assert_eq!(a.next_row().unwrap().unwrap().key(), "Row2");
        assert!(a.next_row().unwrap().is_none());
        assert!(a.next_row().unwrap().is_none());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let schema = TableSchema::new(vec![ColumnSpec::new("v", ColumnType::Int)]).unwrap();
        let result = MemoryTable::new(
            schema,
            vec![
                ("a".into(), vec![Cell::Int(1)]),
                ("a".into(), vec![Cell::Int(2)]),
            ],
        );
        assert!(matches!(result, Err(TableError::DuplicateKey(_))));
    }
}
