//! Cell, column and row definitions
//!
//! Supported column types:
//! - bool: Boolean
//! - int: 64-bit signed integer
//! - double: 64-bit floating point
//! - string: UTF-8 string
//! - datetime: naive date-time (no zone)
//!
//! Every column may hold the missing sentinel `Cell::Missing`.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{TableError, TableResult};

/// Textual form used when date-time cells are written out
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Double,
    /// UTF-8 string
    String,
    /// Naive date-time
    DateTime,
}

impl ColumnType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::Double => "double",
            ColumnType::String => "string",
            ColumnType::DateTime => "datetime",
        }
    }

    /// Returns the type both operands are promoted to before comparison,
    /// or `None` if the two types share no ordering.
    pub fn common_ordering(a: ColumnType, b: ColumnType) -> Option<ColumnType> {
        match (a, b) {
            (x, y) if x == y => Some(x),
            (ColumnType::Int, ColumnType::Double) | (ColumnType::Double, ColumnType::Int) => {
                Some(ColumnType::Double)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A single typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// The explicit missing sentinel
    Missing,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Returns true if this is the missing sentinel
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Returns the column type this cell belongs to, `None` for missing
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Cell::Missing => None,
            Cell::Bool(_) => Some(ColumnType::Bool),
            Cell::Int(_) => Some(ColumnType::Int),
            Cell::Double(_) => Some(ColumnType::Double),
            Cell::String(_) => Some(ColumnType::String),
            Cell::DateTime(_) => Some(ColumnType::DateTime),
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        self.column_type().map_or("missing", |t| t.type_name())
    }

    /// Compares two cells under their natural ordering.
    ///
    /// Int and Double are promoted to Double. Returns `None` for missing
    /// cells, NaN, and type pairs without a common ordering.
    pub fn compare(&self, other: &Cell) -> Option<Ordering> {
        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => Some(a.cmp(b)),
            (Cell::Int(a), Cell::Double(b)) => (*a as f64).partial_cmp(b),
            (Cell::Double(a), Cell::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Cell::Double(a), Cell::Double(b)) => a.partial_cmp(b),
            (Cell::String(a), Cell::String(b)) => Some(a.cmp(b)),
            (Cell::Bool(a), Cell::Bool(b)) => Some(a.cmp(b)),
            (Cell::DateTime(a), Cell::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Decodes a JSON value as a cell of the given column type.
    ///
    /// `null` decodes to the missing sentinel. Integers are accepted in
    /// double columns, as are the strings `"NaN"`, `"Infinity"` and
    /// `"-Infinity"`; nothing else is coerced.
    pub fn from_json(value: &Value, column_type: ColumnType) -> TableResult<Cell> {
        if value.is_null() {
            return Ok(Cell::Missing);
        }

        let cell = match (column_type, value) {
            (ColumnType::Bool, Value::Bool(b)) => Some(Cell::Bool(*b)),
            (ColumnType::Int, Value::Number(n)) => n.as_i64().map(Cell::Int),
            (ColumnType::Double, Value::Number(n)) => n.as_f64().map(Cell::Double),
            (ColumnType::Double, Value::String(s)) => non_finite_from_str(s).map(Cell::Double),
            (ColumnType::String, Value::String(s)) => Some(Cell::String(s.clone())),
            (ColumnType::DateTime, Value::String(s)) => s.parse::<NaiveDateTime>().ok().map(Cell::DateTime),
            _ => None,
        };

        cell.ok_or_else(|| TableError::CellType {
            value: value.to_string(),
            expected: column_type,
        })
    }

    /// Encodes this cell as a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Missing => Value::Null,
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Int(i) => Value::from(*i),
            Cell::Double(d) => match serde_json::Number::from_f64(*d) {
                Some(n) => Value::Number(n),
                // JSON numbers are finite
                None => Value::from(non_finite_str(*d)),
            },
            Cell::String(s) => Value::String(s.clone()),
            Cell::DateTime(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
        }
    }
}

const NAN_TEXT: &str = "NaN";
const INFINITY_TEXT: &str = "Infinity";
const NEG_INFINITY_TEXT: &str = "-Infinity";

fn non_finite_str(d: f64) -> &'static str {
    if d.is_nan() {
        NAN_TEXT
    } else if d.is_sign_positive() {
        INFINITY_TEXT
    } else {
        NEG_INFINITY_TEXT
    }
}

fn non_finite_from_str(s: &str) -> Option<f64> {
    match s {
        NAN_TEXT => Some(f64::NAN),
        INFINITY_TEXT => Some(f64::INFINITY),
        NEG_INFINITY_TEXT => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "?"),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Double(d) => write!(f, "{}", d),
            Cell::String(s) => write!(f, "{}", s),
            Cell::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(d: f64) -> Self {
        Cell::Double(d)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::String(s.to_string())
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name, unique within a schema
    pub name: String,
    /// Column data type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered column layout of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Creates a schema, rejecting empty and duplicate column names
    pub fn new(columns: Vec<ColumnSpec>) -> TableResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.is_empty() {
                return Err(TableError::InvalidSchema("column names must not be empty".into()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Returns the columns in order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Returns the number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the positional index of a column by name
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the column at a position
    pub fn column(&self, index: usize) -> Option<&ColumnSpec> {
        self.columns.get(index)
    }

    /// Checks that cells fit this schema (arity and per-column type)
    pub fn check_cells(&self, key: &str, cells: &[Cell]) -> TableResult<()> {
        if cells.len() != self.columns.len() {
            return Err(TableError::ArityMismatch {
                key: key.to_string(),
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        for (cell, column) in cells.iter().zip(&self.columns) {
            match cell.column_type() {
                None => {}
                Some(t) if t == column.column_type => {}
                Some(t) => {
                    return Err(TableError::ColumnType {
                        key: key.to_string(),
                        column: column.name.clone(),
                        expected: column.column_type,
                        actual: t,
                    })
                }
            }
        }
        Ok(())
    }
}

/// An immutable row: ordered cells, a unique key, and its 0-based position
/// in the source it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    key: String,
    index: u64,
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(key: impl Into<String>, index: u64, cells: Vec<Cell>) -> Self {
        Self {
            key: key.into(),
            index,
            cells,
        }
    }

    /// Returns the row key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the 0-based position in the source sequence
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns all cells in column order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns the cell at a column position
    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }
}
