//! JSON-lines table files
//!
//! Layout:
//! - line 1: header `{"columns":[{"name":..,"type":..}],"row_count":..}`
//!   (`row_count` optional)
//! - following lines: one `{"key":..,"cells":[..]}` object per row
//!
//! Blank lines are skipped. Row keys must be unique within a file. Every
//! cursor reopens the file, so any number of cursors can read the same
//! table independently.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{TableError, TableResult};
use super::sink::RowSink;
use super::source::{RowCursor, RowSource};
use super::types::{Cell, ColumnSpec, Row, TableSchema};

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    columns: Vec<ColumnSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    row_count: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RowLine {
    key: String,
    cells: Vec<Value>,
}

/// A table stored as a JSON-lines file
#[derive(Debug)]
pub struct JsonLinesTable {
    path: PathBuf,
    schema: TableSchema,
    row_count: Option<u64>,
}

impl JsonLinesTable {
    /// Opens a table file and reads its header
    pub fn open(path: impl AsRef<Path>) -> TableResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = open_reader(&path)?;
        let header = read_header(&mut reader, &path)?;
        let schema = TableSchema::new(header.columns)?;

        Ok(Self {
            path,
            schema,
            row_count: header.row_count,
        })
    }

    /// Returns the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for JsonLinesTable {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    fn cursor(&self) -> TableResult<Box<dyn RowCursor + '_>> {
        let mut reader = open_reader(&self.path)?;
        read_header(&mut reader, &self.path)?;

        Ok(Box::new(JsonLinesCursor {
            reader,
            path: &self.path,
            schema: &self.schema,
            line: 1,
            index: 0,
            buffer: String::new(),
            seen_keys: HashSet::new(),
        }))
    }
}

struct JsonLinesCursor<'a> {
    reader: BufReader<File>,
    path: &'a Path,
    schema: &'a TableSchema,
    line: u64,
    index: u64,
    buffer: String,
    seen_keys: HashSet<String>,
}

impl JsonLinesCursor<'_> {
    fn malformed(&self, reason: impl Into<String>) -> TableError {
        TableError::Malformed {
            path: self.path.to_path_buf(),
            line: self.line,
            reason: reason.into(),
        }
    }

    fn decode(&self, text: &str) -> TableResult<Row> {
        let parsed: RowLine =
            serde_json::from_str(text).map_err(|e| self.malformed(e.to_string()))?;

        if parsed.cells.len() != self.schema.len() {
            return Err(TableError::ArityMismatch {
                key: parsed.key,
                expected: self.schema.len(),
                actual: parsed.cells.len(),
            });
        }

        let cells = parsed
            .cells
            .iter()
            .zip(self.schema.columns())
            .map(|(value, column)| Cell::from_json(value, column.column_type))
            .collect::<TableResult<Vec<_>>>()
            .map_err(|e| self.malformed(e.to_string()))?;

        Ok(Row::new(parsed.key, self.index, cells))
    }
}

impl RowCursor for JsonLinesCursor<'_> {
    fn next_row(&mut self) -> TableResult<Option<Row>> {
        loop {
            self.buffer.clear();
            let read = self
                .reader
                .read_line(&mut self.buffer)
                .map_err(|e| TableError::io(self.path, e))?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buffer.trim();
            if text.is_empty() {
                continue;
            }

            let row = self.decode(text)?;
            if !self.seen_keys.insert(row.key().to_string()) {
                return Err(TableError::DuplicateKey(row.key().to_string()));
            }
            self.index += 1;
            return Ok(Some(row));
        }
    }
}

/// Sink writing a JSON-lines table file
pub struct JsonLinesSink {
    path: PathBuf,
    schema: TableSchema,
    writer: Option<BufWriter<File>>,
    rows_written: u64,
}

impl JsonLinesSink {
    /// Creates (or truncates) the file and writes the header
    pub fn create(path: impl AsRef<Path>, schema: TableSchema) -> TableResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| TableError::io(&path, e))?;
        let mut writer = BufWriter::new(file);

        let header = Header {
            columns: schema.columns().to_vec(),
            row_count: None,
        };
        serde_json::to_writer(&mut writer, &header)
            .map_err(|e| TableError::io(&path, e.into()))?;
        writeln!(writer).map_err(|e| TableError::io(&path, e))?;

        Ok(Self {
            path,
            schema,
            writer: Some(writer),
            rows_written: 0,
        })
    }

    /// Returns the number of rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl RowSink for JsonLinesSink {
    fn push(&mut self, row: Row) -> TableResult<()> {
        let writer = match self.writer.as_mut() {
            Some(w) => w,
            None => return Err(TableError::SinkClosed(self.path.display().to_string())),
        };
        self.schema.check_cells(row.key(), row.cells())?;

        let line = RowLine {
            key: row.key().to_string(),
            cells: row.cells().iter().map(Cell::to_json).collect(),
        };
        serde_json::to_writer(&mut *writer, &line)
            .map_err(|e| TableError::io(&self.path, e.into()))?;
        writeln!(writer).map_err(|e| TableError::io(&self.path, e))?;

        self.rows_written += 1;
        Ok(())
    }

    fn close(&mut self) -> TableResult<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(|e| TableError::io(&self.path, e)),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

fn open_reader(path: &Path) -> TableResult<BufReader<File>> {
    let file = File::open(path).map_err(|e| TableError::io(path, e))?;
    Ok(BufReader::new(file))
}

fn read_header(reader: &mut BufReader<File>, path: &Path) -> TableResult<Header> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| TableError::io(path, e))?;

    if line.trim().is_empty() {
        return Err(TableError::Malformed {
            path: path.to_path_buf(),
            line: 1,
            reason: "missing header line".into(),
        });
    }

    serde_json::from_str(line.trim()).map_err(|e| TableError::Malformed {
        path: path.to_path_buf(),
        line: 1,
        reason: e.to_string(),
    })
}
