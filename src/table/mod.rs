//! Table subsystem: typed cells, schemas, row sources and sinks
//!
//! # Contracts
//!
//! - Rows are immutable once produced
//! - A source hands out any number of independent forward-only cursors
//! - A sink accepts rows until closed; pushes after close are rejected

mod errors;
mod jsonl;
mod sink;
mod source;
mod types;

pub use errors::{TableError, TableResult};
pub use jsonl::{JsonLinesSink, JsonLinesTable};
pub use sink::{RowSink, TableBuffer};
pub use source::{MemoryTable, RowCursor, RowSource};
pub use types::{Cell, ColumnSpec, ColumnType, Row, TableSchema};
