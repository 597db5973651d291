//! rowfilter - single-predicate row filtering over tabular data
//!
//! A filter is configured once against a table schema, then streamed over
//! the rows of a source into one output, or into matched and unmatched
//! outputs. Predicates may short-circuit the rest of a stream.

pub mod cli;
pub mod executor;
pub mod filter;
pub mod observability;
pub mod settings;
pub mod table;
