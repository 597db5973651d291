//! CLI module for rowfilter
//!
//! Provides command-line interface for:
//! - filter: Keep matching rows in one output table
//! - split: Route rows to matched and unmatched tables
//! - validate: Report configuration diagnostics
//! - count: Count rows on a background thread

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{count, filter, run, run_command, split, validate, RunConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
