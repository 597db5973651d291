//! CLI argument definitions using clap
//!
//! Commands:
//! - rowfilter filter --config <path> --input <path> --output <path>
//! - rowfilter split --config <path> --input <path> --matched <path> --unmatched <path>
//! - rowfilter validate --config <path> --input <path>
//! - rowfilter count --input <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rowfilter - filter rows of JSON-lines tables with a single predicate
#[derive(Parser, Debug)]
#[command(name = "rowfilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the rows the filter keeps to one output table
    Filter {
        /// Path to run configuration file
        #[arg(long, default_value = "./rowfilter.json")]
        config: PathBuf,

        /// Input table (JSON lines)
        #[arg(long)]
        input: PathBuf,

        /// Output table (JSON lines)
        #[arg(long)]
        output: PathBuf,
    },

    /// Route every row to a matched or an unmatched output table
    Split {
        /// Path to run configuration file
        #[arg(long, default_value = "./rowfilter.json")]
        config: PathBuf,

        /// Input table (JSON lines)
        #[arg(long)]
        input: PathBuf,

        /// Output table for kept rows
        #[arg(long)]
        matched: PathBuf,

        /// Output table for all other rows
        #[arg(long)]
        unmatched: PathBuf,
    },

    /// Check the filter configuration against an input table without reading rows
    Validate {
        /// Path to run configuration file
        #[arg(long, default_value = "./rowfilter.json")]
        config: PathBuf,

        /// Input table (JSON lines)
        #[arg(long)]
        input: PathBuf,
    },

    /// Count the rows of a table on a background thread
    Count {
        /// Input table (JSON lines)
        #[arg(long)]
        input: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
