//! CLI command implementations
//!
//! Each command loads what it needs, runs to completion, and returns the
//! JSON data of its response. `run` writes the single response line.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::executor::{
    execute_filter, split_filter, CancellationToken, ExecutionContext, RowCounter,
    DEFAULT_PROGRESS_LOG_INTERVAL,
};
use crate::filter::{has_errors, RowFilter};
use crate::observability::{log_event_with_fields, Event};
use crate::settings::Settings;
use crate::table::{JsonLinesSink, JsonLinesTable, RowSource};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Run configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Persisted filter settings (required)
    pub filter: Settings,

    /// Log a progress line every this many rows (optional, 0 disables)
    #[serde(default = "default_progress_log_interval")]
    pub progress_log_interval: u64,
}

fn default_progress_log_interval() -> u64 {
    DEFAULT_PROGRESS_LOG_INTERVAL
}

impl RunConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: RunConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let path_text = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", path_text.as_str())]);
        Ok(config)
    }

    /// Checks that the filter settings describe a filter
    fn validate(&self) -> CliResult<()> {
        self.row_filter().map(|_| ())
    }

    /// Restores the configured filter
    pub fn row_filter(&self) -> CliResult<RowFilter> {
        RowFilter::load_from(&self.filter)
            .map_err(|e| CliError::config_error(format!("Invalid filter settings: {}", e)))
    }

    fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::new().with_log_interval(self.progress_log_interval)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Filter {
            config,
            input,
            output,
        } => filter(&config, &input, &output),
        Command::Split {
            config,
            input,
            matched,
            unmatched,
        } => split(&config, &input, &matched, &unmatched),
        Command::Validate { config, input } => validate(&config, &input),
        Command::Count { input } => count(&input),
    }
}

/// Writes the rows the filter keeps to `output`
pub fn filter(config_path: &Path, input: &Path, output: &Path) -> CliResult<Value> {
    let config = RunConfig::load(config_path)?;
    let row_filter = config.row_filter()?;
    check_distinct_paths(&[("input", input), ("output", output)])?;
    let source = JsonLinesTable::open(input)?;
    let mut sink = JsonLinesSink::create(output, source.schema().clone())?;

    let summary = execute_filter(&source, &row_filter, &mut sink, &config.execution_context())?;
    Ok(serde_json::to_value(summary)?)
}

/// Routes every row of `input` to `matched` or `unmatched`
pub fn split(config_path: &Path, input: &Path, matched: &Path, unmatched: &Path) -> CliResult<Value> {
    let config = RunConfig::load(config_path)?;
    let row_filter = config.row_filter()?;
    check_distinct_paths(&[("input", input), ("matched", matched), ("unmatched", unmatched)])?;
    let source = JsonLinesTable::open(input)?;
    let mut matched_sink = JsonLinesSink::create(matched, source.schema().clone())?;
    let mut unmatched_sink = JsonLinesSink::create(unmatched, source.schema().clone())?;

    let summary = split_filter(
        &source,
        &row_filter,
        &mut matched_sink,
        &mut unmatched_sink,
        &config.execution_context(),
    )?;
    Ok(serde_json::to_value(summary)?)
}

/// Fails if two of the named paths refer to the same file.
///
/// Runs before any sink is created, since creating a sink truncates its file.
fn check_distinct_paths(paths: &[(&str, &Path)]) -> CliResult<()> {
    let resolved: Vec<PathBuf> = paths.iter().map(|(_, p)| resolve_path(p)).collect();
    for (i, a) in resolved.iter().enumerate() {
        for (j, b) in resolved.iter().enumerate().skip(i + 1) {
            if a == b {
                return Err(CliError::config_error(format!(
                    "{} and {} refer to the same file: {}",
                    paths[i].0,
                    paths[j].0,
                    paths[j].1.display()
                )));
            }
        }
    }
    Ok(())
}

/// Canonical form of `path`; a file that does not exist yet is resolved
/// through its parent directory
fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Reports every configuration diagnostic for `input` without reading rows
pub fn validate(config_path: &Path, input: &Path) -> CliResult<Value> {
    let config = RunConfig::load(config_path)?;
    let row_filter = config.row_filter()?;
    let source = JsonLinesTable::open(input)?;

    let diagnostics = row_filter.check(source.schema());
    let entries: Vec<Value> = diagnostics
        .iter()
        .map(|d| {
            json!({
                "severity": d.severity().as_str(),
                "message": d.message(),
            })
        })
        .collect();

    Ok(json!({
        "valid": !has_errors(&diagnostics),
        "filter_type": row_filter.kind().type_tag(),
        "diagnostics": entries,
    }))
}

/// Counts the rows of `input` on a background thread
pub fn count(input: &Path) -> CliResult<Value> {
    let source = Arc::new(JsonLinesTable::open(input)?);
    let counter = RowCounter::spawn(source, CancellationToken::new())?;
    let rows = counter.join()?;
    Ok(json!({ "rows": rows }))
}
