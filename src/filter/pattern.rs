//! String pattern predicate
//!
//! Three matching modes, each optionally case-insensitive:
//! - literal: the pattern occurs anywhere in the value
//! - wildcard: `*` any sequence, `?` one character, anchored at both ends
//! - regex: full regular expression, anchored at both ends
//!
//! Patterns compile once at configure time. Non-string columns are matched
//! against their text rendering, with a warning.

use regex::{Regex, RegexBuilder};

use crate::settings::{Settings, SettingsError, SettingsResult};
use crate::table::{Cell, ColumnType, Row, TableSchema};

use super::diagnostics::Diagnostic;
use super::outcome::Outcome;
use super::predicate::{resolve_column, RowPredicate};

const KEY_COLUMN: &str = "column";
const KEY_PATTERN: &str = "pattern";
const KEY_MODE: &str = "mode";
const KEY_CASE_SENSITIVE: &str = "case_sensitive";

/// How a pattern is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    Literal,
    Wildcard,
    Regex,
}

impl PatternMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternMode::Literal => "literal",
            PatternMode::Wildcard => "wildcard",
            PatternMode::Regex => "regex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "literal" => Some(PatternMode::Literal),
            "wildcard" => Some(PatternMode::Wildcard),
            "regex" => Some(PatternMode::Regex),
            _ => None,
        }
    }
}

/// Translates a wildcard pattern into an anchored regular expression.
///
/// `*` becomes `.*`, `?` becomes `.`, every other character is literal.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    out.push('$');
    out
}

/// Compiles a user pattern into a matcher; the error names the pattern
/// and the reason.
pub(crate) fn compile_pattern(
    pattern: &str,
    mode: PatternMode,
    case_sensitive: bool,
) -> Result<Regex, String> {
    if pattern.is_empty() {
        return Err("Invalid pattern '': the pattern is empty".into());
    }

    let source = match mode {
        PatternMode::Literal => regex::escape(pattern),
        PatternMode::Wildcard => wildcard_to_regex(pattern),
        PatternMode::Regex => format!("^(?:{})$", pattern),
    };

    RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| format!("Invalid pattern '{}': {}", pattern, e))
}

/// Pattern filter configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PatternFilter {
    column: String,
    pattern: String,
    mode: PatternMode,
    case_sensitive: bool,
}

impl PatternFilter {
    pub fn new(
        column: impl Into<String>,
        pattern: impl Into<String>,
        mode: PatternMode,
        case_sensitive: bool,
    ) -> Self {
        Self {
            column: column.into(),
            pattern: pattern.into(),
            mode,
            case_sensitive,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub(crate) fn bind(
        &self,
        schema: &TableSchema,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Box<dyn RowPredicate>> {
        let column = resolve_column(schema, &self.column, diagnostics);

        if let Some(spec) = column.and_then(|c| schema.column(c)) {
            if spec.column_type != ColumnType::String {
                diagnostics.push(Diagnostic::warning(format!(
                    "Column '{}' holds {} values; matching against their text form",
                    spec.name, spec.column_type
                )));
            }
        }

        let regex = match compile_pattern(&self.pattern, self.mode, self.case_sensitive) {
            Ok(regex) => Some(regex),
            Err(reason) => {
                diagnostics.push(Diagnostic::error(reason));
                None
            }
        };

        Some(Box::new(PatternPredicate {
            column: column?,
            regex: regex?,
        }))
    }

    pub(crate) fn save(&self, settings: &mut Settings) {
        settings.add_string(KEY_COLUMN, self.column.as_str());
        settings.add_string(KEY_PATTERN, self.pattern.as_str());
        settings.add_string(KEY_MODE, self.mode.as_str());
        settings.add_bool(KEY_CASE_SENSITIVE, self.case_sensitive);
    }

    pub(crate) fn load(settings: &Settings) -> SettingsResult<Self> {
        let mode = settings.get_string(KEY_MODE)?;
        let mode = PatternMode::parse(mode).ok_or_else(|| {
            SettingsError::invalid_value(KEY_MODE, format!("unknown pattern mode '{}'", mode))
        })?;
        Ok(Self {
            column: settings.get_string(KEY_COLUMN)?.to_string(),
            pattern: settings.get_string(KEY_PATTERN)?.to_string(),
            mode,
            case_sensitive: settings.get_bool(KEY_CASE_SENSITIVE)?,
        })
    }
}

struct PatternPredicate {
    column: usize,
    regex: Regex,
}

impl RowPredicate for PatternPredicate {
    fn test(&self, row: &Row, _index: u64) -> Outcome {
        let matched = match row.cell(self.column) {
            None | Some(Cell::Missing) => false,
            Some(Cell::String(s)) => self.regex.is_match(s),
            Some(other) => self.regex.is_match(&other.to_string()),
        };
        if matched {
            Outcome::Match
        } else {
            Outcome::NoMatch
        }
    }
}
