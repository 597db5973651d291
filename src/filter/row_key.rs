//! Row key predicate

use regex::{Regex, RegexBuilder};

use crate::settings::{Settings, SettingsError, SettingsResult};
use crate::table::Row;

use super::diagnostics::Diagnostic;
use super::outcome::Outcome;
use super::predicate::RowPredicate;

const KEY_PATTERN: &str = "pattern";
const KEY_MODE: &str = "mode";
const KEY_CASE_SENSITIVE: &str = "case_sensitive";

/// How the key is compared with the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    /// Whole key equals the pattern
    Exact,
    /// Key starts with the pattern
    Prefix,
    /// Whole key matches the regular expression
    Regex,
}

impl KeyMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyMatch::Exact => "exact",
            KeyMatch::Prefix => "prefix",
            KeyMatch::Regex => "regex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(KeyMatch::Exact),
            "prefix" => Some(KeyMatch::Prefix),
            "regex" => Some(KeyMatch::Regex),
            _ => None,
        }
    }
}

/// Row key filter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKeyFilter {
    pattern: String,
    mode: KeyMatch,
    case_sensitive: bool,
}

impl RowKeyFilter {
    pub fn new(pattern: impl Into<String>, mode: KeyMatch, case_sensitive: bool) -> Self {
        Self {
            pattern: pattern.into(),
            mode,
            case_sensitive,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn mode(&self) -> KeyMatch {
        self.mode
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn compile(&self) -> Result<Regex, String> {
        if self.pattern.is_empty() {
            return Err("Invalid row key pattern '': the pattern is empty".into());
        }
        let source = match self.mode {
            KeyMatch::Exact => format!("^{}$", regex::escape(&self.pattern)),
            KeyMatch::Prefix => format!("^{}", regex::escape(&self.pattern)),
            KeyMatch::Regex => format!("^(?:{})$", self.pattern),
        };
        RegexBuilder::new(&source)
            .case_insensitive(!self.case_sensitive)
            .build()
            .map_err(|e| format!("Invalid row key pattern '{}': {}", self.pattern, e))
    }

    pub(crate) fn bind(&self, diagnostics: &mut Vec<Diagnostic>) -> Option<Box<dyn RowPredicate>> {
        match self.compile() {
            Ok(regex) => Some(Box::new(RowKeyPredicate { regex })),
            Err(reason) => {
                diagnostics.push(Diagnostic::error(reason));
                None
            }
        }
    }

    pub(crate) fn save(&self, settings: &mut Settings) {
        settings.add_string(KEY_PATTERN, self.pattern.as_str());
        settings.add_string(KEY_MODE, self.mode.as_str());
        settings.add_bool(KEY_CASE_SENSITIVE, self.case_sensitive);
    }

    pub(crate) fn load(settings: &Settings) -> SettingsResult<Self> {
        let mode = settings.get_string(KEY_MODE)?;
        let mode = KeyMatch::parse(mode).ok_or_else(|| {
            SettingsError::invalid_value(KEY_MODE, format!("unknown key match '{}'", mode))
        })?;
        Ok(Self {
            pattern: settings.get_string(KEY_PATTERN)?.to_string(),
            mode,
            case_sensitive: settings.get_bool(KEY_CASE_SENSITIVE)?,
        })
    }
}

struct RowKeyPredicate {
    regex: Regex,
}

impl RowPredicate for RowKeyPredicate {
    fn test(&self, row: &Row, _index: u64) -> Outcome {
        if self.regex.is_match(row.key()) {
            Outcome::Match
        } else {
            Outcome::NoMatch
        }
    }
}
