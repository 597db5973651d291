//! Row number predicate
//!
//! Matches positions in `[first, last]` (0-based, inclusive). With no
//! `last` the range runs to the end of the table.
//!
//! Position is known without reading a row, so this predicate decides the
//! rest of the stream as soon as the position leaves the range:
//!
//! | polarity | range     | position        | outcome         |
//! |----------|-----------|-----------------|-----------------|
//! | include  | bounded   | `> last`        | TerminalExclude |
//! | exclude  | bounded   | `> last`        | TerminalInclude |
//! | include  | unbounded | `>= first`      | TerminalInclude |
//! | exclude  | unbounded | `>= first`      | TerminalExclude |

use crate::settings::{Settings, SettingsError, SettingsResult};
use crate::table::Row;

use super::diagnostics::Diagnostic;
use super::outcome::Outcome;
use super::predicate::RowPredicate;

const KEY_FIRST: &str = "first";
const KEY_LAST: &str = "last";

/// Row number filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowNumberFilter {
    first: u64,
    last: Option<u64>,
}

impl RowNumberFilter {
    /// `last = None` means to the end of the table
    pub fn new(first: u64, last: Option<u64>) -> Self {
        Self { first, last }
    }

    pub fn first(&self) -> u64 {
        self.first
    }

    pub fn last(&self) -> Option<u64> {
        self.last
    }

    pub(crate) fn bind(
        &self,
        include: bool,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Box<dyn RowPredicate>> {
        let persistable = |n: u64| i64::try_from(n).is_ok();
        if !persistable(self.first) || !self.last.map_or(true, persistable) {
            diagnostics.push(Diagnostic::error(format!(
                "Row numbers must not exceed {}",
                i64::MAX
            )));
            return None;
        }
        if let Some(last) = self.last {
            if last < self.first {
                diagnostics.push(Diagnostic::error(format!(
                    "Last row number {} is smaller than first row number {}",
                    last, self.first
                )));
                return None;
            }
        }
        Some(Box::new(RowNumberPredicate {
            first: self.first,
            last: self.last,
            include,
        }))
    }

    pub(crate) fn save(&self, settings: &mut Settings) {
        // Values past i64::MAX are rejected by `bind`; saturate rather than wrap
        settings.add_int(KEY_FIRST, saturating_i64(self.first));
        if let Some(last) = self.last {
            settings.add_int(KEY_LAST, saturating_i64(last));
        }
    }

    pub(crate) fn load(settings: &Settings) -> SettingsResult<Self> {
        let first = non_negative(KEY_FIRST, settings.get_int(KEY_FIRST)?)?;
        let last = settings
            .get_int_opt(KEY_LAST)?
            .map(|v| non_negative(KEY_LAST, v))
            .transpose()?;
        Ok(Self { first, last })
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn non_negative(key: &str, value: i64) -> SettingsResult<u64> {
    u64::try_from(value)
        .map_err(|_| SettingsError::invalid_value(key, format!("{} is negative", value)))
}

struct RowNumberPredicate {
    first: u64,
    last: Option<u64>,
    include: bool,
}

impl RowNumberPredicate {
    /// Terminal outcome for a position, if the position decides the rest
    fn terminal_at(&self, index: u64) -> Option<Outcome> {
        let (rest_kept, rest_dropped) = if self.include {
            (Outcome::TerminalInclude, Outcome::TerminalExclude)
        } else {
            (Outcome::TerminalExclude, Outcome::TerminalInclude)
        };
        match self.last {
            None if index >= self.first => Some(rest_kept),
            Some(last) if index > last => Some(rest_dropped),
            _ => None,
        }
    }
}

impl RowPredicate for RowNumberPredicate {
    fn test(&self, _row: &Row, index: u64) -> Outcome {
        if let Some(terminal) = self.terminal_at(index) {
            return terminal;
        }
        if index >= self.first {
            Outcome::Match
        } else {
            Outcome::NoMatch
        }
    }

    fn lookahead(&self, next_index: u64) -> Option<Outcome> {
        self.terminal_at(next_index)
    }
}
