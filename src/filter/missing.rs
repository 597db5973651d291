//! Missing value predicate

use crate::settings::{Settings, SettingsResult};
use crate::table::{Row, TableSchema};

use super::diagnostics::Diagnostic;
use super::outcome::Outcome;
use super::predicate::{resolve_column, RowPredicate};

const KEY_COLUMN: &str = "column";

/// Matches rows whose cell in `column` is the missing sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingValueFilter {
    column: String,
}

impl MissingValueFilter {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub(crate) fn bind(
        &self,
        schema: &TableSchema,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Box<dyn RowPredicate>> {
        let column = resolve_column(schema, &self.column, diagnostics)?;
        Some(Box::new(MissingValuePredicate { column }))
    }

    pub(crate) fn save(&self, settings: &mut Settings) {
        settings.add_string(KEY_COLUMN, self.column.as_str());
    }

    pub(crate) fn load(settings: &Settings) -> SettingsResult<Self> {
        Ok(Self::new(settings.get_string(KEY_COLUMN)?))
    }
}

struct MissingValuePredicate {
    column: usize,
}

impl RowPredicate for MissingValuePredicate {
    fn test(&self, row: &Row, _index: u64) -> Outcome {
        match row.cell(self.column) {
            Some(cell) if cell.is_missing() => Outcome::Match,
            _ => Outcome::NoMatch,
        }
    }
}
