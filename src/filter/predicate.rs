//! Filter configuration, binding, and the include/exclude wrapper
//!
//! A `RowFilter` is plain configuration. `configure` binds it against a
//! schema: columns resolve to positions, patterns compile, and every
//! problem is reported as a `Diagnostic` before a single row is read.
//! The resulting `ConfiguredFilter` evaluates rows without any error path.

use std::fmt;

use crate::observability::{log_event_with_fields, Event};
use crate::settings::{Settings, SettingsError, SettingsResult};
use crate::table::{Row, TableSchema};

use super::diagnostics::{error_summary, has_errors, Diagnostic};
use super::errors::{FilterError, FilterResult};
use super::missing::MissingValueFilter;
use super::outcome::Outcome;
use super::pattern::PatternFilter;
use super::range::RangeFilter;
use super::row_key::RowKeyFilter;
use super::row_number::RowNumberFilter;

pub(crate) const KEY_FILTER_TYPE: &str = "filter_type";
pub(crate) const KEY_INCLUDE: &str = "include";

/// A predicate bound to one schema
///
/// `test` reports the raw decision for a row; polarity is applied by the
/// caller. Predicates that emit terminal outcomes were bound with their
/// polarity and return them already resolved.
pub trait RowPredicate: Send + Sync {
    /// Evaluates one row at its 0-based source position
    fn test(&self, row: &Row, index: u64) -> Outcome;

    /// Decides the row at `next_index` from its position alone, without
    /// reading it. Only terminal answers are acted upon.
    fn lookahead(&self, _next_index: u64) -> Option<Outcome> {
        None
    }
}

/// The predicate variants
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Range(RangeFilter),
    Pattern(PatternFilter),
    MissingValue(MissingValueFilter),
    RowNumber(RowNumberFilter),
    RowKey(RowKeyFilter),
}

impl FilterKind {
    /// Returns the type tag persisted in settings
    pub fn type_tag(&self) -> &'static str {
        match self {
            FilterKind::Range(_) => "range",
            FilterKind::Pattern(_) => "pattern",
            FilterKind::MissingValue(_) => "missing",
            FilterKind::RowNumber(_) => "row_number",
            FilterKind::RowKey(_) => "row_key",
        }
    }

    fn bind(
        &self,
        schema: &TableSchema,
        include: bool,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Box<dyn RowPredicate>> {
        match self {
            FilterKind::Range(f) => f.bind(schema, diagnostics),
            FilterKind::Pattern(f) => f.bind(schema, diagnostics),
            FilterKind::MissingValue(f) => f.bind(schema, diagnostics),
            FilterKind::RowNumber(f) => f.bind(include, diagnostics),
            FilterKind::RowKey(f) => f.bind(diagnostics),
        }
    }

    fn save(&self, settings: &mut Settings) {
        match self {
            FilterKind::Range(f) => f.save(settings),
            FilterKind::Pattern(f) => f.save(settings),
            FilterKind::MissingValue(f) => f.save(settings),
            FilterKind::RowNumber(f) => f.save(settings),
            FilterKind::RowKey(f) => f.save(settings),
        }
    }

    fn load(tag: &str, settings: &Settings) -> SettingsResult<Self> {
        match tag {
            "range" => RangeFilter::load(settings).map(FilterKind::Range),
            "pattern" => PatternFilter::load(settings).map(FilterKind::Pattern),
            "missing" => MissingValueFilter::load(settings).map(FilterKind::MissingValue),
            "row_number" => RowNumberFilter::load(settings).map(FilterKind::RowNumber),
            "row_key" => RowKeyFilter::load(settings).map(FilterKind::RowKey),
            other => Err(SettingsError::invalid_value(
                KEY_FILTER_TYPE,
                format!("unknown filter type '{}'", other),
            )),
        }
    }
}

impl From<RangeFilter> for FilterKind {
    fn from(f: RangeFilter) -> Self {
        FilterKind::Range(f)
    }
}

impl From<PatternFilter> for FilterKind {
    fn from(f: PatternFilter) -> Self {
        FilterKind::Pattern(f)
    }
}

impl From<MissingValueFilter> for FilterKind {
    fn from(f: MissingValueFilter) -> Self {
        FilterKind::MissingValue(f)
    }
}

impl From<RowNumberFilter> for FilterKind {
    fn from(f: RowNumberFilter) -> Self {
        FilterKind::RowNumber(f)
    }
}

impl From<RowKeyFilter> for FilterKind {
    fn from(f: RowKeyFilter) -> Self {
        FilterKind::RowKey(f)
    }
}

/// A filter configuration: one predicate variant under an include flag
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    kind: FilterKind,
    include: bool,
}

impl RowFilter {
    /// Keeps the rows the predicate matches
    pub fn include(kind: impl Into<FilterKind>) -> Self {
        Self {
            kind: kind.into(),
            include: true,
        }
    }

    /// Keeps the rows the predicate does not match
    pub fn exclude(kind: impl Into<FilterKind>) -> Self {
        Self {
            kind: kind.into(),
            include: false,
        }
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn is_include(&self) -> bool {
        self.include
    }

    /// Returns every diagnostic binding against `schema` would produce
    pub fn check(&self, schema: &TableSchema) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let _ = self.kind.bind(schema, self.include, &mut diagnostics);
        diagnostics
    }

    /// Binds this filter to a schema.
    ///
    /// Warnings are logged and kept on the result. Any error diagnostic
    /// rejects the configuration.
    pub fn configure(&self, schema: &TableSchema) -> FilterResult<ConfiguredFilter> {
        let filter_type = self.kind.type_tag();
        let mut diagnostics = Vec::new();
        let predicate = self.kind.bind(schema, self.include, &mut diagnostics);

        let predicate = match predicate {
            Some(p) if !has_errors(&diagnostics) => p,
            _ => {
                let reason = error_summary(&diagnostics);
                log_event_with_fields(
                    Event::FilterRejected,
                    &[("filter_type", filter_type), ("reason", reason.as_str())],
                );
                return Err(FilterError::invalid_settings(reason));
            }
        };

        for warning in &diagnostics {
            log_event_with_fields(
                Event::FilterWarning,
                &[("filter_type", filter_type), ("message", warning.message())],
            );
        }

        log_event_with_fields(
            Event::FilterConfigured,
            &[
                ("filter_type", filter_type),
                ("include", if self.include { "true" } else { "false" }),
            ],
        );

        Ok(ConfiguredFilter {
            predicate,
            filter_type,
            include: self.include,
            warnings: diagnostics,
        })
    }

    /// Writes the type tag, polarity and parameters into `settings`
    pub fn save_to(&self, settings: &mut Settings) {
        settings.add_string(KEY_FILTER_TYPE, self.kind.type_tag());
        settings.add_bool(KEY_INCLUDE, self.include);
        self.kind.save(settings);
    }

    /// Returns a fresh settings tree holding this filter
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::new();
        self.save_to(&mut settings);
        settings
    }

    /// Restores a filter; missing or mistyped required keys are errors
    pub fn load_from(settings: &Settings) -> SettingsResult<Self> {
        let tag = settings.get_string(KEY_FILTER_TYPE)?;
        let include = settings.get_bool(KEY_INCLUDE)?;
        let kind = FilterKind::load(tag, settings)?;
        Ok(Self { kind, include })
    }
}

/// A filter bound to one schema
pub struct ConfiguredFilter {
    predicate: Box<dyn RowPredicate>,
    filter_type: &'static str,
    include: bool,
    warnings: Vec<Diagnostic>,
}

impl ConfiguredFilter {
    /// Evaluates a row; `Match` means the row is kept.
    ///
    /// Ordinary results are reported as `matched == include`. Terminal
    /// outcomes are returned unchanged.
    pub fn evaluate(&self, row: &Row, index: u64) -> Outcome {
        match self.predicate.test(row, index) {
            Outcome::Match if self.include => Outcome::Match,
            Outcome::NoMatch if !self.include => Outcome::Match,
            Outcome::Match | Outcome::NoMatch => Outcome::NoMatch,
            terminal => terminal,
        }
    }

    /// Returns a terminal outcome for the row at `next_index` if its
    /// position alone decides the rest of the stream
    pub fn lookahead(&self, next_index: u64) -> Option<Outcome> {
        self.predicate
            .lookahead(next_index)
            .filter(Outcome::is_terminal)
    }

    pub fn filter_type(&self) -> &'static str {
        self.filter_type
    }

    pub fn include(&self) -> bool {
        self.include
    }

    /// Non-fatal diagnostics raised while binding
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

impl fmt::Debug for ConfiguredFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredFilter")
            .field("filter_type", &self.filter_type)
            .field("include", &self.include)
            .field("warnings", &self.warnings)
            .finish()
    }
}

/// Resolves a column name to its position, recording an error if absent
pub(crate) fn resolve_column(
    schema: &TableSchema,
    column: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<usize> {
    if column.is_empty() {
        diagnostics.push(Diagnostic::error("No column selected"));
        return None;
    }
    let position = schema.find_column(column);
    if position.is_none() {
        diagnostics.push(Diagnostic::error(format!(
            "Column '{}' not found in input table",
            column
        )));
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PatternMode;
    use crate::table::{Cell, ColumnSpec, ColumnType};

    fn schema() -> TableSchema {
        TableSchema::new(vec![
            ColumnSpec::new("name", ColumnType::String),
            ColumnSpec::new("age", ColumnType::Int),
        ])
        .unwrap()
    }

    fn row(index: u64, name: &str, age: i64) -> Row {
        Row::new(format!("Row{}", index), index, vec![Cell::from(name), Cell::Int(age)])
    }

    #[test]
    fn test_polarity_flips_ordinary_results() {
        let kind = RangeFilter::new("age", Some(Cell::Int(18)), None);
        let include = RowFilter::include(kind.clone()).configure(&schema()).unwrap();
        let exclude = RowFilter::exclude(kind).configure(&schema()).unwrap();

        let adult = row(0, "a", 30);
        let child = row(1, "b", 10);

        assert_eq!(include.evaluate(&adult, 0), Outcome::Match);
        assert_eq!(include.evaluate(&child, 1), Outcome::NoMatch);
        assert_eq!(exclude.evaluate(&adult, 0), Outcome::NoMatch);
        assert_eq!(exclude.evaluate(&child, 1), Outcome::Match);
    }

    #[test]
    fn test_terminal_outcomes_ignore_polarity_wrapper() {
        let filter = RowFilter::exclude(RowNumberFilter::new(0, Some(1)))
            .configure(&schema())
            .unwrap();
        // Past the excluded block everything is kept
        assert_eq!(filter.evaluate(&row(2, "c", 1), 2), Outcome::TerminalInclude);
    }

    #[test]
    fn test_unknown_column_rejected_at_configure() {
        let filter = RowFilter::include(MissingValueFilter::new("height"));
        let err = filter.configure(&schema()).unwrap_err();
        assert!(err.is_invalid_settings());
        assert!(err.message().contains("height"));
    }

    #[test]
    fn test_warning_does_not_reject() {
        let filter = RowFilter::include(PatternFilter::new("age", "3*", PatternMode::Wildcard, true));
        let configured = filter.configure(&schema()).unwrap();
        assert_eq!(configured.warnings().len(), 1);
        assert_eq!(configured.evaluate(&row(0, "a", 30), 0), Outcome::Match);
        assert_eq!(configured.evaluate(&row(1, "b", 40), 1), Outcome::NoMatch);
    }

    #[test]
    fn test_check_reports_without_binding() {
        let filter = RowFilter::include(RangeFilter::new("name", None, None));
        let diagnostics = filter.check(&schema());
        assert!(has_errors(&diagnostics));
    }

    #[test]
    fn test_settings_round_trip() {
        let filter = RowFilter::exclude(PatternFilter::new("name", "a?c", PatternMode::Wildcard, false));
        let settings = filter.to_settings();
        assert_eq!(settings.get_string(KEY_FILTER_TYPE).unwrap(), "pattern");

        let restored = RowFilter::load_from(&settings).unwrap();
        assert_eq!(restored, filter);
    }

    #[test]
    fn test_unknown_filter_type() {
        let mut settings = Settings::new();
        settings.add_string(KEY_FILTER_TYPE, "nearest_neighbour");
        settings.add_bool(KEY_INCLUDE, true);
        let err = RowFilter::load_from(&settings).unwrap_err();
        assert!(err.to_string().contains("nearest_neighbour"));
    }

    #[test]
    fn test_missing_include_is_named() {
        let mut settings = Settings::new();
        settings.add_string(KEY_FILTER_TYPE, "missing");
        settings.add_string("column", "name");
        let err = RowFilter::load_from(&settings).unwrap_err();
        assert_eq!(err, SettingsError::MissingKey(KEY_INCLUDE.into()));
    }
}
