//! Value range predicate
//!
//! Matches when a column value lies in `[lower, upper]`. Either bound may be
//! absent (open on that side) but not both. Bounds are compared under the
//! cells' natural ordering; int and double promote to double.

use chrono::NaiveDateTime;

use crate::settings::{Settings, SettingsError, SettingsResult};
use crate::table::{Cell, ColumnType, Row, TableSchema};

use super::diagnostics::Diagnostic;
use super::outcome::Outcome;
use super::predicate::{resolve_column, RowPredicate};

const KEY_COLUMN: &str = "column";
const KEY_LOWER: &str = "lower";
const KEY_UPPER: &str = "upper";
const KEY_BOUND_TYPE: &str = "type";
const KEY_BOUND_VALUE: &str = "value";

/// Range filter configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    column: String,
    lower: Option<Cell>,
    upper: Option<Cell>,
}

impl RangeFilter {
    pub fn new(column: impl Into<String>, lower: Option<Cell>, upper: Option<Cell>) -> Self {
        Self {
            column: column.into(),
            lower,
            upper,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn lower(&self) -> Option<&Cell> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Cell> {
        self.upper.as_ref()
    }

    pub(crate) fn bind(
        &self,
        schema: &TableSchema,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Box<dyn RowPredicate>> {
        let column = resolve_column(schema, &self.column, diagnostics);

        if self.lower.is_none() && self.upper.is_none() {
            diagnostics.push(Diagnostic::error(
                "Range filter needs a lower bound, an upper bound, or both",
            ));
        }

        let column_type = column
            .and_then(|c| schema.column(c))
            .map(|spec| spec.column_type);

        let mut bounds_valid = true;
        for (side, bound) in [("Lower", &self.lower), ("Upper", &self.upper)] {
            if let Some(bound) = bound {
                bounds_valid &= check_bound(side, bound, column_type, diagnostics);
            }
        }

        if bounds_valid {
            if let (Some(lower), Some(upper)) = (&self.lower, &self.upper) {
                if lower.compare(upper) == Some(std::cmp::Ordering::Greater) {
                    diagnostics.push(Diagnostic::error(format!(
                        "Lower bound {} is greater than upper bound {}",
                        lower, upper
                    )));
                    bounds_valid = false;
                }
            }
        }

        match column {
            Some(column) if bounds_valid && (self.lower.is_some() || self.upper.is_some()) => {
                Some(Box::new(RangePredicate {
                    column,
                    lower: self.lower.clone(),
                    upper: self.upper.clone(),
                }))
            }
            _ => None,
        }
    }

    pub(crate) fn save(&self, settings: &mut Settings) {
        settings.add_string(KEY_COLUMN, self.column.as_str());
        if let Some(lower) = &self.lower {
            settings.add_tree(KEY_LOWER, save_bound(lower));
        }
        if let Some(upper) = &self.upper {
            settings.add_tree(KEY_UPPER, save_bound(upper));
        }
    }

    pub(crate) fn load(settings: &Settings) -> SettingsResult<Self> {
        let column = settings.get_string(KEY_COLUMN)?.to_string();
        let lower = settings
            .get_tree_opt(KEY_LOWER)?
            .map(|t| load_bound(KEY_LOWER, t))
            .transpose()?;
        let upper = settings
            .get_tree_opt(KEY_UPPER)?
            .map(|t| load_bound(KEY_UPPER, t))
            .transpose()?;
        Ok(Self {
            column,
            lower,
            upper,
        })
    }
}

fn check_bound(
    side: &str,
    bound: &Cell,
    column_type: Option<ColumnType>,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let bound_type = match bound.column_type() {
        Some(t) => t,
        None => {
            diagnostics.push(Diagnostic::error(format!("{} bound must not be missing", side)));
            return false;
        }
    };

    if let Cell::Double(d) = bound {
        if d.is_nan() {
            diagnostics.push(Diagnostic::error(format!("{} bound must be a number", side)));
            return false;
        }
    }

    match column_type {
        Some(ct) if ColumnType::common_ordering(ct, bound_type).is_none() => {
            diagnostics.push(Diagnostic::error(format!(
                "{} bound {} ({}) cannot be compared with column values ({})",
                side, bound, bound_type, ct
            )));
            false
        }
        _ => true,
    }
}

fn save_bound(bound: &Cell) -> Settings {
    let mut tree = Settings::new();
    if let Some(t) = bound.column_type() {
        tree.add_string(KEY_BOUND_TYPE, t.type_name());
    }
    match bound {
        Cell::Bool(b) => tree.add_bool(KEY_BOUND_VALUE, *b),
        Cell::Int(i) => tree.add_int(KEY_BOUND_VALUE, *i),
        Cell::Double(d) => tree.add_double(KEY_BOUND_VALUE, *d),
        Cell::String(s) => tree.add_string(KEY_BOUND_VALUE, s.as_str()),
        Cell::DateTime(_) => tree.add_string(KEY_BOUND_VALUE, bound.to_string()),
        Cell::Missing => {}
    }
    tree
}

fn load_bound(side: &str, tree: &Settings) -> SettingsResult<Cell> {
    let in_bound = |e: SettingsError| match e {
        SettingsError::MissingKey(k) => SettingsError::MissingKey(format!("{}.{}", side, k)),
        other => other,
    };

    let bound_type = tree.get_string(KEY_BOUND_TYPE).map_err(in_bound)?;
    let cell = match bound_type {
        "bool" => Cell::Bool(tree.get_bool(KEY_BOUND_VALUE).map_err(in_bound)?),
        "int" => Cell::Int(tree.get_int(KEY_BOUND_VALUE).map_err(in_bound)?),
        "double" => Cell::Double(tree.get_double(KEY_BOUND_VALUE).map_err(in_bound)?),
        "string" => Cell::String(tree.get_string(KEY_BOUND_VALUE).map_err(in_bound)?.to_string()),
        "datetime" => {
            let text = tree.get_string(KEY_BOUND_VALUE).map_err(in_bound)?;
            let dt = text.parse::<NaiveDateTime>().map_err(|e| {
                SettingsError::invalid_value(format!("{}.{}", side, KEY_BOUND_VALUE), e.to_string())
            })?;
            Cell::DateTime(dt)
        }
        other => {
            return Err(SettingsError::invalid_value(
                format!("{}.{}", side, KEY_BOUND_TYPE),
                format!("unknown type '{}'", other),
            ))
        }
    };
    Ok(cell)
}

struct RangePredicate {
    column: usize,
    lower: Option<Cell>,
    upper: Option<Cell>,
}

impl RangePredicate {
    fn in_range(&self, value: &Cell) -> bool {
        use std::cmp::Ordering::*;

        if value.is_missing() {
            return false;
        }
        let above_lower = match &self.lower {
            Some(lower) => matches!(value.compare(lower), Some(Greater | Equal)),
            None => true,
        };
        let below_upper = match &self.upper {
            Some(upper) => matches!(value.compare(upper), Some(Less | Equal)),
            None => true,
        };
        above_lower && below_upper
    }
}

impl RowPredicate for RangePredicate {
    fn test(&self, row: &Row, _index: u64) -> Outcome {
        match row.cell(self.column) {
            Some(value) if self.in_range(value) => Outcome::Match,
            _ => Outcome::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::diagnostics::has_errors;
    use crate::table::ColumnSpec;

    fn schema() -> TableSchema {
        TableSchema::new(vec![
            ColumnSpec::new("score", ColumnType::Double),
            ColumnSpec::new("name", ColumnType::String),
            ColumnSpec::new("seen", ColumnType::DateTime),
        ])
        .unwrap()
    }

    fn row(score: Cell) -> Row {
        Row::new("Row0", 0, vec![score, Cell::from("x"), Cell::Missing])
    }

    fn bind(filter: &RangeFilter) -> (Option<Box<dyn RowPredicate>>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let predicate = filter.bind(&schema(), &mut diagnostics);
        (predicate, diagnostics)
    }

    #[test]
    fn test_closed_range_inclusive() {
        let filter = RangeFilter::new("score", Some(Cell::Int(1)), Some(Cell::Double(2.5)));
        let (predicate, diagnostics) = bind(&filter);
        assert!(diagnostics.is_empty());
        let predicate = predicate.unwrap();

        assert_eq!(predicate.test(&row(Cell::Double(1.0)), 0), Outcome::Match);
        assert_eq!(predicate.test(&row(Cell::Double(2.5)), 0), Outcome::Match);
        assert_eq!(predicate.test(&row(Cell::Double(0.99)), 0), Outcome::NoMatch);
        assert_eq!(predicate.test(&row(Cell::Double(2.51)), 0), Outcome::NoMatch);
    }

    #[test]
    fn test_open_bounds() {
        let (predicate, _) = bind(&RangeFilter::new("score", None, Some(Cell::Int(0))));
        let predicate = predicate.unwrap();
        assert_eq!(predicate.test(&row(Cell::Double(-1e300)), 0), Outcome::Match);
        assert_eq!(predicate.test(&row(Cell::Double(0.1)), 0), Outcome::NoMatch);
    }

    #[test]
    fn test_missing_and_nan_never_match() {
        let (predicate, _) = bind(&RangeFilter::new("score", Some(Cell::Int(0)), None));
        let predicate = predicate.unwrap();
        assert_eq!(predicate.test(&row(Cell::Missing), 0), Outcome::NoMatch);
        assert_eq!(predicate.test(&row(Cell::Double(f64::NAN)), 0), Outcome::NoMatch);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let filter = RangeFilter::new("score", Some(Cell::Int(5)), Some(Cell::Int(1)));
        let (predicate, diagnostics) = bind(&filter);
        assert!(predicate.is_none());
        assert!(has_errors(&diagnostics));
        assert!(diagnostics[0].message().contains("greater than"));
    }

    #[test]
    fn test_incomparable_bound_rejected() {
        let filter = RangeFilter::new("score", Some(Cell::from("a")), None);
        let (predicate, diagnostics) = bind(&filter);
        assert!(predicate.is_none());
        assert!(diagnostics[0].message().contains("cannot be compared"));
    }

    #[test]
    fn test_no_bounds_rejected() {
        let (predicate, diagnostics) = bind(&RangeFilter::new("score", None, None));
        assert!(predicate.is_none());
        assert!(has_errors(&diagnostics));
    }

    #[test]
    fn test_string_range() {
        let filter = RangeFilter::new("name", Some(Cell::from("m")), Some(Cell::from("t")));
        let mut diagnostics = Vec::new();
        let predicate = filter.bind(&schema(), &mut diagnostics).unwrap();
        let pick = |name: &str| Row::new("k", 0, vec![Cell::Double(0.0), Cell::from(name), Cell::Missing]);
        assert_eq!(predicate.test(&pick("pear"), 0), Outcome::Match);
        assert_eq!(predicate.test(&pick("apple"), 0), Outcome::NoMatch);
    }

    #[test]
    fn test_datetime_bound_survives_settings() {
        let dt = "2024-03-01T12:30:00".parse::<NaiveDateTime>().unwrap();
        let filter = RangeFilter::new("seen", Some(Cell::DateTime(dt)), None);
        let mut settings = Settings::new();
        filter.save(&mut settings);
        assert_eq!(RangeFilter::load(&settings).unwrap(), filter);
    }

    #[test]
    fn test_bound_missing_value_named() {
        let mut bound = Settings::new();
        bound.add_string(KEY_BOUND_TYPE, "int");
        let mut settings = Settings::new();
        settings.add_string(KEY_COLUMN, "score");
        settings.add_tree(KEY_LOWER, bound);

        let err = RangeFilter::load(&settings).unwrap_err();
        assert_eq!(err, SettingsError::MissingKey("lower.value".into()));
    }
}
