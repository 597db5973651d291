//! Row filter subsystem
//!
//! One predicate per filter operation, evaluated under an include/exclude
//! flag. Evaluation yields one of four outcomes:
//!
//! - `Match` / `NoMatch`: keep or drop this row
//! - `TerminalInclude`: keep this row and every following row
//! - `TerminalExclude`: drop this row and every following row
//!
//! Terminal outcomes are control flow, never errors.
//!
//! # Lifecycle
//!
//! 1. Build or load a `RowFilter` (plain configuration)
//! 2. `configure` it against the input schema; all configuration errors
//!    surface here, before any row is read
//! 3. Evaluate rows with the `ConfiguredFilter`, directly or through
//!    `FilteredRows`

mod diagnostics;
mod errors;
mod iterator;
mod missing;
mod outcome;
mod pattern;
mod predicate;
mod range;
mod row_key;
mod row_number;

pub use diagnostics::{has_errors, Diagnostic, Severity};
pub use errors::{FilterError, FilterErrorCode, FilterResult};
pub use iterator::FilteredRows;
pub use missing::MissingValueFilter;
pub use outcome::{Outcome, ShortCircuit};
pub use pattern::{wildcard_to_regex, PatternFilter, PatternMode};
pub use predicate::{ConfiguredFilter, FilterKind, RowFilter, RowPredicate};
pub use range::RangeFilter;
pub use row_key::{KeyMatch, RowKeyFilter};
pub use row_number::RowNumberFilter;

pub(crate) use iterator::log_short_circuit;
pub(crate) use outcome::ChainState;
