//! Lazy filtered row sequence
//!
//! `FilteredRows` pulls rows from a cursor one at a time and yields only
//! those the filter keeps, in source order. Per step:
//!
//! 1. While evaluating, ask the filter whether the next position alone
//!    ends or includes the rest of the stream
//! 2. Check cancellation
//! 3. Pull one row and report progress
//! 4. Evaluate it, unless every remaining row is already included
//!
//! The sequence ends at source exhaustion or on `TerminalExclude`; it is
//! fused and not restartable.

use std::iter::FusedIterator;

use crate::executor::{report_progress, ExecutionMonitor};
use crate::observability::{log_event_with_fields, Event};
use crate::table::{Row, RowCursor, RowSource};

use super::errors::FilterResult;
use super::outcome::{ChainState, Outcome, ShortCircuit};
use super::predicate::ConfiguredFilter;

/// Rows of a source kept by a configured filter
pub struct FilteredRows<'a> {
    cursor: Box<dyn RowCursor + 'a>,
    filter: &'a ConfiguredFilter,
    monitor: &'a dyn ExecutionMonitor,
    state: ChainState,
    done: bool,
    consumed: u64,
    total: Option<u64>,
    short_circuit: Option<ShortCircuit>,
}

impl<'a> FilteredRows<'a> {
    /// Opens a fresh cursor on `source`
    pub fn new<S>(
        source: &'a S,
        filter: &'a ConfiguredFilter,
        monitor: &'a dyn ExecutionMonitor,
    ) -> FilterResult<Self>
    where
        S: RowSource + ?Sized,
    {
        Ok(Self {
            cursor: source.cursor()?,
            filter,
            monitor,
            state: ChainState::Evaluating,
            done: false,
            consumed: 0,
            total: source.row_count(),
            short_circuit: None,
        })
    }

    /// Number of rows pulled from the source so far
    pub fn rows_consumed(&self) -> u64 {
        self.consumed
    }

    /// The short circuit taken, if any
    pub fn short_circuit(&self) -> Option<ShortCircuit> {
        self.short_circuit
    }

    fn enter(&mut self, outcome: Outcome, index: u64) {
        self.state = self.state.apply(outcome);
        if let Some(kind) = outcome.short_circuit() {
            self.short_circuit = Some(kind);
            log_short_circuit(self.filter, kind, index);
        }
    }

    fn finish(&mut self) -> Option<FilterResult<Row>> {
        self.done = true;
        None
    }
}

impl Iterator for FilteredRows<'_> {
    type Item = FilterResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.state == ChainState::Evaluating {
                if let Some(outcome) = self.filter.lookahead(self.consumed) {
                    self.enter(outcome, self.consumed);
                }
            }
            if self.state == ChainState::ExcludeRest {
                return self.finish();
            }

            if let Err(e) = self.monitor.check_canceled() {
                self.done = true;
                return Some(Err(e));
            }

            let row = match self.cursor.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => return self.finish(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            let index = self.consumed;
            self.consumed += 1;
            report_progress(self.monitor, self.consumed, self.total);

            if self.state == ChainState::IncludeRest {
                return Some(Ok(row));
            }

            match self.filter.evaluate(&row, index) {
                Outcome::Match => return Some(Ok(row)),
                Outcome::NoMatch => continue,
                outcome @ Outcome::TerminalInclude => {
                    self.enter(outcome, index);
                    return Some(Ok(row));
                }
                outcome @ Outcome::TerminalExclude => {
                    self.enter(outcome, index);
                    return self.finish();
                }
            }
        }
    }
}

impl FusedIterator for FilteredRows<'_> {}

pub(crate) fn log_short_circuit(filter: &ConfiguredFilter, kind: ShortCircuit, index: u64) {
    let index = index.to_string();
    log_event_with_fields(
        Event::ShortCircuit,
        &[
            ("kind", kind.as_str()),
            ("filter_type", filter.filter_type()),
            ("row_index", index.as_str()),
        ],
    );
}
