//! Streaming executor
//!
//! Drives a filter over a row source end to end.
//!
//! Execution flow (strict order):
//! 1. Bind the filter to the source schema; a configuration error aborts
//!    before any row is pulled
//! 2. Pull rows one at a time, checking cancellation once per row
//! 3. Route each row by its outcome, honouring short circuits
//! 4. Close every sink, on success and on every error path

use uuid::Uuid;

use crate::filter::{
    log_short_circuit, ChainState, ConfiguredFilter, FilterError, FilterResult, FilteredRows,
    RowFilter,
};
use crate::observability::{FilterMetrics, ObservationScope, Timer};
use crate::table::{Row, RowSink, RowSource};

use super::monitor::{report_progress, ExecutionMonitor};
use super::result::{ExecutionSummary, RunCounts};

/// Closes its sink when dropped unless already closed
struct SinkGuard<'s> {
    sink: &'s mut dyn RowSink,
}

impl<'s> SinkGuard<'s> {
    fn new(sink: &'s mut dyn RowSink) -> Self {
        Self { sink }
    }

    fn push(&mut self, row: Row) -> FilterResult<()> {
        self.sink
            .push(row)
            .map_err(|e| FilterError::sink_failed(e.to_string()))
    }

    /// Closes the sink, reporting a failure to finalize it
    fn finish(self) -> FilterResult<()> {
        self.sink
            .close()
            .map_err(|e| FilterError::sink_failed(e.to_string()))
    }
}

impl Drop for SinkGuard<'_> {
    fn drop(&mut self) {
        if !self.sink.is_closed() {
            // Already unwinding from an earlier error; that error is the one reported
            let _ = self.sink.close();
        }
    }
}

/// Runs filters over one source
pub struct StreamingExecutor<'a, S: RowSource + ?Sized> {
    source: &'a S,
    metrics: Option<&'a FilterMetrics>,
}

impl<'a, S: RowSource + ?Sized> StreamingExecutor<'a, S> {
    /// Creates an executor reading from `source`
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            metrics: None,
        }
    }

    /// Records run counters into `metrics`
    pub fn with_metrics(mut self, metrics: &'a FilterMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Writes the rows the filter keeps to `sink`.
    ///
    /// A terminal exclude stops reading; rows after it are never pulled.
    pub fn execute(
        &self,
        filter: &RowFilter,
        sink: &mut dyn RowSink,
        monitor: &dyn ExecutionMonitor,
    ) -> FilterResult<ExecutionSummary> {
        let sink = SinkGuard::new(sink);
        let configured = self.bind(filter)?;
        self.run("filter", &configured, |configured| {
            Self::drive_single(self.source, configured, sink, monitor)
        })
    }

    /// Writes every row to exactly one of `matched` and `unmatched`.
    ///
    /// After a terminal exclude the remaining rows are still read and go to
    /// `unmatched` without evaluation.
    pub fn execute_split(
        &self,
        filter: &RowFilter,
        matched: &mut dyn RowSink,
        unmatched: &mut dyn RowSink,
        monitor: &dyn ExecutionMonitor,
    ) -> FilterResult<ExecutionSummary> {
        let matched = SinkGuard::new(matched);
        let unmatched = SinkGuard::new(unmatched);
        let configured = self.bind(filter)?;
        self.run("split", &configured, |configured| {
            Self::drive_split(self.source, configured, matched, unmatched, monitor)
        })
    }

    fn bind(&self, filter: &RowFilter) -> FilterResult<ConfiguredFilter> {
        if let Some(metrics) = self.metrics {
            metrics.increment_runs_started();
        }
        filter.configure(self.source.schema()).map_err(|e| {
            if let Some(metrics) = self.metrics {
                metrics.increment_runs_rejected();
            }
            e
        })
    }

    fn run<F>(
        &self,
        mode: &'static str,
        configured: &ConfiguredFilter,
        drive: F,
    ) -> FilterResult<ExecutionSummary>
    where
        F: FnOnce(&ConfiguredFilter) -> FilterResult<RunCounts>,
    {
        let run_id = Uuid::new_v4();
        let run_id_text = run_id.to_string();
        let scope = ObservationScope::with_fields(
            "FILTER_RUN",
            &[
                ("run_id", run_id_text.as_str()),
                ("mode", mode),
                ("filter_type", configured.filter_type()),
            ],
        );
        let timer = Timer::new();

        match drive(configured) {
            Ok(counts) => {
                let summary = counts.into_summary(run_id, timer.elapsed_ms());
                if let Some(metrics) = self.metrics {
                    metrics.record_completed_run(
                        summary.rows_read,
                        summary.rows_matched,
                        summary.rows_unmatched,
                        summary.short_circuit.is_some(),
                    );
                }
                let rows_read = summary.rows_read.to_string();
                let rows_matched = summary.rows_matched.to_string();
                let rows_unmatched = summary.rows_unmatched.to_string();
                let elapsed = summary.elapsed_ms.to_string();
                scope.complete_with_fields(&[
                    ("rows_read", rows_read.as_str()),
                    ("rows_matched", rows_matched.as_str()),
                    ("rows_unmatched", rows_unmatched.as_str()),
                    ("short_circuit", summary.short_circuit.map_or("none", |s| s.as_str())),
                    ("elapsed_ms", elapsed.as_str()),
                ]);
                Ok(summary)
            }
            Err(e) if e.is_canceled() => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_runs_canceled();
                }
                scope.abort(e.message());
                Err(e)
            }
            Err(e) => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_runs_failed();
                }
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn drive_single(
        source: &S,
        configured: &ConfiguredFilter,
        mut sink: SinkGuard<'_>,
        monitor: &dyn ExecutionMonitor,
    ) -> FilterResult<RunCounts> {
        let mut rows = FilteredRows::new(source, configured, monitor)?;
        let mut matched = 0;
        for row in rows.by_ref() {
            sink.push(row?)?;
            matched += 1;
        }
        let read = rows.rows_consumed();
        let short_circuit = rows.short_circuit();
        sink.finish()?;

        Ok(RunCounts {
            read,
            matched,
            unmatched: read - matched,
            short_circuit,
        })
    }

    fn drive_split(
        source: &S,
        configured: &ConfiguredFilter,
        mut matched: SinkGuard<'_>,
        mut unmatched: SinkGuard<'_>,
        monitor: &dyn ExecutionMonitor,
    ) -> FilterResult<RunCounts> {
        let mut cursor = source.cursor()?;
        let total = source.row_count();
        let mut state = ChainState::Evaluating;
        let mut counts = RunCounts::default();

        loop {
            if state == ChainState::Evaluating {
                if let Some(outcome) = configured.lookahead(counts.read) {
                    state = state.apply(outcome);
                    counts.short_circuit = outcome.short_circuit();
                    if let Some(kind) = counts.short_circuit {
                        log_short_circuit(configured, kind, counts.read);
                    }
                }
            }

            monitor.check_canceled()?;
            let row = match cursor.next_row()? {
                Some(row) => row,
                None => break,
            };
            let index = counts.read;
            counts.read += 1;
            report_progress(monitor, counts.read, total);

            let keep = match state {
                ChainState::IncludeRest => true,
                ChainState::ExcludeRest => false,
                ChainState::Evaluating => {
                    let outcome = configured.evaluate(&row, index);
                    if let Some(kind) = outcome.short_circuit() {
                        state = state.apply(outcome);
                        counts.short_circuit = Some(kind);
                        log_short_circuit(configured, kind, index);
                    }
                    outcome.keeps_row()
                }
            };

            if keep {
                matched.push(row)?;
                counts.matched += 1;
            } else {
                unmatched.push(row)?;
                counts.unmatched += 1;
            }
        }

        matched.finish()?;
        unmatched.finish()?;
        Ok(counts)
    }
}

/// Writes the rows `filter` keeps from `source` to `sink`
pub fn execute_filter<S: RowSource + ?Sized>(
    source: &S,
    filter: &RowFilter,
    sink: &mut dyn RowSink,
    monitor: &dyn ExecutionMonitor,
) -> FilterResult<ExecutionSummary> {
    StreamingExecutor::new(source).execute(filter, sink, monitor)
}

/// Routes every row of `source` to `matched` or `unmatched`
pub fn split_filter<S: RowSource + ?Sized>(
    source: &S,
    filter: &RowFilter,
    matched: &mut dyn RowSink,
    unmatched: &mut dyn RowSink,
    monitor: &dyn ExecutionMonitor,
) -> FilterResult<ExecutionSummary> {
    StreamingExecutor::new(source).execute_split(filter, matched, unmatched, monitor)
}
