//! Streaming Executor Tests
//!
//! Test Categories:
//! 1. Dual-output row conservation
//! 2. Cancellation closes both sinks and is reported as cancellation
//! 3. JSON-lines tables end to end
//! 4. Background row counting alongside other readers

use std::collections::HashSet;
use std::sync::Arc;

use rowfilter::executor::{
    execute_filter, split_filter, CancellationToken, ExecutionContext, ExecutionMonitor,
    RowCounter, StreamingExecutor,
};
use rowfilter::filter::{
    FilterResult, KeyMatch, MissingValueFilter, PatternFilter, PatternMode, RangeFilter,
    RowFilter, RowKeyFilter, RowNumberFilter,
};
use rowfilter::observability::FilterMetrics;
use rowfilter::table::{
    Cell, ColumnSpec, ColumnType, JsonLinesSink, JsonLinesTable, MemoryTable, Row, RowCursor,
    RowSink, RowSource, TableBuffer, TableSchema,
};
use tempfile::TempDir;

// =============================================================================
// HELPERS
// =============================================================================

fn schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnSpec::new("name", ColumnType::String),
        ColumnSpec::new("score", ColumnType::Double),
    ])
    .unwrap()
}

fn table(n: usize) -> MemoryTable {
    let rows = (0..n)
        .map(|i| {
            let score = if i % 3 == 0 {
                Cell::Missing
            } else {
                Cell::Double(i as f64 * 1.5)
            };
            (format!("Row{}", i), vec![Cell::from(format!("item-{}", i).as_str()), score])
        })
        .collect();
    MemoryTable::new(schema(), rows).unwrap()
}

fn keys(rows: &[Row]) -> HashSet<String> {
    rows.iter().map(|r| r.key().to_string()).collect()
}

/// Monitor that requests cancellation once `after` rows have been reported
struct CancelAfter {
    ctx: ExecutionContext,
    after: u64,
    reported: std::sync::atomic::AtomicU64,
}

impl CancelAfter {
    fn new(after: u64) -> Self {
        Self {
            ctx: ExecutionContext::new(),
            after,
            reported: std::sync::atomic::AtomicU64::new(0),
        }
    }

    fn tick(&self) {
        let n = self
            .reported
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1;
        if n == self.after {
            self.ctx.cancel();
        }
    }
}

impl ExecutionMonitor for CancelAfter {
    fn set_progress(&self, fraction: f64, message: &str) {
        self.ctx.set_progress(fraction, message);
        self.tick();
    }

    fn set_message(&self, message: &str) {
        self.ctx.set_message(message);
        self.tick();
    }

    fn check_canceled(&self) -> FilterResult<()> {
        self.ctx.check_canceled()
    }
}

// =============================================================================
// ROW CONSERVATION
// =============================================================================

/// Test: every row lands in exactly one sink, for every predicate variant.
#[test]
fn test_dual_output_conserves_rows() {
    let source = table(20);
    let all = keys(source.rows());

    let filters = vec![
        RowFilter::include(RangeFilter::new("score", Some(Cell::Int(3)), Some(Cell::Int(15)))),
        RowFilter::exclude(PatternFilter::new("name", "item-1*", PatternMode::Wildcard, true)),
        RowFilter::include(MissingValueFilter::new("score")),
        RowFilter::include(RowNumberFilter::new(4, Some(9))),
        RowFilter::exclude(RowNumberFilter::new(4, None)),
        RowFilter::include(RowKeyFilter::new("Row1", KeyMatch::Prefix, true)),
    ];

    for filter in filters {
        let mut matched = TableBuffer::new("matched", schema());
        let mut unmatched = TableBuffer::new("unmatched", schema());
        let ctx = ExecutionContext::new();

        let summary = split_filter(&source, &filter, &mut matched, &mut unmatched, &ctx).unwrap();

        let m = keys(matched.rows());
        let u = keys(unmatched.rows());
        assert!(m.is_disjoint(&u), "{:?}", filter);
        assert_eq!(&m | &u, all, "{:?}", filter);
        assert_eq!(summary.rows_read, 20);
        assert!(summary.is_conserved());
    }
}

/// Test: split keeps source order within each sink.
#[test]
fn test_dual_output_preserves_order() {
    let source = table(10);
    let filter = RowFilter::include(MissingValueFilter::new("score"));
    let mut matched = TableBuffer::new("matched", schema());
    let mut unmatched = TableBuffer::new("unmatched", schema());

    split_filter(&source, &filter, &mut matched, &mut unmatched, &ExecutionContext::new()).unwrap();

    let order: Vec<u64> = matched.rows().iter().map(Row::index).collect();
    assert_eq!(order, vec![0, 3, 6, 9]);
    let order: Vec<u64> = unmatched.rows().iter().map(Row::index).collect();
    assert_eq!(order, vec![1, 2, 4, 5, 7, 8]);
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Test: cancellation after 2 of 5 rows stops the run, closes both sinks,
/// and is reported as cancellation.
#[test]
fn test_cancellation_after_two_rows() {
    let source = table(5);
    let filter = RowFilter::include(RowNumberFilter::new(0, Some(4)));
    let mut matched = TableBuffer::new("matched", schema());
    let mut unmatched = TableBuffer::new("unmatched", schema());
    let monitor = CancelAfter::new(2);
    let metrics = FilterMetrics::new();

    let err = StreamingExecutor::new(&source)
        .with_metrics(&metrics)
        .execute_split(&filter, &mut matched, &mut unmatched, &monitor)
        .unwrap_err();

    assert!(err.is_canceled());
    assert!(matched.is_closed());
    assert!(unmatched.is_closed());
    assert_eq!(matched.len() + unmatched.len(), 2);

    let snap = metrics.snapshot();
    assert_eq!(snap.runs_canceled, 1);
    assert_eq!(snap.runs_failed, 0);
    assert_eq!(snap.runs_completed, 0);
}

/// Test: cancellation in single-output mode closes the sink.
#[test]
fn test_single_output_cancellation_closes_sink() {
    let source = table(5);
    let filter = RowFilter::include(RowNumberFilter::new(0, None));
    let mut out = TableBuffer::new("out", schema());
    let monitor = CancelAfter::new(2);

    let err = execute_filter(&source, &filter, &mut out, &monitor).unwrap_err();
    assert!(err.is_canceled());
    assert!(out.is_closed());
    assert_eq!(out.len(), 2);
}

/// Test: a cancellation requested before the run starts reads nothing.
#[test]
fn test_pre_canceled_run() {
    let source = table(3);
    let filter = RowFilter::include(MissingValueFilter::new("score"));
    let mut out = TableBuffer::new("out", schema());
    let ctx = ExecutionContext::with_token(CancellationToken::new());
    ctx.cancel();

    let err = execute_filter(&source, &filter, &mut out, &ctx).unwrap_err();
    assert!(err.is_canceled());
    assert!(out.is_empty());
    assert!(out.is_closed());
}

// =============================================================================
// JSON-LINES END TO END
// =============================================================================

fn write_table(path: &std::path::Path, source: &MemoryTable) {
    let mut sink = JsonLinesSink::create(path, source.schema().clone()).unwrap();
    for row in source.rows() {
        sink.push(row.clone()).unwrap();
    }
    sink.close().unwrap();
}

fn read_all(table: &JsonLinesTable) -> Vec<Row> {
    let mut cursor = table.cursor().unwrap();
    let mut rows = Vec::new();
    while let Some(row) = cursor.next_row().unwrap() {
        rows.push(row);
    }
    rows
}

/// Test: filter a JSON-lines file into another and read it back.
#[test]
fn test_jsonl_filter_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("input.jsonl");
    let output_path = temp_dir.path().join("output.jsonl");
    write_table(&input_path, &table(9));

    let input = JsonLinesTable::open(&input_path).unwrap();
    let filter = RowFilter::include(MissingValueFilter::new("score"));
    let mut sink = JsonLinesSink::create(&output_path, input.schema().clone()).unwrap();

    let summary = execute_filter(&input, &filter, &mut sink, &ExecutionContext::new()).unwrap();
    assert!(sink.is_closed());
    assert_eq!(sink.rows_written(), 3);
    assert_eq!(summary.rows_read, 9);

    let output = JsonLinesTable::open(&output_path).unwrap();
    let rows = read_all(&output);
    let keys: Vec<&str> = rows.iter().map(Row::key).collect();
    assert_eq!(keys, vec!["Row0", "Row3", "Row6"]);
    assert!(rows.iter().all(|r| r.cell(1) == Some(&Cell::Missing)));
}

/// Test: rows kept for holding a non-finite value are read back unchanged.
#[test]
fn test_jsonl_non_finite_values_stay_present() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("output.jsonl");
    let schema = TableSchema::new(vec![ColumnSpec::new("v", ColumnType::Double)]).unwrap();
    let source = MemoryTable::new(
        schema.clone(),
        vec![
            ("Row0".to_string(), vec![Cell::Double(f64::NAN)]),
            ("Row1".to_string(), vec![Cell::Missing]),
            ("Row2".to_string(), vec![Cell::Double(f64::INFINITY)]),
        ],
    )
    .unwrap();

    let filter = RowFilter::exclude(MissingValueFilter::new("v"));
    let mut sink = JsonLinesSink::create(&output_path, schema).unwrap();
    let summary = execute_filter(&source, &filter, &mut sink, &ExecutionContext::new()).unwrap();
    assert_eq!(summary.rows_matched, 2);

    let rows = read_all(&JsonLinesTable::open(&output_path).unwrap());
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.cell(0).unwrap().is_missing()));
    assert!(matches!(rows[0].cell(0), Some(Cell::Double(d)) if d.is_nan()));
    assert_eq!(rows[1].cell(0), Some(&Cell::Double(f64::INFINITY)));
}

/// Test: two cursors over the same file advance independently.
#[test]
fn test_jsonl_independent_cursors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("t.jsonl");
    write_table(&path, &table(4));

    let source = JsonLinesTable::open(&path).unwrap();
    let mut a = source.cursor().unwrap();
    let mut b = source.cursor().unwrap();

    assert_eq!(a.next_row().unwrap().unwrap().key(), "Row0");
    assert_eq!(a.next_row().unwrap().unwrap().key(), "Row1");
    assert_eq!(b.next_row().unwrap().unwrap().key(), "Row0");
    assert_eq!(a.next_row().unwrap().unwrap().key(), "Row2");
}

// =============================================================================
// BACKGROUND COUNTING
// =============================================================================

/// Test: the counter returns the row count while a filter run reads the
/// same file.
#[test]
fn test_counter_alongside_filter_run() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("t.jsonl");
    write_table(&path, &table(50));

    let source = Arc::new(JsonLinesTable::open(&path).unwrap());
    let counter = RowCounter::spawn(Arc::clone(&source), CancellationToken::new()).unwrap();

    let filter = RowFilter::include(RowNumberFilter::new(0, Some(9)));
    let mut out = TableBuffer::new("out", schema());
    let summary = execute_filter(source.as_ref(), &filter, &mut out, &ExecutionContext::new()).unwrap();

    assert_eq!(summary.rows_matched, 10);
    assert_eq!(counter.join().unwrap(), 50);
}
