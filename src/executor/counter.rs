//! Background row counter
//!
//! Counts the rows of a source on a named thread through its own cursor,
//! while other readers proceed independently. Shares the cancellation
//! token of the run it reports for.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::filter::{FilterError, FilterResult};
use crate::observability::{log_event_with_fields, Event};
use crate::table::RowSource;

use super::monitor::CancellationToken;

const THREAD_NAME: &str = "row-counter";

/// Handle to a running row count
pub struct RowCounter {
    handle: Option<JoinHandle<FilterResult<u64>>>,
    token: CancellationToken,
}

impl RowCounter {
    /// Starts counting `source` on a background thread
    pub fn spawn<S>(source: Arc<S>, token: CancellationToken) -> FilterResult<Self>
    where
        S: RowSource + ?Sized + 'static,
    {
        let thread_token = token.clone();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || count_rows(source.as_ref(), &thread_token))
            .map_err(|e| FilterError::source_failed(format!("Cannot start row counter: {}", e)))?;

        Ok(Self {
            handle: Some(handle),
            token,
        })
    }

    /// Requests cancellation through the shared token
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the count has finished or failed
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the count
    pub fn join(mut self) -> FilterResult<u64> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| FilterError::source_failed("Row counter thread panicked"))?,
            None => Err(FilterError::source_failed("Row counter already joined")),
        }
    }
}

fn count_rows<S: RowSource + ?Sized>(source: &S, token: &CancellationToken) -> FilterResult<u64> {
    let mut cursor = source.cursor()?;
    let mut count = 0u64;
    loop {
        if token.is_canceled() {
            return Err(FilterError::canceled());
        }
        match cursor.next_row()? {
            Some(_) => count += 1,
            None => break,
        }
    }

    let rows = count.to_string();
    log_event_with_fields(Event::CountComplete, &[("rows", rows.as_str())]);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, ColumnSpec, ColumnType, MemoryTable, RowCursor, TableSchema};

    fn table(n: usize) -> Arc<MemoryTable> {
        let schema = TableSchema::new(vec![ColumnSpec::new("v", ColumnType::Int)]).unwrap();
        let rows = (0..n)
            .map(|i| (format!("Row{}", i), vec![Cell::Int(i as i64)]))
            .collect();
        Arc::new(MemoryTable::new(schema, rows).unwrap())
    }

    #[test]
    fn test_counts_rows() {
        let counter = RowCounter::spawn(table(42), CancellationToken::new()).unwrap();
        assert_eq!(counter.join().unwrap(), 42);
    }

    #[test]
    fn test_pre_canceled() {
        let token = CancellationToken::new();
        token.cancel();
        let counter = RowCounter::spawn(table(3), token).unwrap();
        assert!(counter.join().unwrap_err().is_canceled());
    }

    #[test]
    fn test_reads_alongside_other_cursor() {
        let source = table(10);
        let mut cursor = source.cursor().unwrap();
        assert!(cursor.next_row().unwrap().is_some());

        let counter = RowCounter::spawn(Arc::clone(&source), CancellationToken::new()).unwrap();
        assert_eq!(counter.join().unwrap(), 10);
        assert_eq!(cursor.next_row().unwrap().unwrap().index(), 1);
    }
}
