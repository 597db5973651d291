//! Streaming executor subsystem
//!
//! Drives a configured filter over a row source and writes rows to one
//! sink (matches only) or two sinks (matched and unmatched).
//!
//! # Guarantees
//!
//! - Configuration errors abort before any row is pulled
//! - Dual output conserves rows: every row read lands in exactly one sink
//! - Every sink is closed on every exit path, including cancellation
//! - Cancellation surfaces as `ROWFILTER_CANCELED`, never as a generic error

mod counter;
mod executor;
mod monitor;
mod result;

pub use counter::RowCounter;
pub use executor::{execute_filter, split_filter, StreamingExecutor};
pub use monitor::{
    CancellationToken, ExecutionContext, ExecutionMonitor, Progress,
    DEFAULT_PROGRESS_LOG_INTERVAL,
};
pub use result::ExecutionSummary;

pub(crate) use monitor::report_progress;
