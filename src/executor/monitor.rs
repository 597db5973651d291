//! Progress reporting and cooperative cancellation
//!
//! A run polls `check_canceled` once per source row. Cancellation is a
//! shared flag; the run unwinds with a `ROWFILTER_CANCELED` error rather
//! than stopping abruptly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::filter::{FilterError, FilterResult};
use crate::observability::{log_event_with_fields, Event};

/// Shared cancellation flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; cannot be undone
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The narrow channel a run reports through
pub trait ExecutionMonitor: Sync {
    /// Sets progress in `[0, 1]` with a status message
    fn set_progress(&self, fraction: f64, message: &str);

    /// Sets the status message without a fraction
    fn set_message(&self, message: &str);

    /// Fails with a cancellation error if cancellation was requested
    fn check_canceled(&self) -> FilterResult<()>;
}

/// Latest reported progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    /// `None` when the total row count is unknown
    pub fraction: Option<f64>,
    pub message: String,
}

/// Default monitor: a cancellation token plus the latest progress
#[derive(Debug)]
pub struct ExecutionContext {
    token: CancellationToken,
    progress: Mutex<Progress>,
    log_interval: u64,
    updates: AtomicU64,
}

/// Progress lines are logged once per this many updates by default
pub const DEFAULT_PROGRESS_LOG_INTERVAL: u64 = 10_000;

impl ExecutionContext {
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            progress: Mutex::new(Progress::default()),
            log_interval: DEFAULT_PROGRESS_LOG_INTERVAL,
            updates: AtomicU64::new(0),
        }
    }

    /// Logs a progress line every `interval` updates; 0 disables the lines
    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Requests cancellation of the run using this context
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }

    /// Returns a copy of the latest progress
    pub fn progress(&self) -> Progress {
        match self.progress.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, fraction: Option<f64>, message: &str) {
        {
            let mut guard = match self.progress.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if fraction.is_some() {
                guard.fraction = fraction;
            }
            guard.message = message.to_string();
        }

        let n = self.updates.fetch_add(1, Ordering::Relaxed) + 1;
        if self.log_interval > 0 && n % self.log_interval == 0 {
            log_event_with_fields(Event::Progress, &[("message", message)]);
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionMonitor for ExecutionContext {
    fn set_progress(&self, fraction: f64, message: &str) {
        self.update(Some(fraction.clamp(0.0, 1.0)), message);
    }

    fn set_message(&self, message: &str) {
        self.update(None, message);
    }

    fn check_canceled(&self) -> FilterResult<()> {
        if self.token.is_canceled() {
            log_event_with_fields(Event::Canceled, &[]);
            return Err(FilterError::canceled());
        }
        Ok(())
    }
}

/// Reports rows consumed so far, as a fraction when the total is known
pub(crate) fn report_progress(monitor: &dyn ExecutionMonitor, consumed: u64, total: Option<u64>) {
    match total {
        Some(total) if total > 0 => {
            let message = format!("Processed row {} of {}", consumed, total);
            monitor.set_progress(consumed as f64 / total as f64, &message);
        }
        _ => monitor.set_message(&format!("Processed row {}", consumed)),
    }
}
