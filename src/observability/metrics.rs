//! Filter run counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters accumulated over all runs sharing this registry
#[derive(Debug, Default)]
pub struct FilterMetrics {
    runs_started: AtomicU64,
    runs_completed: AtomicU64,
    runs_canceled: AtomicU64,
    runs_rejected: AtomicU64,
    runs_failed: AtomicU64,
    rows_read: AtomicU64,
    rows_matched: AtomicU64,
    rows_unmatched: AtomicU64,
    short_circuits: AtomicU64,
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_completed: u64,
    pub runs_canceled: u64,
    pub runs_rejected: u64,
    pub runs_failed: u64,
    pub rows_read: u64,
    pub rows_matched: u64,
    pub rows_unmatched: u64,
    pub short_circuits: u64,
}

impl FilterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_runs_canceled(&self) {
        self.runs_canceled.fetch_add(1, Ordering::Relaxed);
    }

    /// A run whose filter settings were rejected before reading any row
    pub fn increment_runs_rejected(&self) {
        self.runs_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_runs_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a finished run and its row counts
    pub fn record_completed_run(&self, read: u64, matched: u64, unmatched: u64, short_circuited: bool) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.rows_read.fetch_add(read, Ordering::Relaxed);
        self.rows_matched.fetch_add(matched, Ordering::Relaxed);
        self.rows_unmatched.fetch_add(unmatched, Ordering::Relaxed);
        if short_circuited {
            self.short_circuits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns a copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            runs_canceled: self.runs_canceled.load(Ordering::Relaxed),
            runs_rejected: self.runs_rejected.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            rows_read: self.rows_read.load(Ordering::Relaxed),
            rows_matched: self.rows_matched.load(Ordering::Relaxed),
            rows_unmatched: self.rows_unmatched.load(Ordering::Relaxed),
            short_circuits: self.short_circuits.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_values_zero() {
        assert_eq!(FilterMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_completed_run() {
        let metrics = FilterMetrics::new();
        metrics.increment_runs_started();
        metrics.record_completed_run(10, 4, 6, true);
        metrics.record_completed_run(5, 5, 0, false);

        let snap = metrics.snapshot();
        assert_eq!(snap.runs_started, 1);
        assert_eq!(snap.runs_completed, 2);
        assert_eq!(snap.rows_read, 15);
        assert_eq!(snap.rows_matched, 9);
        assert_eq!(snap.rows_unmatched, 6);
        assert_eq!(snap.short_circuits, 1);
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = Arc::new(FilterMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..250 {
                        m.increment_runs_canceled();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.snapshot().runs_canceled, 1000);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(FilterMetrics::new().snapshot()).unwrap();
        assert_eq!(json["rows_read"], 0);
    }
}
