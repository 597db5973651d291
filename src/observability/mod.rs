//! Observability subsystem
//!
//! - Structured JSON event lines through the `log` facade
//! - Scoped begin/complete logging for runs
//! - Run counters
//!
//! Observability is read-only: it never changes what a run produces.
//!
//! ```ignore
//! use rowfilter::observability::{Logger, Event, ObservationScope};
//!
//! Logger::info("FILTER_CONFIGURED", &[("filter", "row_number")]);
//! let scope = ObservationScope::new("FILTER_RUN");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, LOG_TARGET};
pub use metrics::{FilterMetrics, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::emit(event.level(), event.as_str(), fields);
}
