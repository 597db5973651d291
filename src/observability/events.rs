//! Observable lifecycle events
//!
//! Events are explicit and typed. Run begin/complete lines come from
//! `ObservationScope`; the events here mark the points in between.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Run configuration file loaded
    ConfigLoaded,
    /// Filter bound to an input schema
    FilterConfigured,
    /// Filter settings rejected
    FilterRejected,
    /// Non-fatal configuration diagnostic
    FilterWarning,

    // Evaluation
    /// Predicate declared the rest of the stream included or excluded
    ShortCircuit,
    /// Periodic progress line
    Progress,
    /// Cancellation observed
    Canceled,

    // Background counting
    /// Row count finished
    CountComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::FilterConfigured => "FILTER_CONFIGURED",
            Event::FilterRejected => "FILTER_REJECTED",
            Event::FilterWarning => "FILTER_WARNING",
            Event::ShortCircuit => "FILTER_SHORT_CIRCUIT",
            Event::Progress => "FILTER_PROGRESS",
            Event::Canceled => "FILTER_CANCELED",
            Event::CountComplete => "ROW_COUNT_COMPLETE",
        }
    }

    /// Problems log at WARN, progress at TRACE, the rest at INFO
    pub fn level(&self) -> log::Level {
        match self {
            Event::FilterRejected | Event::FilterWarning | Event::Canceled => log::Level::Warn,
            Event::Progress => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
