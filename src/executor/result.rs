//! Result types for filter runs

use serde::Serialize;
use uuid::Uuid;

use crate::filter::ShortCircuit;

/// Outcome of one completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSummary {
    /// Identifies the run in log lines
    pub run_id: Uuid,
    /// Rows pulled from the source
    pub rows_read: u64,
    /// Rows written to the matched (or only) output
    pub rows_matched: u64,
    /// Rows written to the unmatched output, or dropped in single-output runs
    pub rows_unmatched: u64,
    /// How the run stopped consulting its predicate, if it did
    pub short_circuit: Option<ShortCircuit>,
    /// Wall time of the run in milliseconds
    pub elapsed_ms: u64,
}

impl ExecutionSummary {
    /// Returns true if every row read was written to an output
    pub fn is_conserved(&self) -> bool {
        self.rows_matched + self.rows_unmatched == self.rows_read
    }
}

/// Row counts accumulated while a run is in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunCounts {
    pub read: u64,
    pub matched: u64,
    pub unmatched: u64,
    pub short_circuit: Option<ShortCircuit>,
}

impl RunCounts {
    pub(crate) fn into_summary(self, run_id: Uuid, elapsed_ms: u64) -> ExecutionSummary {
        ExecutionSummary {
            run_id,
            rows_read: self.read,
            rows_matched: self.matched,
            rows_unmatched: self.unmatched,
            short_circuit: self.short_circuit,
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_short_circuit() {
        let counts = RunCounts {
            read: 4,
            matched: 3,
            unmatched: 1,
            short_circuit: Some(ShortCircuit::ExcludeRest),
        };
        let summary = counts.into_summary(Uuid::nil(), 2);
        assert!(summary.is_conserved());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["short_circuit"], "exclude_rest");
        assert_eq!(json["rows_read"], 4);
    }
}
