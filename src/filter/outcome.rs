//! Evaluation outcomes and the chain state they drive

use std::fmt;

use serde::Serialize;

/// Result of evaluating a predicate against one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep this row
    Match,
    /// Drop this row
    NoMatch,
    /// Keep this row and every following row without further evaluation
    TerminalInclude,
    /// Drop this row and every following row; the relevant data has ended
    TerminalExclude,
}

impl Outcome {
    /// Returns true for the two terminal outcomes
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::TerminalInclude | Outcome::TerminalExclude)
    }

    /// Returns true if the row the outcome was computed for is kept
    pub fn keeps_row(&self) -> bool {
        matches!(self, Outcome::Match | Outcome::TerminalInclude)
    }

    /// Returns the short circuit a terminal outcome triggers
    pub fn short_circuit(&self) -> Option<ShortCircuit> {
        match self {
            Outcome::TerminalInclude => Some(ShortCircuit::IncludeRest),
            Outcome::TerminalExclude => Some(ShortCircuit::ExcludeRest),
            _ => None,
        }
    }
}

/// How a run stopped consulting its predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortCircuit {
    IncludeRest,
    ExcludeRest,
}

impl ShortCircuit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortCircuit::IncludeRest => "include_rest",
            ShortCircuit::ExcludeRest => "exclude_rest",
        }
    }
}

impl fmt::Display for ShortCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the predicate is still consulted for incoming rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainState {
    Evaluating,
    IncludeRest,
    ExcludeRest,
}

impl ChainState {
    /// Applies a terminal outcome; other outcomes leave the state unchanged.
    /// Once terminal, the state never changes again.
    pub(crate) fn apply(self, outcome: Outcome) -> ChainState {
        match (self, outcome) {
            (ChainState::Evaluating, Outcome::TerminalInclude) => ChainState::IncludeRest,
            (ChainState::Evaluating, Outcome::TerminalExclude) => ChainState::ExcludeRest,
            (state, _) => state,
        }
    }
}
