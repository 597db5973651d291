//! Configuration diagnostics
//!
//! Every problem found while binding a filter is recorded with an explicit
//! severity. Warnings describe a local fallback and never abort a run;
//! errors reject the configuration.

use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// One configuration finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.as_str(), self.message)
    }
}

/// Returns true if any diagnostic rejects the configuration
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Joins the messages of all error diagnostics
pub(crate) fn error_summary(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(Diagnostic::message)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_not_errors() {
        let diags = vec![Diagnostic::warning("Error-like text in a warning")];
        assert!(!has_errors(&diags));
    }

    #[test]
    fn test_severity_decides_not_message_text() {
        let diags = vec![
            Diagnostic::warning("x"),
            Diagnostic::error("WARNING: this prefix does not matter"),
        ];
        assert!(has_errors(&diags));
        assert_eq!(error_summary(&diags), "WARNING: this prefix does not matter");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Diagnostic::error("Enter a valid pattern").to_string(),
            "ERROR: Enter a valid pattern"
        );
    }
}
