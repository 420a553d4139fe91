//! Lint findings

use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Surfaced to the importing user; does not block the upgrade.
    Warning,
    /// Must be fixed before the protocol's data can be exported.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// One problem found by a logic validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    /// Severity of the problem.
    pub severity: Severity,
    /// Document path of the offending node.
    pub path: String,
    /// Human-readable description, quoting the offending value verbatim.
    pub message: String,
}

impl LintFinding {
    /// An error-severity finding.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// A warning-severity finding.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.severity, self.path, self.message)
    }
}
