//! Per-run diagnostics report.

use std::fmt;

use serde::Serialize;

use crate::error::OperationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The operation was left out of the output
    Fatal,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub operation: String,
    pub severity: Severity,
    pub error: OperationError,
}

/// Everything that went wrong in a run, in descriptor order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Operations that made it into the output
    pub generated: usize,
}

impl GenerationReport {
    pub fn record(&mut self, operation: &str, error: OperationError) {
        let severity = if error.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Warning
        };
        self.diagnostics.push(Diagnostic {
            operation: operation.to_string(),
            severity,
            error,
        });
    }

    pub fn fatal(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Fatal)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} operation(s) generated, {} fatal, {} warning(s)",
            self.generated,
            self.fatal().count(),
            self.warnings().count()
        )?;
        for d in &self.diagnostics {
            let label = match d.severity {
                Severity::Fatal => "error",
                Severity::Warning => "warning",
            };
            writeln!(f, "  {} [{}]: {}", label, d.operation, d.error)?;
        }
        Ok(())
    }
}
