//! Diagnostics collected while compiling a package.
//!
//! Diagnostics, not errors, are the primary channel for problems in user
//! code. Every phase reports into a [`DiagnosticBag`] stamped with that
//! phase; the orchestrator merges the bags and stops at the first phase
//! boundary where an error was reported.

use std::fmt;

use crate::{ErrorCode, Phase, SourceLocation};

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single coded diagnostic message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Where the problem is, if it can be attributed to source.
    pub location: Option<SourceLocation>,
    /// The phase that reported the diagnostic.
    pub phase: Phase,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// A collection of diagnostics reported by one phase (or merged from several).
#[derive(Debug, Clone)]
pub struct DiagnosticBag {
    phase: Phase,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticBag {
    /// Creates an empty bag that stamps every diagnostic with `phase`.
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            diagnostics: Vec::new(),
            error_count: 0,
        }
    }

    /// The phase this bag reports for.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports a diagnostic with an explicit severity.
    pub fn report(
        &mut self,
        code: ErrorCode,
        severity: Severity,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        if severity == Severity::Error {
            self.error_count += 1;
        }
        self.diagnostics.push(Diagnostic {
            code,
            severity,
            message: message.into(),
            location,
            phase: self.phase,
        });
    }

    pub fn error(
        &mut self,
        code: ErrorCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        self.report(code, Severity::Error, location, message);
    }

    pub fn warning(
        &mut self,
        code: ErrorCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        self.report(code, Severity::Warning, location, message);
    }

    pub fn info(
        &mut self,
        code: ErrorCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        self.report(code, Severity::Info, location, message);
    }

    /// Moves every diagnostic of `other` into this bag, keeping their phase.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.error_count += other.error_count;
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns `true` if any error-severity diagnostic was reported.
    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Iterates over error-severity diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Diagnostics carrying the given code.
    pub fn with_code(&self, code: ErrorCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticBag {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl fmt::Display for DiagnosticBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
