//! Diagnostic Infrastructure
//!
//! Diagnostics are how a backend tells the operator that a module could not
//! be translated. The backends themselves never recover from a defect; the
//! driver turns each failed module into one `Diagnostic` and keeps going with
//! the remaining modules.
//!
//! # Components
//!
//! - `Diagnostic` - A single diagnostic message with location and severity
//! - `DiagnosticBag` - A collection of diagnostics for one compilation run
//! - `DiagnosticSeverity` - Error, Warning, or Info

use crate::pos::Pos;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// An IR construct the backend does not implement.
pub const UNSUPPORTED_IR_NODE: u32 = 9001;
/// An internal invariant of the backend was violated.
pub const INTERNAL_INVARIANT: u32 = 9002;
/// The IR input could not be decoded.
pub const MALFORMED_INPUT: u32 = 9003;
/// An output file could not be written.
pub const OUTPUT_FAILURE: u32 = 9004;

// =============================================================================
// Diagnostic Severity
// =============================================================================

/// The severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error (highest severity)
    Error = 1,
    /// A warning
    Warning = 2,
    /// Informational message
    Info = 3,
}

impl DiagnosticSeverity {
    /// Get the severity name for display.
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticSeverity::Error)
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A diagnostic message with location, severity, and code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Where the problem was found
    pub pos: Pos,
    /// The diagnostic message
    pub message: String,
    /// The severity level
    pub severity: DiagnosticSeverity,
    /// The diagnostic code (e.g., TMPL9001)
    pub code: u32,
}

impl Diagnostic {
    pub fn new(
        pos: Pos,
        message: impl Into<String>,
        severity: DiagnosticSeverity,
        code: u32,
    ) -> Self {
        Diagnostic {
            pos,
            message: message.into(),
            severity,
            code,
        }
    }

    /// Create an error diagnostic.
    pub fn error(pos: Pos, message: impl Into<String>, code: u32) -> Self {
        Self::new(pos, message, DiagnosticSeverity::Error, code)
    }

    /// Create a warning diagnostic.
    pub fn warning(pos: Pos, message: impl Into<String>, code: u32) -> Self {
        Self::new(pos, message, DiagnosticSeverity::Warning, code)
    }

    /// One-line rendering without color: `file:left+len - error TMPL9001: message`.
    pub fn format_simple(&self) -> String {
        format!(
            "{} - {} TMPL{}: {}",
            self.pos, self.severity, self.code, self.message
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_simple())
    }
}

// =============================================================================
// Diagnostic Bag
// =============================================================================

/// A collection of diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Error => self.error_count += 1,
            DiagnosticSeverity::Warning => self.warning_count += 1,
            DiagnosticSeverity::Info => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, pos: Pos, message: impl Into<String>, code: u32) {
        self.add(Diagnostic::error(pos, message, code));
    }

    pub fn warning(&mut self, pos: Pos, message: impl Into<String>, code: u32) {
        self.add(Diagnostic::warning(pos, message, code));
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        for diagnostic in other.diagnostics {
            self.add(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics ordered by file, then offset, then severity.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut out: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        out.sort_by(|a, b| {
            (a.pos.file.as_str(), a.pos.left, a.severity).cmp(&(
                b.pos.file.as_str(),
                b.pos.left,
                b.severity,
            ))
        });
        out
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_counts() {
        let mut bag = DiagnosticBag::new();
        bag.error(Pos::new("m.temper", 1, 2), "boom", UNSUPPORTED_IR_NODE);
        bag.warning(Pos::new("m.temper", 0, 1), "meh", INTERNAL_INVARIANT);
        bag.add(Diagnostic::new(
            Pos::synthetic(),
            "fyi",
            DiagnosticSeverity::Info,
            0,
        ));
        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.warning_count(), 1);
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn test_sorted_by_position() {
        let mut bag = DiagnosticBag::new();
        bag.error(Pos::new("b", 0, 1), "second file", 1);
        bag.error(Pos::new("a", 9, 10), "late", 1);
        bag.error(Pos::new("a", 3, 4), "early", 1);
        let messages: Vec<&str> = bag.sorted().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["early", "late", "second file"]);
    }

    #[test]
    fn test_format_simple() {
        let diag = Diagnostic::error(
            Pos::new("m.temper", 10, 14),
            "unsupported IR node: ComputedJump",
            UNSUPPORTED_IR_NODE,
        );
        assert_eq!(
            diag.format_simple(),
            "m.temper:10+4 - error TMPL9001: unsupported IR node: ComputedJump"
        );
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&DiagnosticSeverity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
