use colored::Colorize;
use tmpl_common::{Diagnostic, DiagnosticBag, DiagnosticSeverity};

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// Every diagnostic in position order, one per line.
    pub fn render(&self, diagnostics: &DiagnosticBag) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.sorted().into_iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = self.format_location(diagnostic);
        output.push_str(" - ");
        output.push_str(&self.format_severity(diagnostic.severity));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic.code));
        output.push_str(": ");
        output.push_str(&diagnostic.message);
        output
    }

    pub fn format_summary(&self, diagnostics: &DiagnosticBag) -> String {
        let errors = diagnostics.error_count();
        let plural = if errors == 1 { "" } else { "s" };
        let text = format!("Found {errors} error{plural}.");
        if self.color && errors > 0 {
            text.red().bold().to_string()
        } else {
            text
        }
    }

    fn format_location(&self, diagnostic: &Diagnostic) -> String {
        let location = if diagnostic.pos.file.is_empty() {
            "<unknown>".to_string()
        } else {
            diagnostic.pos.to_string()
        };
        if self.color {
            location.cyan().to_string()
        } else {
            location
        }
    }

    fn format_severity(&self, severity: DiagnosticSeverity) -> String {
        let label = severity.name();
        if !self.color {
            return label.to_string();
        }
        match severity {
            DiagnosticSeverity::Error => label.red().bold().to_string(),
            DiagnosticSeverity::Warning => label.yellow().bold().to_string(),
            DiagnosticSeverity::Info => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("TMPL{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmpl_common::Pos;
    use tmpl_common::diagnostics::UNSUPPORTED_IR_NODE;

    #[test]
    fn test_plain_rendering() {
        let mut bag = DiagnosticBag::new();
        bag.error(Pos::new("b.temper", 4, 6), "second", UNSUPPORTED_IR_NODE);
        bag.error(Pos::new("a.temper", 1, 2), "first", UNSUPPORTED_IR_NODE);
        let reporter = Reporter::new(false);
        assert_eq!(
            reporter.render(&bag),
            "a.temper:1+1 - error TMPL9001: first\nb.temper:4+2 - error TMPL9001: second"
        );
        assert_eq!(reporter.format_summary(&bag), "Found 2 errors.");
    }

    #[test]
    fn test_unknown_file() {
        let diag = Diagnostic::error(Pos::new("", 0, 0), "lost", 9002);
        assert_eq!(
            Reporter::new(false).format_diagnostic(&diag),
            "<unknown> - error TMPL9002: lost"
        );
    }
}
