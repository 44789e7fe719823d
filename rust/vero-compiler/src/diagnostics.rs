//! The `Diagnostic` type (spec §3.4) plus ANSI terminal rendering and the
//! editor-marker adapter (spec §4.5).

use crate::compiler::error_codes::{self, Flakiness as CatalogFlakiness, Severity as CatalogSeverity};
use crate::compiler::lexer::LexError;
use crate::compiler::parser::ParseError;
use crate::compiler::validator::ValidateError;
use serde::{Deserialize, Serialize};
use vero_core::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Lexer,
    Parser,
    Validation,
    Locator,
    Timeout,
    Navigation,
    Assertion,
    Browser,
    Network,
    Interaction,
    Script,
    Frame,
    Resource,
    Artifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Editor marker severity numbering (spec §4.5).
    pub fn marker_value(self) -> u8 {
        match self {
            Severity::Hint => 1,
            Severity::Info => 2,
            Severity::Warning => 4,
            Severity::Error => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flakiness {
    Permanent,
    Flaky,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionAction {
    Fix,
    Retry,
    Investigate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub action: SuggestionAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticContext {
    pub vero_statement: Option<String>,
    pub selector: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: Option<usize>,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Location {
            line: span.line,
            column: Some(span.col),
            end_line: None,
            end_column: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub category: DiagnosticCategory,
    pub severity: Severity,
    pub location: Location,
    pub title: String,
    pub what_went_wrong: String,
    pub how_to_fix: String,
    pub technical_message: Option<String>,
    pub flakiness: Flakiness,
    pub retryable: bool,
    pub suggested_retries: u32,
    pub suggestions: Vec<Suggestion>,
    pub context: DiagnosticContext,
}

impl Diagnostic {
    fn from_catalog(
        code: &'static str,
        span: Span,
        what_went_wrong: String,
        suggestions: Vec<Suggestion>,
        context: DiagnosticContext,
    ) -> Self {
        let info = error_codes::lookup(code).expect("unregistered VERO code");
        Diagnostic {
            code: code.to_string(),
            category: convert_category(info.category),
            severity: convert_severity(info.severity),
            location: span.into(),
            title: info.title.to_string(),
            what_went_wrong,
            how_to_fix: info.how_to_fix.to_string(),
            technical_message: None,
            flakiness: convert_flakiness(info.flakiness),
            retryable: info.retryable,
            suggested_retries: info.suggested_retries,
            suggestions,
            context,
        }
    }

    pub fn from_lex_error(e: &LexError) -> Self {
        let code = error_codes::lex_error_code(e);
        Diagnostic::from_catalog(code, e.span(), e.to_string(), Vec::new(), DiagnosticContext::default())
    }

    pub fn from_parse_error(e: &ParseError) -> Self {
        let code = error_codes::parse_error_code(e);
        Diagnostic::from_catalog(code, e.span(), e.to_string(), Vec::new(), DiagnosticContext::default())
    }

    pub fn from_validate_error(e: &ValidateError) -> Self {
        let code = error_codes::validate_error_code(e);
        let suggestions = extract_suggestions(e);
        Diagnostic::from_catalog(code, e.span(), e.to_string(), suggestions, DiagnosticContext::default())
    }

    /// Internal-error diagnostic for a caught panic (spec §7, `VERO-000`).
    pub fn internal_error(technical_message: String) -> Self {
        let mut d = Diagnostic::from_catalog(
            "VERO-000",
            Span::dummy(),
            "The compiler encountered an unexpected internal state.".to_string(),
            Vec::new(),
            DiagnosticContext::default(),
        );
        d.technical_message = Some(technical_message);
        d
    }

    /// Editor marker shape (spec §4.5): `{severity, startLine, startCol,
    /// endLine, endCol, message, code, source="vero"}`.
    pub fn to_editor_marker(&self) -> EditorMarker {
        let mut message = format!("{}\n\n{}\n\n{}", self.title, self.what_went_wrong, self.how_to_fix);
        for s in &self.suggestions {
            message.push_str(&format!("\n- {}", s.text));
        }
        EditorMarker {
            severity: self.severity.marker_value(),
            start_line: self.location.line,
            start_col: self.location.column.unwrap_or(1),
            end_line: self.location.end_line.unwrap_or(self.location.line),
            end_col: self
                .location
                .end_column
                .unwrap_or(self.location.column.unwrap_or(1) + 1),
            message,
            code: self.code.clone(),
            source: "vero",
        }
    }

    /// ANSI-colored rendering, styled after the host toolchain's own
    /// terminal diagnostics.
    pub fn render_ansi(&self, source_lines: &[&str]) -> String {
        let mut out = String::new();
        let label = match self.severity {
            Severity::Error => red(&bold(&format!("error[{}]", self.code))),
            Severity::Warning => yellow(&bold(&format!("warning[{}]", self.code))),
            Severity::Info => cyan(&bold(&format!("info[{}]", self.code))),
            Severity::Hint => gray(&bold(&format!("hint[{}]", self.code))),
        };
        out.push_str(&format!("{}: {}\n", label, bold(&self.title)));
        out.push_str(&format!(
            "  {} line {}\n",
            gray("-->"),
            self.location.line
        ));

        if let Some(line_text) = source_lines.get(self.location.line.saturating_sub(1)) {
            let line_no = self.location.line.to_string();
            out.push_str(&format!("  {} │ {}\n", gray(&line_no), line_text));
            let col = self.location.column.unwrap_or(1);
            let underline = format!("{}{}", " ".repeat(col.saturating_sub(1)), "^");
            out.push_str(&format!(
                "  {} │ {}\n",
                gray(&" ".repeat(line_no.len())),
                red(&underline)
            ));
        }

        out.push('\n');
        out.push_str(&format!("{}\n", self.what_went_wrong));
        out.push_str(&format!("{} {}\n", cyan("help:"), self.how_to_fix));
        for s in &self.suggestions {
            out.push_str(&format!("  - {}\n", s.text));
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct EditorMarker {
    pub severity: u8,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    pub message: String,
    pub code: String,
    pub source: &'static str,
}

fn extract_suggestions(e: &ValidateError) -> Vec<Suggestion> {
    let texts: Vec<String> = match e {
        ValidateError::UnresolvedUse { suggestions, .. } => suggestions.clone(),
        ValidateError::UnknownField { suggestions, .. } => suggestions.clone(),
        ValidateError::UnknownActionContainer { suggestions, .. } => suggestions.clone(),
        ValidateError::UnknownAction { suggestions, .. } => suggestions.clone(),
        _ => Vec::new(),
    };
    texts
        .into_iter()
        .map(|text| Suggestion {
            text: format!("did you mean `{}`?", text),
            action: SuggestionAction::Fix,
        })
        .collect()
}

fn convert_category(c: error_codes::Category) -> DiagnosticCategory {
    use error_codes::Category as C;
    match c {
        C::Lexer => DiagnosticCategory::Lexer,
        C::Parser => DiagnosticCategory::Parser,
        C::Validation => DiagnosticCategory::Validation,
        C::Locator => DiagnosticCategory::Locator,
        C::Timeout => DiagnosticCategory::Timeout,
        C::Navigation => DiagnosticCategory::Navigation,
        C::Assertion => DiagnosticCategory::Assertion,
        C::Browser => DiagnosticCategory::Browser,
        C::Network => DiagnosticCategory::Network,
        C::Interaction => DiagnosticCategory::Interaction,
        C::Script => DiagnosticCategory::Script,
        C::Frame => DiagnosticCategory::Frame,
        C::Resource => DiagnosticCategory::Resource,
        C::Artifact => DiagnosticCategory::Artifact,
    }
}

fn convert_severity(s: CatalogSeverity) -> Severity {
    match s {
        CatalogSeverity::Error => Severity::Error,
        CatalogSeverity::Warning => Severity::Warning,
        CatalogSeverity::Info => Severity::Info,
        CatalogSeverity::Hint => Severity::Hint,
    }
}

fn convert_flakiness(f: CatalogFlakiness) -> Flakiness {
    match f {
        CatalogFlakiness::Permanent => Flakiness::Permanent,
        CatalogFlakiness::Flaky => Flakiness::Flaky,
        CatalogFlakiness::Unknown => Flakiness::Unknown,
    }
}

fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}

fn yellow(s: &str) -> String {
    format!("\x1b[33m{}\x1b[0m", s)
}

fn cyan(s: &str) -> String {
    format!("\x1b[36m{}\x1b[0m", s)
}

fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

fn gray(s: &str) -> String {
    format!("\x1b[90m{}\x1b[0m", s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_marker_severity_mapping() {
        assert_eq!(Severity::Hint.marker_value(), 1);
        assert_eq!(Severity::Info.marker_value(), 2);
        assert_eq!(Severity::Warning.marker_value(), 4);
        assert_eq!(Severity::Error.marker_value(), 8);
    }

    #[test]
    fn lex_error_diagnostic_is_non_retryable_permanent() {
        let e = LexError::MalformedNumber { line: 1, col: 1 };
        let d = Diagnostic::from_lex_error(&e);
        assert!(!d.retryable);
        assert!(matches!(d.flakiness, Flakiness::Permanent));
        assert_eq!(d.code, "VERO-102");
    }

    #[test]
    fn internal_error_carries_technical_message() {
        let d = Diagnostic::internal_error("panicked at foo.rs:1".to_string());
        assert_eq!(d.code, "VERO-000");
        assert_eq!(d.technical_message.as_deref(), Some("panicked at foo.rs:1"));
    }
}
