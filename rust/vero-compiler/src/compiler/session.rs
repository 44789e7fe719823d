//! Per-compilation-unit state machine (spec §4.4): `Idle → Lexing → Parsing
//! → Validating → Transpiling → Done`. Each phase emits diagnostics into a
//! shared sink and never short-circuits on errors.

use crate::compiler::ast::Program;
use crate::compiler::lexer;
use crate::compiler::parser;
use crate::compiler::validator::{self, SymbolTable};
use crate::diagnostics::Diagnostic;
use crate::transpile::{self, TranspileOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Lexing,
    Parsing,
    Validating,
    Transpiling,
    Done,
}

pub struct CompileSession {
    pub phase: Phase,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct SessionResult {
    pub program: Program,
    pub symbols: SymbolTable,
    pub output: TranspileOutput,
    pub diagnostics: Vec<Diagnostic>,
    /// False iff any diagnostic at error severity was recorded.
    pub valid: bool,
}

impl Default for CompileSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            diagnostics: Vec::new(),
        }
    }

    pub fn run(mut self, source: &str) -> SessionResult {
        self.phase = Phase::Lexing;
        let (tokens, lex_errors) = lexer::lex(source);
        self.diagnostics
            .extend(lex_errors.iter().map(Diagnostic::from_lex_error));

        self.phase = Phase::Parsing;
        let (program, parse_errors) = parser::parse(tokens);
        self.diagnostics
            .extend(parse_errors.iter().map(Diagnostic::from_parse_error));

        self.phase = Phase::Validating;
        let (symbols, validate_errors) = validator::validate(&program);
        self.diagnostics
            .extend(validate_errors.iter().map(Diagnostic::from_validate_error));

        self.phase = Phase::Transpiling;
        let output = transpile::transpile(&program, &symbols);
        self.diagnostics.extend(output.diagnostics.clone());

        self.phase = Phase::Done;
        let valid = !self
            .diagnostics
            .iter()
            .any(|d| matches!(d.severity, crate::diagnostics::Severity::Error));

        SessionResult {
            program,
            symbols,
            output,
            diagnostics: self.diagnostics,
            valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_program_reaches_done_and_is_valid() {
        let result = CompileSession::new().run(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            FEATURE Login {
                USE LoginPage
                SCENARIO S {
                    CLICK LoginPage.submitButton
                }
            }
            "#,
        );
        assert!(result.valid, "{:?}", result.diagnostics);
        assert!(result.output.tests.contains_key("Login"));
    }

    #[test]
    fn undefined_field_still_produces_best_effort_output() {
        let result = CompileSession::new().run(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            FEATURE Login {
                USE LoginPage
                SCENARIO S {
                    CLICK LoginPage.doesNotExist
                }
            }
            "#,
        );
        assert!(!result.valid);
        // Transpilation still ran despite the validation error.
        assert!(result.output.tests.contains_key("Login"));
    }
}
