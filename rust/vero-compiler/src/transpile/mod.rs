//! Transpiler: lowers a validated AST into generated test-runner source
//! (spec §4.4). Pure function of the AST (P6): never touches I/O, never
//! short-circuits on validation errors — it always emits its best-effort
//! output, and the session layer decides overall validity from diagnostics.

pub mod emit;
pub mod lower;
pub mod vdql;

use crate::compiler::ast::Program;
use crate::compiler::validator::SymbolTable;
use crate::diagnostics::Diagnostic;
use std::collections::BTreeMap;

/// `pages`/`tests` are keyed by declaration name and use a `BTreeMap` so
/// iteration order is both deterministic (P6) and directly queryable by
/// name, unlike the plain emission order of an unkeyed `Vec`.
#[derive(Debug, Clone, Default)]
pub struct TranspileOutput {
    pub pages: BTreeMap<String, String>,
    pub page_actions: BTreeMap<String, String>,
    pub tests: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn transpile(program: &Program, _symbols: &SymbolTable) -> TranspileOutput {
    let mut output = TranspileOutput::default();

    for page in &program.pages {
        output.pages.insert(page.name.clone(), emit::emit_page(page));
    }
    for page_actions in &program.page_actions {
        output
            .page_actions
            .insert(page_actions.name.clone(), emit::emit_page_actions(page_actions));
    }
    for feature in &program.features {
        output.tests.insert(feature.name.clone(), emit::emit_feature(feature));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{parser, validator};

    #[test]
    fn transpiles_minimal_program_to_page_and_test_units() {
        let (tokens, _) = crate::compiler::lexer::lex(
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
        let (program, _) = parser::parse(tokens);
        let (symbols, _) = validator::validate(&program);
        let output = transpile(&program, &symbols);
        assert!(output.pages.contains_key("LoginPage"));
        assert!(output.tests.contains_key("Login"));
        assert!(output.tests["Login"].contains("LoginPage.submitButton"));
    }
}
