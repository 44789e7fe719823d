//! Stable `VERO-NNN` diagnostic code catalog (spec §4.5, §7).
//!
//! Code ranges:
//!   100–199  lexer
//!   200–299  parser
//!   300–399  validator
//!   400–499  locator
//!   500–599  assertion
//!   600–699  navigation
//!   700–799  interaction
//!   800–899  browser
//!   900–999  network

use crate::compiler::lexer::LexError;
use crate::compiler::parser::ParseError;
use crate::compiler::validator::ValidateError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flakiness {
    Permanent,
    Flaky,
    Unknown,
}

/// One catalog row: every field the spec's diagnostic schema needs except
/// the call-site-specific location, title interpolation, and suggestions.
#[derive(Debug, Clone, Copy)]
pub struct CodeInfo {
    pub code: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub title: &'static str,
    pub how_to_fix: &'static str,
    pub flakiness: Flakiness,
    pub retryable: bool,
    pub suggested_retries: u32,
}

macro_rules! code_row {
    ($code:literal, $category:ident, $severity:ident, $title:literal, $how_to_fix:literal, $flakiness:ident, $retryable:literal, $retries:literal) => {
        CodeInfo {
            code: $code,
            category: Category::$category,
            severity: Severity::$severity,
            title: $title,
            how_to_fix: $how_to_fix,
            flakiness: Flakiness::$flakiness,
            retryable: $retryable,
            suggested_retries: $retries,
        }
    };
}

/// Every VERO-NNN code this compiler can emit. Compile-time categories
/// (lexer/parser/validation) are always non-retryable, permanent — they
/// cannot be flaky by construction.
pub const CATALOG: &[CodeInfo] = &[
    code_row!("VERO-101", Lexer, Error, "Unterminated string", "Add a closing quote.", Permanent, false, 0),
    code_row!("VERO-102", Lexer, Error, "Malformed number", "Use a plain decimal like 1 or 3.14.", Permanent, false, 0),
    code_row!("VERO-103", Lexer, Error, "Unterminated environment reference", "Add the closing `}}`.", Permanent, false, 0),
    code_row!("VERO-104", Lexer, Error, "Unexpected character", "Remove or replace the character.", Permanent, false, 0),

    code_row!("VERO-200", Parser, Error, "Unexpected token", "Check the expected token set at this position.", Permanent, false, 0),
    code_row!("VERO-210", Parser, Error, "Unrecognized tab operation", "Use one of SWITCH TO NEW TAB, SWITCH TO TAB n, OPEN \"url\" IN NEW TAB, CLOSE TAB.", Permanent, false, 0),

    code_row!("VERO-301", Validation, Error, "Unresolved USE", "Add `use <PageName>` or correct the spelling.", Permanent, false, 0),
    code_row!("VERO-302", Validation, Error, "Unknown field", "Check the field name against the page's FIELD declarations.", Permanent, false, 0),
    code_row!("VERO-303", Validation, Error, "Duplicate definition", "Rename one of the conflicting declarations.", Permanent, false, 0),
    code_row!("VERO-304", Validation, Error, "Page not in scope", "Add a `use <PageName>` declaration for this feature.", Permanent, false, 0),
    code_row!("VERO-305", Validation, Error, "Unknown action", "Check the action name against the container's declared actions.", Permanent, false, 0),
    code_row!("VERO-306", Validation, Error, "Action arity mismatch", "Pass the number of arguments the action declares.", Permanent, false, 0),
    code_row!("VERO-310", Validation, Warning, "Naming convention", "Rename to match the project's naming convention.", Permanent, false, 0),
    code_row!("VERO-320", Validation, Error, "Tab operation not allowed in this context", "Move the tab operation into a BEFORE_EACH/AFTER_EACH hook or a scenario.", Permanent, false, 0),
    code_row!("VERO-321", Validation, Error, "PAGEACTIONS target undefined", "Declare the PAGE named in FOR before this PAGEACTIONS block.", Permanent, false, 0),
    code_row!("VERO-322", Validation, Error, "Collection not in scope", "Bind the collection with LOAD or a DataQuery before FOR EACH.", Permanent, false, 0),

    code_row!("VERO-000", Validation, Error, "Internal compiler error", "Please report this as a bug.", Permanent, false, 0),
];

pub fn lookup(code: &str) -> Option<&'static CodeInfo> {
    CATALOG.iter().find(|c| c.code == code)
}

pub fn lex_error_code(e: &LexError) -> &'static str {
    match e {
        LexError::UnterminatedString { .. } => "VERO-101",
        LexError::MalformedNumber { .. } => "VERO-102",
        LexError::UnterminatedEnvRef { .. } => "VERO-103",
        LexError::UnexpectedChar { .. } => "VERO-104",
    }
}

pub fn parse_error_code(e: &ParseError) -> &'static str {
    match e {
        ParseError::UnexpectedToken { .. } => "VERO-200",
        ParseError::UnknownTabForm { .. } => "VERO-210",
    }
}

pub fn validate_error_code(e: &ValidateError) -> &'static str {
    match e {
        ValidateError::UnresolvedUse { .. } => "VERO-301",
        ValidateError::UnknownField { .. } => "VERO-302",
        ValidateError::DuplicateDefinition { .. } => "VERO-303",
        ValidateError::PageNotInScope { .. } => "VERO-304",
        ValidateError::UnknownActionContainer { .. } | ValidateError::UnknownAction { .. } => "VERO-305",
        ValidateError::ActionArityMismatch { .. } => "VERO-306",
        ValidateError::NamingConvention { .. } => "VERO-310",
        ValidateError::TabOperationForbidden { .. } => "VERO-320",
        ValidateError::PageActionsTargetUndefined { .. } => "VERO-321",
        ValidateError::UnknownCollection { .. } => "VERO-322",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_entry_has_required_fields() {
        for info in CATALOG {
            assert!(!info.title.is_empty());
            assert!(!info.how_to_fix.is_empty());
            if matches!(
                info.category,
                Category::Lexer | Category::Parser | Category::Validation
            ) {
                assert!(!info.retryable);
                assert!(matches!(info.flakiness, Flakiness::Permanent));
            }
        }
    }

    #[test]
    fn lookup_finds_known_code() {
        assert!(lookup("VERO-302").is_some());
        assert!(lookup("VERO-999").is_none());
    }
}
