//! Semantic validator (spec §4.3). Two passes: collect the symbol table,
//! then resolve every reference against it. Never aborts — validation
//! errors are surfaced alongside the AST and transpilation still runs.

use crate::compiler::ast::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use vero_core::{suggest_similar, Span};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidateError {
    #[error("duplicate definition of '{name}'")]
    DuplicateDefinition { name: String, span: Span },
    #[error("unresolved USE '{name}'")]
    UnresolvedUse { name: String, suggestions: Vec<String>, span: Span },
    #[error("unknown field '{field}' on page '{page}'")]
    UnknownField {
        page: String,
        field: String,
        suggestions: Vec<String>,
        span: Span,
    },
    #[error("page '{page}' not in scope (missing USE)")]
    PageNotInScope { page: String, span: Span },
    #[error("unknown action container '{container}'")]
    UnknownActionContainer { container: String, suggestions: Vec<String>, span: Span },
    #[error("unknown action '{action}' on '{container}'")]
    UnknownAction {
        container: String,
        action: String,
        suggestions: Vec<String>,
        span: Span,
    },
    #[error("'{container}.{action}' expects {expected} argument(s), got {found}")]
    ActionArityMismatch {
        container: String,
        action: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("tab operation not allowed in this context")]
    TabOperationForbidden { span: Span },
    #[error("PAGEACTIONS '{name}' FOR undefined page '{for_page}'")]
    PageActionsTargetUndefined { name: String, for_page: String, span: Span },
    #[error("naming convention: '{name}' should be {expected_form}")]
    NamingConvention {
        name: String,
        expected_form: &'static str,
        span: Span,
    },
    #[error("collection '{name}' not in scope")]
    UnknownCollection { name: String, span: Span },
}

impl ValidateError {
    pub fn span(&self) -> Span {
        match self {
            ValidateError::DuplicateDefinition { span, .. }
            | ValidateError::UnresolvedUse { span, .. }
            | ValidateError::UnknownField { span, .. }
            | ValidateError::PageNotInScope { span, .. }
            | ValidateError::UnknownActionContainer { span, .. }
            | ValidateError::UnknownAction { span, .. }
            | ValidateError::ActionArityMismatch { span, .. }
            | ValidateError::TabOperationForbidden { span }
            | ValidateError::PageActionsTargetUndefined { span, .. }
            | ValidateError::NamingConvention { span, .. }
            | ValidateError::UnknownCollection { span, .. } => *span,
        }
    }

    /// Naming-convention violations are non-fatal (spec §4.3).
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidateError::NamingConvention { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub pages: HashMap<String, Page>,
    pub page_actions: HashMap<String, PageActions>,
    pub page_fields: HashMap<String, HashSet<String>>,
    pub page_actions_actions: HashMap<String, HashSet<String>>,
}

pub fn validate(program: &Program) -> (SymbolTable, Vec<ValidateError>) {
    let mut errors = Vec::new();
    let symbols = collect(program, &mut errors);
    for feature in &program.features {
        resolve_feature(feature, &symbols, &mut errors);
    }
    for pa in &program.page_actions {
        if !symbols.pages.contains_key(&pa.for_page) {
            errors.push(ValidateError::PageActionsTargetUndefined {
                name: pa.name.clone(),
                for_page: pa.for_page.clone(),
                span: pa.span,
            });
        }
        // Tab operations are forbidden in any PAGEACTIONS action (spec VERO-320).
        for action in &pa.actions {
            check_no_tab_ops(&action.statements, &mut errors);
        }
    }
    (symbols, errors)
}

fn collect(program: &Program, errors: &mut Vec<ValidateError>) -> SymbolTable {
    let mut symbols = SymbolTable::default();

    for page in &program.pages {
        if symbols.pages.contains_key(&page.name) {
            errors.push(ValidateError::DuplicateDefinition {
                name: page.name.clone(),
                span: page.span,
            });
            continue;
        }
        if !is_pascal_case(&page.name) {
            errors.push(ValidateError::NamingConvention {
                name: page.name.clone(),
                expected_form: "PascalCase",
                span: page.span,
            });
        }

        let mut fields = HashSet::new();
        for field in &page.fields {
            if !fields.insert(field.name.clone()) {
                errors.push(ValidateError::DuplicateDefinition {
                    name: field.name.clone(),
                    span: field.span,
                });
            }
            if !is_camel_case(&field.name) {
                errors.push(ValidateError::NamingConvention {
                    name: field.name.clone(),
                    expected_form: "camelCase",
                    span: field.span,
                });
            }
        }
        for action in &page.actions {
            fields.insert(action.name.clone());
            if !is_camel_case(&action.name) {
                errors.push(ValidateError::NamingConvention {
                    name: action.name.clone(),
                    expected_form: "camelCase",
                    span: action.span,
                });
            }
        }
        symbols.page_fields.insert(page.name.clone(), fields);
        symbols.pages.insert(page.name.clone(), page.clone());
    }

    for pa in &program.page_actions {
        if symbols.page_actions.contains_key(&pa.name) {
            errors.push(ValidateError::DuplicateDefinition {
                name: pa.name.clone(),
                span: pa.span,
            });
            continue;
        }
        let actions: HashSet<String> = pa.actions.iter().map(|a| a.name.clone()).collect();
        symbols.page_actions_actions.insert(pa.name.clone(), actions);
        symbols.page_actions.insert(pa.name.clone(), pa.clone());
    }

    symbols
}

fn resolve_feature(feature: &Feature, symbols: &SymbolTable, errors: &mut Vec<ValidateError>) {
    let mut in_scope: HashSet<String> = HashSet::new();
    for use_ref in &feature.uses {
        let known = symbols.pages.contains_key(&use_ref.name)
            || symbols.page_actions.contains_key(&use_ref.name);
        if known {
            in_scope.insert(use_ref.name.clone());
        } else {
            let mut candidates: Vec<&str> = symbols.pages.keys().map(String::as_str).collect();
            candidates.extend(symbols.page_actions.keys().map(String::as_str));
            errors.push(ValidateError::UnresolvedUse {
                name: use_ref.name.clone(),
                suggestions: suggest_similar(&use_ref.name, candidates),
                span: use_ref.span,
            });
        }
    }

    for hook in &feature.hooks {
        let forbidden = matches!(hook.hook_type, HookType::BeforeAll | HookType::AfterAll);
        if forbidden {
            check_no_tab_ops(&hook.statements, errors);
        }
        let mut scope: HashSet<String> = HashSet::new();
        resolve_statements(&hook.statements, &in_scope, symbols, &mut scope, errors);
    }

    for scenario in &feature.scenarios {
        let mut scope: HashSet<String> = HashSet::new();
        resolve_statements(&scenario.statements, &in_scope, symbols, &mut scope, errors);
    }
}

fn check_no_tab_ops(statements: &[Stmt], errors: &mut Vec<ValidateError>) {
    for stmt in statements {
        match stmt {
            Stmt::SwitchToNewTab(_, span)
            | Stmt::SwitchToTab(_, span)
            | Stmt::OpenInNewTab(_, span)
            | Stmt::CloseTab(span) => {
                errors.push(ValidateError::TabOperationForbidden { span: *span });
            }
            Stmt::If(s) => {
                check_no_tab_ops(&s.then_body, errors);
                if let Some(else_body) = &s.else_body {
                    check_no_tab_ops(else_body, errors);
                }
            }
            Stmt::Repeat(s) => check_no_tab_ops(&s.body, errors),
            Stmt::ForEach(s) => check_no_tab_ops(&s.statements, errors),
            Stmt::TryCatch(s) => {
                check_no_tab_ops(&s.try_body, errors);
                check_no_tab_ops(&s.catch_body, errors);
            }
            _ => {}
        }
    }
}

fn resolve_statements(
    statements: &[Stmt],
    in_scope: &HashSet<String>,
    symbols: &SymbolTable,
    scope: &mut HashSet<String>,
    errors: &mut Vec<ValidateError>,
) {
    for stmt in statements {
        resolve_statement(stmt, in_scope, symbols, scope, errors);
    }
}

fn resolve_statement(
    stmt: &Stmt,
    in_scope: &HashSet<String>,
    symbols: &SymbolTable,
    scope: &mut HashSet<String>,
    errors: &mut Vec<ValidateError>,
) {
    match stmt {
        Stmt::Click(t, _)
        | Stmt::Check(t, _)
        | Stmt::Uncheck(t, _)
        | Stmt::Hover(t, _)
        | Stmt::Scroll(t, _)
        | Stmt::Clear(t, _) => resolve_target(t, in_scope, symbols, errors),
        Stmt::Fill(t, _, _) | Stmt::Select(t, _, _) | Stmt::Upload(t, _, _) => {
            resolve_target(t, in_scope, symbols, errors)
        }
        Stmt::Drag(a, b, _) => {
            resolve_target(a, in_scope, symbols, errors);
            resolve_target(b, in_scope, symbols, errors);
        }
        Stmt::Perform(action_ref, args, span) => {
            resolve_action_ref(action_ref, args.len(), *span, symbols, errors)
        }
        Stmt::Verify(v) => resolve_target(&v.target, in_scope, symbols, errors),
        Stmt::If(s) => {
            resolve_statements(&s.then_body, in_scope, symbols, scope, errors);
            if let Some(else_body) = &s.else_body {
                resolve_statements(else_body, in_scope, symbols, scope, errors);
            }
        }
        Stmt::Repeat(s) => resolve_statements(&s.body, in_scope, symbols, scope, errors),
        Stmt::ForEach(s) => {
            if !scope.contains(&s.collection_variable) {
                errors.push(ValidateError::UnknownCollection {
                    name: s.collection_variable.clone(),
                    span: s.span,
                });
            }
            scope.insert(s.item_variable.clone());
            resolve_statements(&s.statements, in_scope, symbols, scope, errors);
        }
        Stmt::Load(l) => {
            scope.insert(l.variable_name.clone());
        }
        Stmt::DataQuery(q) => {
            scope.insert(q.variable_name.clone());
        }
        Stmt::TryCatch(s) => {
            resolve_statements(&s.try_body, in_scope, symbols, scope, errors);
            resolve_statements(&s.catch_body, in_scope, symbols, scope, errors);
        }
        _ => {}
    }
}

fn resolve_target(target: &Target, in_scope: &HashSet<String>, symbols: &SymbolTable, errors: &mut Vec<ValidateError>) {
    if !in_scope.contains(&target.page) {
        errors.push(ValidateError::PageNotInScope {
            page: target.page.clone(),
            span: target.span,
        });
        return;
    }
    let Some(fields) = symbols.page_fields.get(&target.page) else {
        errors.push(ValidateError::PageNotInScope {
            page: target.page.clone(),
            span: target.span,
        });
        return;
    };
    if !fields.contains(&target.field) {
        let candidates: Vec<&str> = fields.iter().map(String::as_str).collect();
        let mut suggestions = suggest_similar(&target.field, candidates);
        suggestions.truncate(5);
        errors.push(ValidateError::UnknownField {
            page: target.page.clone(),
            field: target.field.clone(),
            suggestions,
            span: target.span,
        });
    }
}

fn resolve_action_ref(action_ref: &ActionRef, arg_count: usize, span: Span, symbols: &SymbolTable, errors: &mut Vec<ValidateError>) {
    if let Some(actions) = symbols.page_actions_actions.get(&action_ref.container) {
        if !actions.contains(&action_ref.action) {
            let candidates: Vec<&str> = actions.iter().map(String::as_str).collect();
            errors.push(ValidateError::UnknownAction {
                container: action_ref.container.clone(),
                action: action_ref.action.clone(),
                suggestions: suggest_similar(&action_ref.action, candidates),
                span,
            });
        } else if let Some(pa) = symbols.page_actions.get(&action_ref.container) {
            check_arity(pa.actions.iter(), action_ref, arg_count, span, errors);
        }
        return;
    }
    if let Some(fields) = symbols.page_fields.get(&action_ref.container) {
        if !fields.contains(&action_ref.action) {
            let candidates: Vec<&str> = fields.iter().map(String::as_str).collect();
            errors.push(ValidateError::UnknownAction {
                container: action_ref.container.clone(),
                action: action_ref.action.clone(),
                suggestions: suggest_similar(&action_ref.action, candidates),
                span,
            });
        } else if let Some(page) = symbols.pages.get(&action_ref.container) {
            check_arity(page.actions.iter(), action_ref, arg_count, span, errors);
        }
        return;
    }
    let mut candidates: Vec<&str> = symbols.pages.keys().map(String::as_str).collect();
    candidates.extend(symbols.page_actions.keys().map(String::as_str));
    errors.push(ValidateError::UnknownActionContainer {
        container: action_ref.container.clone(),
        suggestions: suggest_similar(&action_ref.container, candidates),
        span,
    });
}

fn check_arity<'a>(
    declared: impl Iterator<Item = &'a Action>,
    action_ref: &ActionRef,
    arg_count: usize,
    span: Span,
    errors: &mut Vec<ValidateError>,
) {
    let Some(action) = declared.find(|a| a.name == action_ref.action) else {
        return;
    };
    if action.parameters.len() != arg_count {
        errors.push(ValidateError::ActionArityMismatch {
            container: action_ref.container.clone(),
            action: action_ref.action.clone(),
            expected: action.parameters.len(),
            found: arg_count,
            span,
        });
    }
}

fn is_pascal_case(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase()) && !s.contains('_')
}

fn is_camel_case(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_lowercase()) && !s.contains('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::lex;
    use crate::compiler::parser::parse;

    fn validate_src(src: &str) -> (SymbolTable, Vec<ValidateError>) {
        let (tokens, _) = lex(src);
        let (program, parse_errors) = parse(tokens);
        assert!(parse_errors.is_empty(), "{:?}", parse_errors);
        validate(&program)
    }

    #[test]
    fn accepts_valid_target() {
        let (_, errors) = validate_src(
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
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn rejects_missing_use() {
        let (_, errors) = validate_src(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            FEATURE Login {
                SCENARIO S {
                    CLICK LoginPage.submitButton
                }
            }
            "#,
        );
        assert!(errors.iter().any(|e| matches!(e, ValidateError::PageNotInScope { .. })));
    }

    #[test]
    fn rejects_unknown_field_with_suggestion() {
        let (_, errors) = validate_src(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            FEATURE Login {
                USE LoginPage
                SCENARIO S {
                    CLICK LoginPage.submtButton
                }
            }
            "#,
        );
        let err = errors
            .iter()
            .find(|e| matches!(e, ValidateError::UnknownField { .. }))
            .expect("expected UnknownField error");
        if let ValidateError::UnknownField { suggestions, .. } = err {
            assert!(suggestions.iter().any(|s| s == "submitButton"));
        }
    }

    #[test]
    fn rejects_action_call_with_wrong_arity() {
        let (_, errors) = validate_src(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            PAGEACTIONS LoginActions FOR LoginPage {
                login(username, password) {
                    CLICK LoginPage.submitButton
                }
            }
            FEATURE Login {
                USE LoginPage
                USE LoginActions
                SCENARIO S {
                    PERFORM LoginActions.login WITH "a"
                }
            }
            "#,
        );
        let err = errors
            .iter()
            .find(|e| matches!(e, ValidateError::ActionArityMismatch { .. }))
            .expect("expected ActionArityMismatch error");
        if let ValidateError::ActionArityMismatch { expected, found, .. } = err {
            assert_eq!(*expected, 2);
            assert_eq!(*found, 1);
        }
    }

    #[test]
    fn accepts_action_call_with_matching_arity() {
        let (_, errors) = validate_src(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            PAGEACTIONS LoginActions FOR LoginPage {
                login(username, password) {
                    CLICK LoginPage.submitButton
                }
            }
            FEATURE Login {
                USE LoginPage
                USE LoginActions
                SCENARIO S {
                    PERFORM LoginActions.login WITH "a", "b"
                }
            }
            "#,
        );
        assert!(
            !errors.iter().any(|e| matches!(e, ValidateError::ActionArityMismatch { .. })),
            "{:?}",
            errors
        );
    }

    #[test]
    fn rejects_tab_op_in_before_all() {
        let (_, errors) = validate_src(
            r#"
            FEATURE F {
                BEFORE ALL {
                    CLOSE TAB
                }
                SCENARIO S {
                    LOG "hi"
                }
            }
            "#,
        );
        assert!(errors.iter().any(|e| matches!(e, ValidateError::TabOperationForbidden { .. })));
    }

    #[test]
    fn page_actions_requires_defined_target_page() {
        let (tokens, _) = lex(
            r#"
            PAGEACTIONS LoginFlows FOR LoginPage {
                submit() {
                    LOG "x"
                }
            }
            "#,
        );
        let (program, parse_errors) = parse(tokens);
        assert!(parse_errors.is_empty());
        let (_, errors) = validate(&program);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidateError::PageActionsTargetUndefined { .. })));
    }
}
