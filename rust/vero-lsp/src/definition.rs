//! Go-to-definition provider (spec §6.5): resolves `Page`, `Page.field`,
//! `Page.action`, `$var`, and `use X`.

use crate::util::span_to_point_range;
use lsp_types::{Location, Uri};
use vero_compiler::compiler::ast::{Program, Stmt};

/// What the caller is asking to resolve. The editor surface already knows,
/// from cursor position and surrounding syntax, which shape a word is in
/// (bare identifier, `Page.field`, `$var`, or a `USE` line) — this provider
/// does not re-derive that from raw text.
pub enum DefinitionQuery<'a> {
    /// A bare `Page` or `PageActions` name.
    Container(&'a str),
    /// `page.member`, where member may be a field, a variable, or an action.
    Member { container: &'a str, member: &'a str },
    /// `use X`.
    Use(&'a str),
    /// `$var`, resolved against the enclosing scenario/hook body.
    Variable { name: &'a str, scope: &'a [Stmt] },
}

pub fn build_definition(query: DefinitionQuery, program: &Program, uri: &Uri) -> Vec<Location> {
    match query {
        DefinitionQuery::Container(name) | DefinitionQuery::Use(name) => {
            if let Some(page) = program.pages.iter().find(|p| p.name == name) {
                return vec![location(uri, page.span)];
            }
            if let Some(pa) = program.page_actions.iter().find(|p| p.name == name) {
                return vec![location(uri, pa.span)];
            }
            vec![]
        }
        DefinitionQuery::Member { container, member } => {
            if let Some(page) = program.pages.iter().find(|p| p.name == container) {
                if let Some(field) = page.fields.iter().find(|f| f.name == member) {
                    return vec![location(uri, field.span)];
                }
                if let Some(variable) = page.variables.iter().find(|v| v.name == member) {
                    return vec![location(uri, variable.span)];
                }
                if let Some(action) = page.actions.iter().find(|a| a.name == member) {
                    return vec![location(uri, action.span)];
                }
            }
            if let Some(pa) = program.page_actions.iter().find(|p| p.name == container) {
                if let Some(action) = pa.actions.iter().find(|a| a.name == member) {
                    return vec![location(uri, action.span)];
                }
            }
            vec![]
        }
        DefinitionQuery::Variable { name, scope } => find_binding(scope, name)
            .map(|span| vec![location(uri, span)])
            .unwrap_or_default(),
    }
}

fn find_binding(stmts: &[Stmt], name: &str) -> Option<vero_core::Span> {
    for stmt in stmts {
        match stmt {
            Stmt::Load(s) if s.variable_name == name => return Some(s.span),
            Stmt::DataQuery(s) if s.variable_name == name => return Some(s.span),
            Stmt::ForEach(s) if s.item_variable == name => return Some(s.span),
            Stmt::ForEach(s) => {
                if let Some(found) = find_binding(&s.statements, name) {
                    return Some(found);
                }
            }
            Stmt::If(s) => {
                if let Some(found) = find_binding(&s.then_body, name) {
                    return Some(found);
                }
                if let Some(body) = &s.else_body {
                    if let Some(found) = find_binding(body, name) {
                        return Some(found);
                    }
                }
            }
            Stmt::Repeat(s) => {
                if let Some(found) = find_binding(&s.body, name) {
                    return Some(found);
                }
            }
            Stmt::TryCatch(s) => {
                if let Some(found) = find_binding(&s.try_body, name) {
                    return Some(found);
                }
                if let Some(found) = find_binding(&s.catch_body, name) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn location(uri: &Uri, span: vero_core::Span) -> Location {
    Location { uri: uri.clone(), range: span_to_point_range(span) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vero_compiler::compile;
    use std::str::FromStr;

    fn test_uri() -> Uri {
        Uri::from_str("file:///test.vero").unwrap()
    }

    #[test]
    fn resolves_page_field_member() {
        let result = vero_compiler::lower_safe(|| {
            vero_compiler::compiler::session::CompileSession::new().run(
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
            )
        })
        .unwrap();
        let uri = test_uri();
        let locs = build_definition(
            DefinitionQuery::Member { container: "LoginPage", member: "submitButton" },
            &result.program,
            &uri,
        );
        assert_eq!(locs.len(), 1);
    }

    #[test]
    fn unknown_container_returns_empty() {
        let result = compile("FEATURE F { SCENARIO S { LOG \"x\" } }");
        let uri = test_uri();
        let locs = build_definition(DefinitionQuery::Container("Nope"), &result.program, &uri);
        assert!(locs.is_empty());
    }
}
