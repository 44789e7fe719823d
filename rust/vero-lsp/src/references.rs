//! Find-references provider (spec §6.5): `(…, includeDeclaration) ->
//! [Location + kind]`.

use crate::util::span_to_point_range;
use lsp_types::{Location, Uri};
use vero_compiler::compiler::ast::{Program, Stmt, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Definition,
    Use,
    Do,
    Click,
    Fill,
    Verify,
    Reference,
}

pub struct Reference {
    pub location: Location,
    pub kind: ReferenceKind,
}

/// Finds every reference to `Page.member` (a field or action) across uses,
/// statements, and perform calls in every feature.
pub fn find_references(program: &Program, page: &str, member: &str, include_declaration: bool, uri: &Uri) -> Vec<Reference> {
    let mut out = Vec::new();

    if include_declaration {
        if let Some(p) = program.pages.iter().find(|p| p.name == page) {
            if let Some(field) = p.fields.iter().find(|f| f.name == member) {
                out.push(reference(uri, field.span, ReferenceKind::Definition));
            }
            if let Some(action) = p.actions.iter().find(|a| a.name == member) {
                out.push(reference(uri, action.span, ReferenceKind::Definition));
            }
        }
    }

    for feature in &program.features {
        if include_declaration {
            if let Some(u) = feature.uses.iter().find(|u| u.name == page) {
                out.push(reference(uri, u.span, ReferenceKind::Use));
            }
        }
        for hook in &feature.hooks {
            collect_in_stmts(&hook.statements, page, member, uri, &mut out);
        }
        for scenario in &feature.scenarios {
            collect_in_stmts(&scenario.statements, page, member, uri, &mut out);
        }
    }

    out
}

fn collect_in_stmts(stmts: &[Stmt], page: &str, member: &str, uri: &Uri, out: &mut Vec<Reference>) {
    for stmt in stmts {
        match stmt {
            Stmt::Click(t, _) if target_matches(t, page, member) => out.push(reference(uri, t.span, ReferenceKind::Click)),
            Stmt::Fill(t, _, _) if target_matches(t, page, member) => out.push(reference(uri, t.span, ReferenceKind::Fill)),
            Stmt::Check(t, _) | Stmt::Uncheck(t, _) | Stmt::Select(t, _, _) | Stmt::Hover(t, _)
            | Stmt::Scroll(t, _) | Stmt::Clear(t, _) | Stmt::Upload(t, _, _)
                if target_matches(t, page, member) =>
            {
                out.push(reference(uri, t.span, ReferenceKind::Reference))
            }
            Stmt::Drag(a, b, _) => {
                if target_matches(a, page, member) {
                    out.push(reference(uri, a.span, ReferenceKind::Reference));
                }
                if target_matches(b, page, member) {
                    out.push(reference(uri, b.span, ReferenceKind::Reference));
                }
            }
            Stmt::Verify(v) if target_matches(&v.target, page, member) => {
                out.push(reference(uri, v.target.span, ReferenceKind::Verify))
            }
            Stmt::Perform(action_ref, _, _) if action_ref.container == page && action_ref.action == member => {
                out.push(reference(uri, action_ref.span, ReferenceKind::Do))
            }
            Stmt::If(s) => {
                collect_in_stmts(&s.then_body, page, member, uri, out);
                if let Some(body) = &s.else_body {
                    collect_in_stmts(body, page, member, uri, out);
                }
            }
            Stmt::Repeat(s) => collect_in_stmts(&s.body, page, member, uri, out),
            Stmt::ForEach(s) => collect_in_stmts(&s.statements, page, member, uri, out),
            Stmt::TryCatch(s) => {
                collect_in_stmts(&s.try_body, page, member, uri, out);
                collect_in_stmts(&s.catch_body, page, member, uri, out);
            }
            _ => {}
        }
    }
}

fn target_matches(t: &Target, page: &str, field: &str) -> bool {
    t.page == page && t.field == field
}

fn reference(uri: &Uri, span: vero_core::Span, kind: ReferenceKind) -> Reference {
    Reference { location: Location { uri: uri.clone(), range: span_to_point_range(span) }, kind }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn finds_click_and_verify_references() {
        let result = vero_compiler::compile(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            FEATURE Login {
                USE LoginPage
                SCENARIO S {
                    CLICK LoginPage.submitButton
                    VERIFY LoginPage.submitButton IS ENABLED
                }
            }
            "#,
        );
        let uri = Uri::from_str("file:///test.vero").unwrap();
        let refs = find_references(&result.program, "LoginPage", "submitButton", true, &uri);
        let kinds: Vec<ReferenceKind> = refs.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&ReferenceKind::Definition));
        assert!(kinds.contains(&ReferenceKind::Use));
        assert!(kinds.contains(&ReferenceKind::Click));
        assert!(kinds.contains(&ReferenceKind::Verify));
    }
}
