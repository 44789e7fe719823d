//! Document symbol provider (spec §6.5): tree of
//! `{name, kind ∈ {Class, Field, Method, Function, Variable}, range}`.

use crate::util::{span_to_point_range, span_to_range};
use lsp_types::{DocumentSymbol, DocumentSymbolResponse, SymbolKind};
use vero_compiler::compiler::ast::Program;

pub fn build_document_symbols(text: &str, program: &Program) -> DocumentSymbolResponse {
    let mut symbols = Vec::new();

    for page in &program.pages {
        let children: Vec<DocumentSymbol> = page
            .fields
            .iter()
            .map(|f| symbol(&f.name, SymbolKind::FIELD, Some(format!("{} \"{}\"", f.selector.keyword(), f.selector.argument())), f.span, text))
            .chain(page.variables.iter().map(|v| symbol(&v.name, SymbolKind::VARIABLE, None, v.span, text)))
            .chain(page.actions.iter().map(|a| symbol(&a.name, SymbolKind::METHOD, Some(format!("({})", a.parameters.join(", "))), a.span, text)))
            .collect();
        symbols.push(symbol_with_children(&page.name, SymbolKind::CLASS, None, page.span, text, children));
    }

    for page_actions in &program.page_actions {
        let children: Vec<DocumentSymbol> = page_actions
            .actions
            .iter()
            .map(|a| symbol(&a.name, SymbolKind::METHOD, Some(format!("({})", a.parameters.join(", "))), a.span, text))
            .collect();
        symbols.push(symbol_with_children(
            &page_actions.name,
            SymbolKind::CLASS,
            Some(format!("for {}", page_actions.for_page)),
            page_actions.span,
            text,
            children,
        ));
    }

    for feature in &program.features {
        let children: Vec<DocumentSymbol> = feature
            .scenarios
            .iter()
            .map(|s| symbol(&s.name, SymbolKind::FUNCTION, None, s.span, text))
            .collect();
        symbols.push(symbol_with_children(&feature.name, SymbolKind::CLASS, None, feature.span, text, children));
    }

    if symbols.is_empty() {
        DocumentSymbolResponse::Nested(vec![])
    } else {
        DocumentSymbolResponse::Nested(symbols)
    }
}

fn symbol(name: &str, kind: SymbolKind, detail: Option<String>, span: vero_core::Span, text: &str) -> DocumentSymbol {
    symbol_with_children(name, kind, detail, span, text, vec![])
}

fn symbol_with_children(
    name: &str,
    kind: SymbolKind,
    detail: Option<String>,
    span: vero_core::Span,
    text: &str,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    #[allow(deprecated)]
    DocumentSymbol {
        name: name.to_string(),
        detail,
        kind,
        tags: None,
        deprecated: None,
        range: span_to_range(span, text),
        selection_range: span_to_point_range(span),
        children: if children.is_empty() { None } else { Some(children) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_with_fields_and_actions_nests_children() {
        let source = r#"
        PAGE LoginPage {
            FIELD submitButton = BUTTON "Submit"
            login() {
                CLICK LoginPage.submitButton
            }
        }
        "#;
        let result = vero_compiler::compile(source);
        let response = build_document_symbols(source, &result.program);
        match response {
            DocumentSymbolResponse::Nested(symbols) => {
                assert_eq!(symbols.len(), 1);
                assert_eq!(symbols[0].name, "LoginPage");
                let children = symbols[0].children.as_ref().unwrap();
                assert_eq!(children.len(), 2);
            }
            _ => panic!("expected nested response"),
        }
    }
}
