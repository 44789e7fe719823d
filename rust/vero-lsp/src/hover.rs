//! Hover provider (spec §6.5): `(line, word, lineContent) -> {html, range}`.

use crate::keyword_docs;
use crate::util::span_to_point_range;
use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Range};
use vero_compiler::compiler::ast::{Program, Stmt};

/// Symbol-specific info takes priority over the fixed keyword table, since a
/// page named the same as a keyword (unusual, but not forbidden by the
/// grammar) still describes a concrete declaration the author wrote.
pub fn build_hover(_line: usize, word: &str, _line_content: &str, program: Option<&Program>) -> Option<Hover> {
    if let Some(prog) = program {
        if let Some(hover) = hover_for_symbol(prog, word) {
            return Some(hover);
        }
    }
    hover_for_keyword(word)
}

fn hover_for_symbol(program: &Program, word: &str) -> Option<Hover> {
    for page in &program.pages {
        if page.name == word {
            let body = format!(
                "page {}\n  {} field(s)\n  {} action(s)",
                page.name,
                page.fields.len(),
                page.actions.len()
            );
            return Some(markup_hover(&body, None, Some(span_to_point_range(page.span))));
        }
        for field in &page.fields {
            if field.name == word {
                let body = format!("{}.{}: {} \"{}\"", page.name, field.name, field.selector.keyword(), field.selector.argument());
                return Some(markup_hover(&body, None, Some(span_to_point_range(field.span))));
            }
        }
        for variable in &page.variables {
            if variable.name == word {
                let body = format!("variable {}.{}", page.name, variable.name);
                return Some(markup_hover(&body, None, Some(span_to_point_range(variable.span))));
            }
        }
        for action in &page.actions {
            if action.name == word {
                let body = format!("{}.{}({})", page.name, action.name, action.parameters.join(", "));
                return Some(markup_hover(&body, None, Some(span_to_point_range(action.span))));
            }
        }
    }

    for page_actions in &program.page_actions {
        if page_actions.name == word {
            let body = format!(
                "pageactions {} for {}\n  {} action(s)",
                page_actions.name,
                page_actions.for_page,
                page_actions.actions.len()
            );
            return Some(markup_hover(&body, None, Some(span_to_point_range(page_actions.span))));
        }
        for action in &page_actions.actions {
            if action.name == word {
                let body = format!("{}.{}({})", page_actions.name, action.name, action.parameters.join(", "));
                return Some(markup_hover(&body, None, Some(span_to_point_range(action.span))));
            }
        }
    }

    for feature in &program.features {
        if feature.name == word {
            let body = format!(
                "feature {}\n  {} scenario(s)\n  {} hook(s)",
                feature.name,
                feature.scenarios.len(),
                feature.hooks.len()
            );
            return Some(markup_hover(&body, None, Some(span_to_point_range(feature.span))));
        }
        for scenario in &feature.scenarios {
            if scenario.name == word {
                return Some(markup_hover(
                    &format!("scenario \"{}\"", scenario.name),
                    None,
                    Some(span_to_point_range(scenario.span)),
                ));
            }
            if let Some(found) = variable_hover_in_stmts(&scenario.statements, word) {
                return Some(found);
            }
        }
        for hook in &feature.hooks {
            if let Some(found) = variable_hover_in_stmts(&hook.statements, word) {
                return Some(found);
            }
        }
    }

    None
}

/// `$var`-shaped bindings introduced by `ROW`/`ROWS`/`LOAD`/`FOR`.
fn variable_hover_in_stmts(stmts: &[Stmt], word: &str) -> Option<Hover> {
    for stmt in stmts {
        match stmt {
            Stmt::Load(s) if s.variable_name == word => {
                return Some(markup_hover(&format!("variable ${} — from table \"{}\"", word, s.table_name), None, None));
            }
            Stmt::DataQuery(s) if s.variable_name == word => {
                return Some(markup_hover(&format!("variable ${} — {:?} query result", word, s.result_type), None, None));
            }
            Stmt::ForEach(s) => {
                if s.item_variable == word {
                    return Some(markup_hover(&format!("variable ${} — loop item over ${}", word, s.collection_variable), None, None));
                }
                if let Some(found) = variable_hover_in_stmts(&s.statements, word) {
                    return Some(found);
                }
            }
            Stmt::If(s) => {
                if let Some(found) = variable_hover_in_stmts(&s.then_body, word) {
                    return Some(found);
                }
                if let Some(body) = &s.else_body {
                    if let Some(found) = variable_hover_in_stmts(body, word) {
                        return Some(found);
                    }
                }
            }
            Stmt::Repeat(s) => {
                if let Some(found) = variable_hover_in_stmts(&s.body, word) {
                    return Some(found);
                }
            }
            Stmt::TryCatch(s) => {
                if let Some(found) = variable_hover_in_stmts(&s.try_body, word) {
                    return Some(found);
                }
                if let Some(found) = variable_hover_in_stmts(&s.catch_body, word) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn hover_for_keyword(word: &str) -> Option<Hover> {
    let entry = keyword_docs::lookup(word)?;
    Some(markup_hover(entry.signature, Some(entry.doc), None))
}

fn markup_hover(signature: &str, doc: Option<&str>, range: Option<Range>) -> Hover {
    let code_block = format!("```vero\n{}\n```", signature);
    let value = match doc {
        Some(d) if !d.is_empty() => format!("{}\n\n---\n\n{}", code_block, d),
        _ => code_block,
    };
    Hover {
        contents: HoverContents::Markup(MarkupContent { kind: MarkupKind::Markdown, value }),
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_on_known_keyword_returns_signature() {
        let hover = build_hover(1, "CLICK", "CLICK LoginPage.submitButton", None).unwrap();
        match hover.contents {
            HoverContents::Markup(m) => assert!(m.value.contains("CLICK Page.field")),
            _ => panic!("expected markup contents"),
        }
    }

    #[test]
    fn hover_on_unknown_word_is_none() {
        assert!(build_hover(1, "notaword", "notaword", None).is_none());
    }
}
