//! Context-aware completion (spec §6.5): items filtered by the text typed
//! on the current line so far.

use crate::keyword_docs;
use lsp_types::{CompletionItem, CompletionItemKind, CompletionList, Documentation};
use vero_compiler::compiler::ast::Program;

const CONDITION_KEYWORDS: &[&str] = &[
    "VISIBLE", "HIDDEN", "ENABLED", "DISABLED", "CHECKED", "FOCUSED", "EMPTY",
    "HAS TEXT", "CONTAINS", "HAS CLASS", "HAS VALUE", "HAS COUNT",
];

const SELECTOR_KEYWORDS: &[&str] = &[
    "BUTTON", "TEXTBOX", "LINK", "CHECKBOX", "HEADING", "COMBOBOX", "RADIO",
    "ROLE", "LABEL", "PLACEHOLDER", "TESTID", "TEXT", "ALT", "TITLE", "CSS", "XPATH",
];

/// Completion filtered by what's typed on the current line so far
/// (spec §6.5: after VERIFY → conditions; after `FIELD name =` → selector
/// kinds; after DO/PERFORM → `Page.action` pairs; after `$` → in-scope
/// variables; line start → all statement keywords).
pub fn build_completion(line_prefix: &str, program: Option<&Program>, scope_vars: &[String]) -> CompletionList {
    let trimmed = line_prefix.trim_end();
    let items = if trimmed.is_empty() {
        statement_keyword_items()
    } else if line_prefix.ends_with('$') {
        variable_items(scope_vars)
    } else if trimmed.to_uppercase().ends_with('=') && trimmed.to_uppercase().contains("FIELD") {
        keyword_items(SELECTOR_KEYWORDS, CompletionItemKind::ENUM_MEMBER)
    } else if last_word_upper(trimmed).as_deref() == Some("IS") || last_word_upper(trimmed).as_deref() == Some("NOT") {
        keyword_items(CONDITION_KEYWORDS, CompletionItemKind::KEYWORD)
    } else if matches!(last_word_upper(trimmed).as_deref(), Some("DO") | Some("PERFORM")) {
        program.map(action_pair_items).unwrap_or_default()
    } else {
        statement_keyword_items()
    };

    CompletionList { is_incomplete: false, items }
}

fn last_word_upper(line: &str) -> Option<String> {
    line.split_whitespace().last().map(|w| w.to_uppercase())
}

fn statement_keyword_items() -> Vec<CompletionItem> {
    keyword_docs::all_keywords()
        .map(|k| CompletionItem {
            label: k.keyword.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            detail: Some(k.signature.to_string()),
            documentation: Some(Documentation::String(k.doc.to_string())),
            ..Default::default()
        })
        .collect()
}

fn keyword_items(words: &[&str], kind: CompletionItemKind) -> Vec<CompletionItem> {
    words
        .iter()
        .map(|w| CompletionItem { label: w.to_string(), kind: Some(kind), ..Default::default() })
        .collect()
}

fn variable_items(scope_vars: &[String]) -> Vec<CompletionItem> {
    scope_vars
        .iter()
        .map(|v| CompletionItem { label: v.clone(), kind: Some(CompletionItemKind::VARIABLE), ..Default::default() })
        .collect()
}

fn action_pair_items(program: &Program) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for page in &program.pages {
        for action in &page.actions {
            items.push(CompletionItem {
                label: format!("{}.{}", page.name, action.name),
                kind: Some(CompletionItemKind::FUNCTION),
                detail: Some(format!("({})", action.parameters.join(", "))),
                ..Default::default()
            });
        }
    }
    for page_actions in &program.page_actions {
        for action in &page_actions.actions {
            items.push(CompletionItem {
                label: format!("{}.{}", page_actions.name, action.name),
                kind: Some(CompletionItemKind::FUNCTION),
                detail: Some(format!("({})", action.parameters.join(", "))),
                ..Default::default()
            });
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_start_offers_statement_keywords() {
        let list = build_completion("", None, &[]);
        assert!(list.items.iter().any(|i| i.label == "CLICK"));
    }

    #[test]
    fn after_field_equals_offers_selector_kinds() {
        let list = build_completion("FIELD submitButton =", None, &[]);
        assert!(list.items.iter().any(|i| i.label == "BUTTON"));
    }

    #[test]
    fn after_dollar_offers_scope_variables() {
        let vars = vec!["row".to_string()];
        let list = build_completion("FILL LoginPage.username WITH $", None, &vars);
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].label, "row");
    }
}
