//! Quick-fix code actions (spec §4.5): wraps the compiler's own fix-it
//! engine in LSP shapes. The edit logic itself lives in
//! `vero_compiler::compiler::fixit` — this module only adapts spans to
//! `lsp_types::Range` and text edits to `WorkspaceEdit`.

use crate::util::span_to_range;
use lsp_types::{CodeAction, CodeActionKind, TextEdit as LspTextEdit, Uri, WorkspaceEdit};
use std::collections::HashMap;
use vero_compiler::compiler::fixit::{self, QuickFixContext, TextEditKind};
use vero_compiler::diagnostics::Diagnostic;

/// Builds the code actions available for a single diagnostic.
pub fn build_code_actions(diag: &Diagnostic, ctx: &QuickFixContext, text: &str, uri: &Uri) -> Vec<CodeAction> {
    fixit::quick_fixes(diag, ctx)
        .into_iter()
        .map(|edit| to_code_action(edit, text, uri))
        .collect()
}

fn to_code_action(edit: fixit::TextEdit, text: &str, uri: &Uri) -> CodeAction {
    let range = match edit.kind {
        // Insertions carry a zero-width span at the insertion point; a full
        // line->line range would delete the line the span happens to land on.
        TextEditKind::Insert => span_to_range(edit.span, text),
        TextEditKind::Replace | TextEditKind::Delete => span_to_range(edit.span, text),
    };

    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![LspTextEdit { range, new_text: edit.replacement }]);

    CodeAction {
        title: edit.message,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: None,
        edit: Some(WorkspaceEdit { changes: Some(changes), document_changes: None, change_annotations: None }),
        command: None,
        is_preferred: Some(true),
        disabled: None,
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn missing_use_produces_an_insert_action() {
        let source = "PAGE LoginPage {\n    FIELD submitButton = BUTTON \"Submit\"\n}\nFEATURE Login {\n    SCENARIO S {\n        CLICK LoginPage.submitButton\n    }\n}\n";
        let result = vero_compiler::compile(source);
        let diag = result.diagnostics.iter().find(|d| d.code == "VERO-304").expect("expected a page-not-in-scope diagnostic");
        let ctx = QuickFixContext { file_path: None, line_content: None, defined_pages: &["LoginPage".to_string()] };
        let uri = Uri::from_str("file:///test.vero").unwrap();
        let actions = build_code_actions(diag, &ctx, source, &uri);
        assert!(actions.iter().any(|a| a.title.contains("use LoginPage")));
    }

    #[test]
    fn keyword_typo_produces_a_replace_action() {
        let source = "PAGE LoginPage {\n    FIELD submitButton = BUTTON \"Submit\"\n}\nFEATURE Login {\n    USE LoginPage\n    SCENARIO S {\n        clik LoginPage.submitButton\n    }\n}\n";
        let result = vero_compiler::compile(source);
        let diag = result.diagnostics.first().expect("expected at least one diagnostic for the unrecognized statement");
        let ctx = QuickFixContext { file_path: None, line_content: Some("        clik LoginPage.submitButton"), defined_pages: &[] };
        let uri = Uri::from_str("file:///test.vero").unwrap();
        let actions = build_code_actions(diag, &ctx, source, &uri);
        assert!(actions.iter().any(|a| a.title.contains("click")));
    }
}
