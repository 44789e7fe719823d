//! Folding range provider (spec §6.5): block ranges for pages, actions,
//! scenarios, hooks, and `{...}` bodies.

use crate::util::byte_offset_to_line;
use lsp_types::{FoldingRange, FoldingRangeKind};
use vero_compiler::compiler::ast::Program;
use vero_core::Span;

pub fn build_folding_ranges(text: &str, program: &Program) -> Vec<FoldingRange> {
    let mut ranges = Vec::new();

    for page in &program.pages {
        push_range(&mut ranges, page.span, text);
        for action in &page.actions {
            push_range(&mut ranges, action.span, text);
        }
    }
    for page_actions in &program.page_actions {
        push_range(&mut ranges, page_actions.span, text);
        for action in &page_actions.actions {
            push_range(&mut ranges, action.span, text);
        }
    }
    for feature in &program.features {
        push_range(&mut ranges, feature.span, text);
        for hook in &feature.hooks {
            push_range(&mut ranges, hook.span, text);
        }
        for scenario in &feature.scenarios {
            push_range(&mut ranges, scenario.span, text);
        }
    }

    ranges
}

fn push_range(ranges: &mut Vec<FoldingRange>, span: Span, text: &str) {
    let start_line = span.line.saturating_sub(1) as u32;
    let end_line = byte_offset_to_line(text, span.end);
    if end_line <= start_line {
        return;
    }
    ranges.push(FoldingRange {
        start_line,
        start_character: None,
        end_line,
        end_character: None,
        kind: Some(FoldingRangeKind::Region),
        collapsed_text: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_scenario_produces_a_folding_range() {
        let source = "PAGE P {\n  FIELD f = BUTTON \"x\"\n}\nFEATURE F {\n  USE P\n  SCENARIO S {\n    CLICK P.f\n  }\n}\n";
        let result = vero_compiler::compile(source);
        let ranges = build_folding_ranges(source, &result.program);
        assert!(!ranges.is_empty());
    }
}
