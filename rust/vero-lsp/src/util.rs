//! Span → `lsp_types::Range` conversion shared by every provider.

use lsp_types::{Position, Range};
use vero_core::Span;

/// Converts a compiler `Span` (1-based line/col, byte offsets) into an LSP
/// `Range` (0-based). The end position is derived from the span's byte
/// offset rather than carried separately, since `Span` only tracks the
/// start line/col precisely.
pub fn span_to_range(span: Span, text: &str) -> Range {
    let start_line = span.line.saturating_sub(1) as u32;
    let start_char = span.col.saturating_sub(1) as u32;
    let end_line = byte_offset_to_line(text, span.end);
    let end_char = byte_offset_to_col(text, span.end);
    Range {
        start: Position { line: start_line, character: start_char },
        end: Position { line: end_line, character: end_char },
    }
}

/// Selection range covering just the name token on the span's start line.
pub fn span_to_point_range(span: Span) -> Range {
    let line = span.line.saturating_sub(1) as u32;
    let col = span.col.saturating_sub(1) as u32;
    Range {
        start: Position { line, character: col },
        end: Position { line, character: col + 1 },
    }
}

pub fn byte_offset_to_line(text: &str, offset: usize) -> u32 {
    let clamped = offset.min(text.len());
    text[..clamped].matches('\n').count() as u32
}

pub fn byte_offset_to_col(text: &str, offset: usize) -> u32 {
    let clamped = offset.min(text.len());
    match text[..clamped].rfind('\n') {
        Some(nl) => (clamped - nl - 1) as u32,
        None => clamped as u32,
    }
}
