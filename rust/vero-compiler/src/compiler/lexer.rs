//! Lexer (spec §4.1): source text → token stream. Never aborts on error —
//! on a scanning failure it emits `TokenKind::Unknown` plus a `LexError` and
//! resumes at the next character (P1, lexer totality).

use crate::compiler::tokens::{lookup_keyword, Token, TokenKind};
use thiserror::Error;
use vero_core::Span;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    #[error("unterminated string starting at line {line}, col {col}")]
    UnterminatedString { line: usize, col: usize },
    #[error("malformed number at line {line}, col {col}")]
    MalformedNumber { line: usize, col: usize },
    #[error("unterminated environment reference at line {line}, col {col}")]
    UnterminatedEnvRef { line: usize, col: usize },
    #[error("unexpected character '{ch}' at line {line}, col {col}")]
    UnexpectedChar { ch: char, line: usize, col: usize },
}

impl LexError {
    pub fn span(&self) -> Span {
        let (line, col) = match self {
            LexError::UnterminatedString { line, col }
            | LexError::MalformedNumber { line, col }
            | LexError::UnterminatedEnvRef { line, col }
            | LexError::UnexpectedChar { line, col, .. } => (*line, *col),
        };
        Span::new(0, 0, line, col)
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    byte_offset: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        // Strip a UTF-8 BOM if present (spec §6.2).
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            chars: source.chars().collect(),
            pos: 0,
            byte_offset: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        self.byte_offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn span_here(&self) -> Span {
        Span::new(self.byte_offset, self.byte_offset, self.line, self.col)
    }

    fn span_from(&self, start_offset: usize, start_line: usize, start_col: usize) -> Span {
        Span::new(start_offset, self.byte_offset, start_line, start_col)
    }

    /// Tokenizes the whole source. Always terminates and always ends in
    /// `Eof` (P1).
    pub fn lex(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            let Some(ch) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, "", self.span_here()));
                break;
            };

            let start_offset = self.byte_offset;
            let (start_line, start_col) = (self.line, self.col);

            if ch.is_ascii_digit() || (ch == '-' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())) {
                match self.scan_number(start_offset, start_line, start_col) {
                    Ok(tok) => tokens.push(tok),
                    Err(e) => {
                        tokens.push(Token::new(
                            TokenKind::Unknown(ch),
                            ch.to_string(),
                            self.span_from(start_offset, start_line, start_col),
                        ));
                        errors.push(e);
                    }
                }
                continue;
            }

            if ch == '"' {
                match self.scan_string(start_offset, start_line, start_col) {
                    Ok(tok) => tokens.push(tok),
                    Err(e) => {
                        tokens.push(Token::new(
                            TokenKind::Unknown('"'),
                            "\"",
                            self.span_from(start_offset, start_line, start_col),
                        ));
                        errors.push(e);
                    }
                }
                continue;
            }

            if ch == '{' && self.peek_at(1) == Some('{') {
                match self.scan_env_ref(start_offset, start_line, start_col) {
                    Ok(tok) => tokens.push(tok),
                    Err(e) => {
                        tokens.push(Token::new(
                            TokenKind::Unknown('{'),
                            "{{",
                            self.span_from(start_offset, start_line, start_col),
                        ));
                        errors.push(e);
                    }
                }
                continue;
            }

            if ch.is_alphabetic() || ch == '_' {
                tokens.push(self.scan_identifier_or_keyword(start_offset, start_line, start_col));
                continue;
            }

            if let Some(tok) = self.scan_punctuation(start_offset, start_line, start_col) {
                tokens.push(tok);
                continue;
            }

            // Unrecognized character: emit UNKNOWN, record the error, and
            // resume at the next character (lexing never aborts).
            self.advance();
            errors.push(LexError::UnexpectedChar {
                ch,
                line: start_line,
                col: start_col,
            });
            tokens.push(Token::new(
                TokenKind::Unknown(ch),
                ch.to_string(),
                self.span_from(start_offset, start_line, start_col),
            ));
        }

        (tokens, errors)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_number(&mut self, so: usize, sl: usize, sc: usize) -> Result<Token, LexError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push(self.advance().unwrap());
        }
        let mut dot_count = 0;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(self.advance().unwrap());
            } else if c == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                dot_count += 1;
                text.push(self.advance().unwrap());
            } else {
                break;
            }
        }
        if dot_count > 1 {
            return Err(LexError::MalformedNumber { line: sl, col: sc });
        }
        let value: f64 = text
            .parse()
            .map_err(|_| LexError::MalformedNumber { line: sl, col: sc })?;
        Ok(Token::new(
            TokenKind::NumberLit(value),
            text,
            self.span_from(so, sl, sc),
        ))
    }

    fn scan_string(&mut self, so: usize, sl: usize, sc: usize) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut value = String::new();
        let mut raw = String::from("\"");
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexError::UnterminatedString { line: sl, col: sc });
                }
                Some('"') => {
                    self.advance();
                    raw.push('"');
                    break;
                }
                Some('\\') => {
                    self.advance();
                    raw.push('\\');
                    match self.advance() {
                        Some('"') => {
                            value.push('"');
                            raw.push('"');
                        }
                        Some('\\') => {
                            value.push('\\');
                            raw.push('\\');
                        }
                        Some('n') => {
                            value.push('\n');
                            raw.push('n');
                        }
                        Some('t') => {
                            value.push('\t');
                            raw.push('t');
                        }
                        Some('r') => {
                            value.push('\r');
                            raw.push('r');
                        }
                        Some(other) => {
                            value.push('\\');
                            value.push(other);
                            raw.push(other);
                        }
                        None => return Err(LexError::UnterminatedString { line: sl, col: sc }),
                    }
                }
                Some(c) => {
                    value.push(c);
                    raw.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(
            TokenKind::StringLit(value),
            raw,
            self.span_from(so, sl, sc),
        ))
    }

    fn scan_env_ref(&mut self, so: usize, sl: usize, sc: usize) -> Result<Token, LexError> {
        self.advance();
        self.advance(); // consume "{{"
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(self.advance().unwrap());
            } else {
                break;
            }
        }
        if self.peek() != Some('}') || self.peek_at(1) != Some('}') {
            return Err(LexError::UnterminatedEnvRef { line: sl, col: sc });
        }
        self.advance();
        self.advance();
        Ok(Token::new(
            TokenKind::EnvVarRef(name.clone()),
            format!("{{{{{}}}}}", name),
            self.span_from(so, sl, sc),
        ))
    }

    fn scan_identifier_or_keyword(&mut self, so: usize, sl: usize, sc: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(self.advance().unwrap());
            } else {
                break;
            }
        }
        let span = self.span_from(so, sl, sc);
        match lookup_keyword(&text.to_lowercase()) {
            Some(kind) => Token::new(kind, text, span),
            None => Token::new(TokenKind::Ident(text.clone()), text, span),
        }
    }

    fn scan_punctuation(&mut self, so: usize, sl: usize, sc: usize) -> Option<Token> {
        let ch = self.peek()?;
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '@' => TokenKind::At,
            '.' => {
                if self.peek_at(1) == Some('.') {
                    self.advance();
                    self.advance();
                    return Some(Token::new(
                        TokenKind::DotDot,
                        "..",
                        self.span_from(so, sl, sc),
                    ));
                }
                TokenKind::Dot
            }
            '=' => {
                if self.peek_at(1) == Some('=') {
                    self.advance();
                    self.advance();
                    return Some(Token::new(
                        TokenKind::Eq,
                        "==",
                        self.span_from(so, sl, sc),
                    ));
                }
                TokenKind::Assign
            }
            '!' if self.peek_at(1) == Some('=') => {
                self.advance();
                self.advance();
                return Some(Token::new(
                    TokenKind::NotEq,
                    "!=",
                    self.span_from(so, sl, sc),
                ));
            }
            '<' => {
                if self.peek_at(1) == Some('=') {
                    self.advance();
                    self.advance();
                    return Some(Token::new(
                        TokenKind::LtEq,
                        "<=",
                        self.span_from(so, sl, sc),
                    ));
                }
                TokenKind::Lt
            }
            '>' => {
                if self.peek_at(1) == Some('=') {
                    self.advance();
                    self.advance();
                    return Some(Token::new(
                        TokenKind::GtEq,
                        ">=",
                        self.span_from(so, sl, sc),
                    ));
                }
                TokenKind::Gt
            }
            _ => return None,
        };
        self.advance();
        Some(Token::new(kind, ch.to_string(), self.span_from(so, sl, sc)))
    }
}

/// Convenience entry point mirroring spec's `lex(source) -> (tokens, diagnostics)`.
pub fn lex(source: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(source).lex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_always_ends_in_eof() {
        for src in ["", "   ", "PAGE Foo { }", "### broken \" unterminated"] {
            let (tokens, _) = lex(src);
            assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn strips_comments_and_whitespace() {
        let (tokens, errs) = lex("# comment\nPAGE Foo {} // trailing");
        assert!(errs.is_empty());
        assert!(!tokens.iter().any(|t| matches!(t.kind, TokenKind::Comment)));
        assert_eq!(tokens[0].kind, TokenKind::Page);
    }

    #[test]
    fn keywords_case_insensitive_lexeme_preserved() {
        let (tokens, _) = lex("PaGe");
        assert_eq!(tokens[0].kind, TokenKind::Page);
        assert_eq!(tokens[0].lexeme, "PaGe");
    }

    #[test]
    fn unterminated_string_emits_diagnostic_and_continues() {
        let (tokens, errs) = lex("FIELD x = TEXTBOX \"unterminated\nFIELD y = BUTTON \"ok\"");
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], LexError::UnterminatedString { .. }));
        // lexing continues past the error
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Button));
    }

    #[test]
    fn malformed_number_two_dots() {
        let (_, errs) = lex("LIMIT 1.2.3");
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], LexError::MalformedNumber { .. }));
    }

    #[test]
    fn env_var_ref_round_trip() {
        let (tokens, errs) = lex("FILL Page.email WITH {{userEmail}}");
        assert!(errs.is_empty());
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::EnvVarRef("userEmail".to_string())));
    }

    #[test]
    fn unterminated_env_ref() {
        let (_, errs) = lex("{{oops");
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], LexError::UnterminatedEnvRef { .. }));
    }

    #[test]
    fn multi_word_phrases_are_individual_tokens() {
        let (tokens, _) = lex("SWITCH TO NEW TAB");
        let kinds: Vec<_> = tokens.iter().map(|t| &t.kind).collect();
        assert_eq!(kinds[0], &TokenKind::Switch);
        // TO is not a keyword of ours; it lexes as a plain identifier.
        assert!(matches!(kinds[1], TokenKind::Ident(_)));
        assert_eq!(kinds[2], &TokenKind::New);
        assert_eq!(kinds[3], &TokenKind::Tab);
    }
}
