//! Hand-written recursive-descent parser with single-token lookahead and
//! panic-mode recovery (spec §4.2).

use crate::compiler::ast::*;
use crate::compiler::tokens::{Token, TokenKind};
use thiserror::Error;
use vero_core::Span;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected token: expected one of {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },
    #[error("unrecognized tab operation form")]
    UnknownTabForm { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnknownTabForm { span } => *span,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    /// Byte offsets of tokens we've already reported an error for, so
    /// recovery never duplicates a diagnostic for the same token.
    reported_offsets: std::collections::HashSet<usize>,
}

type PResult<T> = Result<T, ()>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            reported_offsets: std::collections::HashSet::new(),
        }
    }

    pub fn parse(mut self) -> (Program, Vec<ParseError>) {
        let start = self.span();
        let mut pages = Vec::new();
        let mut page_actions = Vec::new();
        let mut features = Vec::new();

        while !self.is_eof() {
            match self.peek_kind() {
                TokenKind::Page => {
                    if let Ok(p) = self.parse_page_decl() {
                        pages.push(p);
                    }
                }
                TokenKind::PageActions => {
                    if let Ok(pa) = self.parse_page_actions_decl() {
                        page_actions.push(pa);
                    }
                }
                TokenKind::Feature => {
                    if let Ok(f) = self.parse_feature_decl() {
                        features.push(f);
                    }
                }
                TokenKind::Eof => break,
                _ => {
                    self.error_unexpected("PAGE, PAGEACTIONS, or FEATURE");
                    self.recover_top_level();
                }
            }
        }

        let end = self.span();
        (
            Program {
                pages,
                page_actions,
                features,
                span: start.merge(end),
            },
            self.errors,
        )
    }

    // ── Token stream helpers ──────────────────────────────────────────

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_n(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected_desc: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            self.error_unexpected(expected_desc);
            Err(())
        }
    }

    fn error_unexpected(&mut self, expected: &str) {
        let tok = self.peek().clone();
        if self.reported_offsets.contains(&tok.span.start) {
            return;
        }
        self.reported_offsets.insert(tok.span.start);
        self.errors.push(ParseError::UnexpectedToken {
            expected: expected.to_string(),
            got: format!("{}", tok.kind),
            span: tok.span,
        });
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.peek_kind().clone() {
            TokenKind::Ident(s) => {
                self.advance();
                Ok(s)
            }
            _ => {
                self.error_unexpected("identifier");
                Err(())
            }
        }
    }

    fn expect_string(&mut self) -> PResult<String> {
        match self.peek_kind().clone() {
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(s)
            }
            _ => {
                self.error_unexpected("string literal");
                Err(())
            }
        }
    }

    /// Skip tokens until the next `}`, a statement-leading keyword, or EOF.
    fn recover_block(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::RBrace | TokenKind::Eof => return,
                k if is_statement_leader(k) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn recover_top_level(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Page | TokenKind::PageActions | TokenKind::Feature | TokenKind::Eof => {
                    return
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Page / PageActions ─────────────────────────────────────────────

    fn parse_page_decl(&mut self) -> PResult<Page> {
        let start = self.span();
        self.advance(); // PAGE
        let name = self.expect_ident()?;
        let mut url = None;
        if self.matches(&TokenKind::LParen) {
            url = Some(self.expect_string()?);
            self.expect(TokenKind::RParen, "`)`")?;
        }
        self.expect(TokenKind::LBrace, "`{`")?;

        let mut fields = Vec::new();
        let mut variables = Vec::new();
        let mut actions = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            match self.peek_kind() {
                TokenKind::Field => {
                    if let Ok(f) = self.parse_field() {
                        fields.push(f);
                    } else {
                        self.recover_block();
                    }
                }
                TokenKind::Variable => {
                    if let Ok(v) = self.parse_page_variable() {
                        variables.push(v);
                    } else {
                        self.recover_block();
                    }
                }
                TokenKind::Ident(_) => {
                    if let Ok(a) = self.parse_action() {
                        actions.push(a);
                    } else {
                        self.recover_block();
                    }
                }
                _ => {
                    self.error_unexpected("FIELD, VARIABLE, action name, or `}`");
                    self.recover_block();
                }
            }
        }
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Page {
            name,
            url,
            fields,
            variables,
            actions,
            span: start.merge(end),
        })
    }

    fn parse_field(&mut self) -> PResult<Field> {
        let start = self.span();
        self.advance(); // FIELD
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign, "`=`")?;
        let selector = self.parse_selector_literal()?;
        let end = self.span();
        Ok(Field {
            name,
            selector,
            span: start.merge(end),
        })
    }

    fn parse_page_variable(&mut self) -> PResult<Variable> {
        let start = self.span();
        self.advance(); // VARIABLE
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign, "`=`")?;
        let value = self.parse_expr()?;
        let end = value.span();
        Ok(Variable {
            name,
            value,
            span: start.merge(end),
        })
    }

    fn parse_selector_literal(&mut self) -> PResult<Selector> {
        let kind = self.peek_kind().clone();
        macro_rules! sel {
            ($variant:ident) => {{
                self.advance();
                let arg = self.expect_string()?;
                Ok(Selector::$variant(arg))
            }};
        }
        match kind {
            TokenKind::Button => sel!(Button),
            TokenKind::Textbox => sel!(Textbox),
            TokenKind::Link => sel!(Link),
            TokenKind::CheckboxSel => sel!(Checkbox),
            TokenKind::Heading => sel!(Heading),
            TokenKind::Combobox => sel!(Combobox),
            TokenKind::Radio => sel!(Radio),
            TokenKind::Role => sel!(Role),
            TokenKind::Label => sel!(Label),
            TokenKind::Placeholder => sel!(Placeholder),
            TokenKind::Testid => sel!(Testid),
            TokenKind::Text => sel!(Text),
            TokenKind::Alt => sel!(Alt),
            TokenKind::Title => sel!(Title),
            TokenKind::Css => sel!(Css),
            TokenKind::Xpath => sel!(Xpath),
            _ => {
                self.error_unexpected("a selector keyword (BUTTON, TEXTBOX, LINK, ...)");
                Err(())
            }
        }
    }

    fn parse_action(&mut self) -> PResult<Action> {
        let start = self.span();
        let name = self.expect_ident()?;
        let mut parameters = Vec::new();
        if self.matches(&TokenKind::LParen) {
            if !self.check(&TokenKind::RParen) {
                loop {
                    parameters.push(self.expect_ident()?);
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "`)`")?;
        }
        self.expect(TokenKind::LBrace, "`{`")?;
        let statements = self.parse_statement_list()?;
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Action {
            name,
            parameters,
            statements,
            span: start.merge(end),
        })
    }

    fn parse_page_actions_decl(&mut self) -> PResult<PageActions> {
        let start = self.span();
        self.advance(); // PAGEACTIONS
        let name = self.expect_ident()?;
        self.expect(TokenKind::For, "FOR")?;
        let for_page = self.expect_ident()?;
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut actions = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            if let Ok(a) = self.parse_action() {
                actions.push(a);
            } else {
                self.recover_block();
            }
        }
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(PageActions {
            name,
            for_page,
            actions,
            span: start.merge(end),
        })
    }

    // ── Feature / Scenario ──────────────────────────────────────────────

    fn parse_feature_decl(&mut self) -> PResult<Feature> {
        let start = self.span();
        self.advance(); // FEATURE
        let name = self.expect_feature_name()?;
        self.expect(TokenKind::LBrace, "`{`")?;

        let mut uses = Vec::new();
        let mut hooks = Vec::new();
        let mut scenarios = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            match self.peek_kind() {
                TokenKind::Use => {
                    if let Ok(u) = self.parse_use() {
                        uses.push(u);
                    } else {
                        self.recover_block();
                    }
                }
                TokenKind::Before | TokenKind::After => {
                    if let Ok(h) = self.parse_hook() {
                        hooks.push(h);
                    } else {
                        self.recover_block();
                    }
                }
                TokenKind::At | TokenKind::Scenario => {
                    if let Ok(s) = self.parse_scenario() {
                        scenarios.push(s);
                    } else {
                        self.recover_block();
                    }
                }
                _ => {
                    self.error_unexpected("USE, BEFORE, AFTER, SCENARIO, or `@tag`");
                    self.recover_block();
                }
            }
        }
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Feature {
            name,
            uses,
            hooks,
            scenarios,
            span: start.merge(end),
        })
    }

    /// `FEATURE name` — name may be a bare identifier sequence or a quoted
    /// string (spec §9 open question "quoted vs bare names"): both forms are
    /// accepted, joined with spaces if bare.
    fn expect_feature_name(&mut self) -> PResult<String> {
        if let TokenKind::StringLit(_) = self.peek_kind() {
            return self.expect_string();
        }
        let mut parts = vec![self.expect_ident()?];
        while let TokenKind::Ident(_) = self.peek_kind() {
            parts.push(self.expect_ident()?);
        }
        Ok(parts.join(" "))
    }

    fn parse_use(&mut self) -> PResult<UseRef> {
        let start = self.span();
        self.advance(); // USE
        let name = self.expect_ident()?;
        Ok(UseRef {
            name,
            span: start.merge(self.span()),
        })
    }

    fn parse_hook(&mut self) -> PResult<Hook> {
        let start = self.span();
        let leading = self.advance(); // BEFORE | AFTER
        let all_or_each = self.advance(); // ALL | EACH
        let hook_type = match (&leading.kind, &all_or_each.kind) {
            (TokenKind::Before, TokenKind::All) => HookType::BeforeAll,
            (TokenKind::Before, TokenKind::Each) => HookType::BeforeEach,
            (TokenKind::After, TokenKind::All) => HookType::AfterAll,
            (TokenKind::After, TokenKind::Each) => HookType::AfterEach,
            _ => {
                self.errors.push(ParseError::UnexpectedToken {
                    expected: "ALL or EACH".to_string(),
                    got: format!("{}", all_or_each.kind),
                    span: all_or_each.span,
                });
                return Err(());
            }
        };
        self.expect(TokenKind::LBrace, "`{`")?;
        let statements = self.parse_statement_list()?;
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Hook {
            hook_type,
            statements,
            span: start.merge(end),
        })
    }

    fn parse_scenario(&mut self) -> PResult<Scenario> {
        let start = self.span();
        let mut tags = Vec::new();
        while self.matches(&TokenKind::At) {
            tags.push(self.expect_ident()?);
        }
        self.expect(TokenKind::Scenario, "SCENARIO")?;
        let name = if let TokenKind::StringLit(_) = self.peek_kind() {
            self.expect_string()?
        } else {
            let mut parts = vec![self.expect_ident()?];
            while let TokenKind::Ident(_) = self.peek_kind() {
                parts.push(self.expect_ident()?);
            }
            parts.join(" ")
        };

        let mut annotations = Vec::new();
        loop {
            let ann = match self.peek_kind() {
                TokenKind::Skip => Some(Annotation::Skip),
                TokenKind::Only => Some(Annotation::Only),
                TokenKind::Slow => Some(Annotation::Slow),
                TokenKind::Fixme => Some(Annotation::Fixme),
                TokenKind::Serial => Some(Annotation::Serial),
                _ => None,
            };
            match ann {
                Some(a) => {
                    self.advance();
                    annotations.push(a);
                }
                None => break,
            }
        }

        self.expect(TokenKind::LBrace, "`{`")?;
        let statements = self.parse_statement_list()?;
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Scenario {
            name,
            tags,
            annotations,
            statements,
            span: start.merge(end),
        })
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn parse_statement_list(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            match self.parse_statement() {
                Ok(s) => stmts.push(s),
                Err(()) => self.recover_block(),
            }
        }
        Ok(stmts)
    }

    fn parse_target(&mut self) -> PResult<Target> {
        let start = self.span();
        let page = self.expect_ident()?;
        self.expect(TokenKind::Dot, "`.`")?;
        let field = self.expect_ident()?;
        let end = self.span();
        Ok(Target {
            page,
            field,
            span: start.merge(end),
        })
    }

    fn parse_action_ref(&mut self) -> PResult<ActionRef> {
        let start = self.span();
        let container = self.expect_ident()?;
        self.expect(TokenKind::Dot, "`.`")?;
        let action = self.expect_ident()?;
        let end = self.span();
        Ok(ActionRef {
            container,
            action,
            span: start.merge(end),
        })
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let start = self.span();
        match self.peek_kind().clone() {
            TokenKind::Click => {
                self.advance();
                let t = self.parse_target()?;
                Ok(Stmt::Click(t, start.merge(self.prev_span())))
            }
            TokenKind::Fill => {
                self.advance();
                let t = self.parse_target()?;
                self.expect(TokenKind::With, "WITH")?;
                let e = self.parse_expr()?;
                Ok(Stmt::Fill(t, e, start.merge(self.prev_span())))
            }
            TokenKind::Open => {
                self.advance();
                let e = self.parse_expr()?;
                if self.matches(&TokenKind::In) {
                    self.expect(TokenKind::New, "NEW")?;
                    self.expect(TokenKind::Tab, "TAB")?;
                    return Ok(Stmt::OpenInNewTab(e, start.merge(self.prev_span())));
                }
                Ok(Stmt::Open(e, start.merge(self.prev_span())))
            }
            TokenKind::Check => {
                self.advance();
                let t = self.parse_target()?;
                Ok(Stmt::Check(t, start.merge(self.prev_span())))
            }
            TokenKind::Uncheck => {
                self.advance();
                let t = self.parse_target()?;
                Ok(Stmt::Uncheck(t, start.merge(self.prev_span())))
            }
            TokenKind::Select => {
                self.advance();
                let t = self.parse_target()?;
                self.expect(TokenKind::With, "WITH")?;
                let e = self.parse_expr()?;
                Ok(Stmt::Select(t, e, start.merge(self.prev_span())))
            }
            TokenKind::Hover => {
                self.advance();
                let t = self.parse_target()?;
                Ok(Stmt::Hover(t, start.merge(self.prev_span())))
            }
            TokenKind::Press => {
                self.advance();
                let e = self.parse_expr()?;
                Ok(Stmt::Press(e, start.merge(self.prev_span())))
            }
            TokenKind::Scroll => {
                self.advance();
                let t = self.parse_target()?;
                Ok(Stmt::Scroll(t, start.merge(self.prev_span())))
            }
            TokenKind::Wait => {
                self.advance();
                let e = self.parse_expr()?;
                let unit = match self.peek_kind() {
                    TokenKind::Seconds => {
                        self.advance();
                        WaitUnit::Seconds
                    }
                    TokenKind::Milliseconds => {
                        self.advance();
                        WaitUnit::Milliseconds
                    }
                    _ => {
                        self.error_unexpected("SECONDS or MILLISECONDS");
                        return Err(());
                    }
                };
                Ok(Stmt::Wait(e, unit, start.merge(self.prev_span())))
            }
            TokenKind::Refresh => {
                self.advance();
                Ok(Stmt::Refresh(start))
            }
            TokenKind::Clear => {
                self.advance();
                let t = self.parse_target()?;
                Ok(Stmt::Clear(t, start.merge(self.prev_span())))
            }
            TokenKind::Upload => {
                self.advance();
                let t = self.parse_target()?;
                self.expect(TokenKind::With, "WITH")?;
                let e = self.parse_expr()?;
                Ok(Stmt::Upload(t, e, start.merge(self.prev_span())))
            }
            TokenKind::Drag => {
                self.advance();
                let from = self.parse_target()?;
                // "TO" is a plain identifier in our token set (not a
                // reserved keyword); accept and discard it unconditionally.
                self.advance();
                let to = self.parse_target()?;
                Ok(Stmt::Drag(from, to, start.merge(self.prev_span())))
            }
            TokenKind::Log => {
                self.advance();
                let e = self.parse_expr()?;
                Ok(Stmt::Log(e, start.merge(self.prev_span())))
            }
            TokenKind::Screenshot => {
                self.advance();
                let e = self.parse_expr()?;
                Ok(Stmt::Screenshot(e, start.merge(self.prev_span())))
            }
            TokenKind::Perform => {
                self.advance();
                let r = self.parse_action_ref()?;
                let mut args = Vec::new();
                if self.matches(&TokenKind::With) {
                    loop {
                        args.push(self.parse_expr()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                Ok(Stmt::Perform(r, args, start.merge(self.prev_span())))
            }
            TokenKind::Return => {
                self.advance();
                if matches!(
                    self.peek_kind(),
                    TokenKind::RBrace | TokenKind::Eof
                ) {
                    return Ok(Stmt::Return(None, start));
                }
                let e = self.parse_expr()?;
                Ok(Stmt::Return(Some(e), start.merge(self.prev_span())))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::For => self.parse_for_each(),
            TokenKind::Load => self.parse_load(),
            TokenKind::Row | TokenKind::Rows | TokenKind::Number | TokenKind::Data
            | TokenKind::List | TokenKind::Flag
                if self.is_data_query_start() =>
            {
                self.parse_data_query_statement()
            }
            TokenKind::Try => self.parse_try_catch(),
            TokenKind::Api => self.parse_api_request(),
            TokenKind::Verify => self.parse_verify_like(),
            TokenKind::Mock => self.parse_mock_api(),
            TokenKind::Switch => self.parse_switch_tab(),
            TokenKind::Close => {
                self.advance();
                self.expect(TokenKind::Tab, "TAB")?;
                Ok(Stmt::CloseTab(start.merge(self.prev_span())))
            }
            _ => {
                self.error_unexpected("a statement");
                Err(())
            }
        }
    }

    fn prev_span(&self) -> Span {
        let idx = self.pos.saturating_sub(1);
        self.tokens.get(idx).map(|t| t.span).unwrap_or(self.span())
    }

    fn is_data_query_start(&self) -> bool {
        // ROW/ROWS always start a query; NUMBER/DATA/LIST/FLAG only do when
        // followed by `ident =` (disambiguates from other potential future
        // uses of those keywords).
        match self.peek_kind() {
            TokenKind::Row | TokenKind::Rows => true,
            TokenKind::Number | TokenKind::Data | TokenKind::List | TokenKind::Flag => {
                matches!(self.peek_n(1), TokenKind::Ident(_))
                    && matches!(self.peek_n(2), TokenKind::Assign)
            }
            _ => false,
        }
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // IF
        let condition = self.parse_expr()?;
        self.expect(TokenKind::LBrace, "`{`")?;
        let then_body = self.parse_statement_list()?;
        self.expect(TokenKind::RBrace, "`}`")?;
        let else_body = if self.matches(&TokenKind::Else) {
            self.expect(TokenKind::LBrace, "`{`")?;
            let body = self.parse_statement_list()?;
            self.expect(TokenKind::RBrace, "`}`")?;
            Some(body)
        } else {
            None
        };
        let end = self.prev_span();
        Ok(Stmt::If(IfStmt {
            condition,
            then_body,
            else_body,
            span: start.merge(end),
        }))
    }

    fn parse_repeat(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // REPEAT
        let times = self.parse_expr()?;
        self.expect(TokenKind::Times, "TIMES")?;
        self.expect(TokenKind::LBrace, "`{`")?;
        let body = self.parse_statement_list()?;
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Stmt::Repeat(Box::new(RepeatStmt {
            times,
            body,
            span: start.merge(end),
        })))
    }

    fn parse_for_each(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // FOR
        self.expect(TokenKind::Each, "EACH")?;
        let item_variable = self.expect_ident()?;
        self.expect(TokenKind::In, "IN")?;
        let collection_variable = self.expect_ident()?;
        self.expect(TokenKind::LBrace, "`{`")?;
        let statements = self.parse_statement_list()?;
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Stmt::ForEach(Box::new(ForEachStmt {
            item_variable,
            collection_variable,
            statements,
            span: start.merge(end),
        })))
    }

    fn parse_load(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // LOAD
        let variable_name = self.expect_ident()?;
        self.expect(TokenKind::From, "FROM")?;
        let table_name = self.expect_string()?;
        let end = self.prev_span();
        Ok(Stmt::Load(LoadStmt {
            variable_name,
            table_name,
            span: start.merge(end),
        }))
    }

    // ── VDQL ─────────────────────────────────────────────────────────────

    fn parse_data_query_statement(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let (result_type, leading_is_row_rows) = match self.peek_kind() {
            TokenKind::Row => (ResultType::Data, true),
            TokenKind::Rows => (ResultType::List, true),
            TokenKind::Number => (ResultType::Number, false),
            TokenKind::Data => (ResultType::Data, false),
            TokenKind::List => (ResultType::List, false),
            TokenKind::Flag => (ResultType::Flag, false),
            _ => unreachable!(),
        };
        self.advance();
        let variable_name = self.expect_ident()?;

        if leading_is_row_rows {
            self.matches(&TokenKind::From);
            self.matches(&TokenKind::Assign);
        } else {
            self.expect(TokenKind::Assign, "`=`")?;
        }

        let position = match self.peek_kind() {
            TokenKind::First => {
                self.advance();
                Some(Position::First)
            }
            TokenKind::Last => {
                self.advance();
                Some(Position::Last)
            }
            TokenKind::Random => {
                self.advance();
                Some(Position::Random)
            }
            _ => None,
        };

        // Aggregation form: `NUMBER n = COUNT table [WHERE cond]`.
        if let Some(func) = self.peek_aggregation_function() {
            self.advance();
            let distinct = self.matches(&TokenKind::Distinct);
            let column = if self.matches(&TokenKind::LParen) {
                let c = self.expect_ident()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Some(c)
            } else {
                None
            };
            let table_ref = self.parse_table_ref()?;
            let where_clause = self.parse_optional_where()?;
            let end = self.prev_span();
            return Ok(Stmt::DataQuery(DataQueryStatement {
                result_type,
                variable_name,
                query: DataQuery::Aggregation(AggregationQuery {
                    table_ref,
                    function: func,
                    column,
                    where_clause,
                    distinct,
                }),
                span: start.merge(end),
            }));
        }

        let table_ref = self.parse_table_ref()?;
        let columns = table_ref.columns.clone();
        let where_clause = self.parse_optional_where()?;
        let order_by = self.parse_optional_order_by()?;
        let limit = self.parse_optional_prefixed_number(&TokenKind::Limit)?;
        let offset = self.parse_optional_prefixed_number(&TokenKind::Offset)?;
        let default_value = if self.matches(&TokenKind::Default) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = self.prev_span();
        Ok(Stmt::DataQuery(DataQueryStatement {
            result_type,
            variable_name,
            query: DataQuery::Table(TableQuery {
                table_ref,
                columns,
                where_clause,
                order_by,
                limit,
                offset,
                position,
                default_value,
            }),
            span: start.merge(end),
        }))
    }

    fn peek_aggregation_function(&self) -> Option<AggregationFunction> {
        match self.peek_kind() {
            TokenKind::Count => Some(AggregationFunction::Count),
            TokenKind::Sum => Some(AggregationFunction::Sum),
            TokenKind::Average => Some(AggregationFunction::Average),
            TokenKind::Min => Some(AggregationFunction::Min),
            TokenKind::Max => Some(AggregationFunction::Max),
            TokenKind::Distinct => Some(AggregationFunction::Distinct),
            TokenKind::Rows => Some(AggregationFunction::Rows),
            TokenKind::Columns => Some(AggregationFunction::Columns),
            TokenKind::Headers => Some(AggregationFunction::Headers),
            _ => None,
        }
    }

    /// `Table` or `Project.Table`, optionally suffixed `[i]`, `[i..j]`,
    /// `[i,j]`, or `(col[, col2, ...])`.
    fn parse_table_ref(&mut self) -> PResult<TableRef> {
        let start = self.span();
        let first = self.expect_ident()?;
        let (project, table_name) = if self.matches(&TokenKind::Dot) {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };

        let mut row_index = None;
        let mut range = None;
        let mut cell = None;
        if self.matches(&TokenKind::LBracket) {
            let a = self.expect_number()?;
            match self.peek_kind() {
                TokenKind::DotDot => {
                    self.advance();
                    let b = self.expect_number()?;
                    range = Some((a as i64, b as i64));
                }
                TokenKind::Comma => {
                    self.advance();
                    let b = self.expect_number()?;
                    cell = Some((a as i64, b as i64));
                }
                _ => row_index = Some(a as i64),
            }
            self.expect(TokenKind::RBracket, "`]`")?;
        }

        let mut columns = None;
        let mut column = None;
        if self.matches(&TokenKind::LParen) {
            let mut cols = vec![self.expect_ident()?];
            while self.matches(&TokenKind::Comma) {
                cols.push(self.expect_ident()?);
            }
            self.expect(TokenKind::RParen, "`)`")?;
            if cols.len() == 1 {
                column = Some(cols[0].clone());
            }
            columns = Some(cols);
        }

        let end = self.prev_span();
        Ok(TableRef {
            project,
            table_name,
            column,
            row_index,
            range,
            cell,
            columns,
            span: start.merge(end),
        })
    }

    fn expect_number(&mut self) -> PResult<f64> {
        match self.peek_kind().clone() {
            TokenKind::NumberLit(n) => {
                self.advance();
                Ok(n)
            }
            _ => {
                self.error_unexpected("number literal");
                Err(())
            }
        }
    }

    fn parse_optional_where(&mut self) -> PResult<Option<DataCondition>> {
        if self.matches(&TokenKind::Where) {
            Ok(Some(self.parse_data_condition_or()?))
        } else {
            Ok(None)
        }
    }

    fn parse_optional_order_by(&mut self) -> PResult<Vec<(String, SortDirection)>> {
        let mut specs = Vec::new();
        if self.matches(&TokenKind::Order) {
            self.expect(TokenKind::By, "BY")?;
            loop {
                let col = self.expect_ident()?;
                let dir = match self.peek_kind() {
                    TokenKind::Asc => {
                        self.advance();
                        SortDirection::Asc
                    }
                    TokenKind::Desc => {
                        self.advance();
                        SortDirection::Desc
                    }
                    _ => SortDirection::Asc,
                };
                specs.push((col, dir));
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(specs)
    }

    fn parse_optional_prefixed_number(&mut self, kw: &TokenKind) -> PResult<Option<i64>> {
        if self.matches(kw) {
            Ok(Some(self.expect_number()? as i64))
        } else {
            Ok(None)
        }
    }

    // `cond := or`, `or := and (OR and)*`, `and := not (AND not)*`,
    // `not := [NOT] primary`, `primary := '(' cond ')' | comparison`.
    fn parse_data_condition_or(&mut self) -> PResult<DataCondition> {
        let mut lhs = self.parse_data_condition_and()?;
        while self.matches(&TokenKind::Or) {
            let rhs = self.parse_data_condition_and()?;
            lhs = DataCondition::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_data_condition_and(&mut self) -> PResult<DataCondition> {
        let mut lhs = self.parse_data_condition_not()?;
        while self.matches(&TokenKind::And) {
            let rhs = self.parse_data_condition_not()?;
            lhs = DataCondition::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_data_condition_not(&mut self) -> PResult<DataCondition> {
        if self.matches(&TokenKind::Not) {
            let inner = self.parse_data_condition_primary()?;
            Ok(DataCondition::Not(Box::new(inner)))
        } else {
            self.parse_data_condition_primary()
        }
    }

    fn parse_data_condition_primary(&mut self) -> PResult<DataCondition> {
        if self.matches(&TokenKind::LParen) {
            let inner = self.parse_data_condition_or()?;
            self.expect(TokenKind::RParen, "`)`")?;
            return Ok(inner);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PResult<DataCondition> {
        let column = self.expect_ident()?;
        let (operator, unary) = match self.peek_kind().clone() {
            TokenKind::Eq => (ComparisonOp::Eq, false),
            TokenKind::NotEq => (ComparisonOp::NotEq, false),
            TokenKind::Gt => (ComparisonOp::Gt, false),
            TokenKind::Lt => (ComparisonOp::Lt, false),
            TokenKind::GtEq => (ComparisonOp::GtEq, false),
            TokenKind::LtEq => (ComparisonOp::LtEq, false),
            TokenKind::Contains => (ComparisonOp::Contains, false),
            TokenKind::Starts => {
                self.advance();
                self.expect(TokenKind::With, "WITH")?;
                return self.finish_comparison(column, ComparisonOp::StartsWith, false);
            }
            TokenKind::Ends => {
                self.advance();
                self.expect(TokenKind::With, "WITH")?;
                return self.finish_comparison(column, ComparisonOp::EndsWith, false);
            }
            TokenKind::Matches => (ComparisonOp::Matches, false),
            TokenKind::In => (ComparisonOp::In, false),
            TokenKind::Not if matches!(self.peek_n(1), TokenKind::In) => {
                self.advance();
                self.advance();
                return self.finish_comparison(column, ComparisonOp::NotIn, false);
            }
            TokenKind::Is => {
                self.advance();
                if self.matches(&TokenKind::NullLit) {
                    return Ok(DataCondition::Comparison(Comparison {
                        column,
                        operator: ComparisonOp::IsNull,
                        value: None,
                        values: None,
                    }));
                }
                let negated = self.matches(&TokenKind::Not);
                self.expect(TokenKind::Empty, "EMPTY or NULL")?;
                let op = if negated {
                    ComparisonOp::IsNotEmpty
                } else {
                    ComparisonOp::IsEmpty
                };
                return Ok(DataCondition::Comparison(Comparison {
                    column,
                    operator: op,
                    value: None,
                    values: None,
                }));
            }
            _ => {
                self.error_unexpected("a comparison operator");
                return Err(());
            }
        };
        self.advance();
        self.finish_comparison(column, operator, unary)
    }

    fn finish_comparison(
        &mut self,
        column: String,
        operator: ComparisonOp,
        unary: bool,
    ) -> PResult<DataCondition> {
        if unary || matches!(operator, ComparisonOp::IsNull | ComparisonOp::IsEmpty | ComparisonOp::IsNotEmpty) {
            return Ok(DataCondition::Comparison(Comparison {
                column,
                operator,
                value: None,
                values: None,
            }));
        }
        if matches!(operator, ComparisonOp::In | ComparisonOp::NotIn) {
            self.expect(TokenKind::LBracket, "`[`")?;
            let mut values = Vec::new();
            if !self.check(&TokenKind::RBracket) {
                loop {
                    values.push(self.parse_expr()?);
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RBracket, "`]`")?;
            return Ok(DataCondition::Comparison(Comparison {
                column,
                operator,
                value: None,
                values: Some(values),
            }));
        }
        let value = self.parse_expr()?;
        Ok(DataCondition::Comparison(Comparison {
            column,
            operator,
            value: Some(value),
            values: None,
        }))
    }

    // ── TRY/CATCH, API, VERIFY, MOCK ─────────────────────────────────────

    fn parse_try_catch(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // TRY
        self.expect(TokenKind::LBrace, "`{`")?;
        let try_body = self.parse_statement_list()?;
        self.expect(TokenKind::RBrace, "`}`")?;
        self.expect(TokenKind::Catch, "CATCH")?;
        self.expect(TokenKind::LBrace, "`{`")?;
        let catch_body = self.parse_statement_list()?;
        let end = self.span();
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Stmt::TryCatch(Box::new(TryCatchStmt {
            try_body,
            catch_body,
            span: start.merge(end),
        })))
    }

    fn parse_api_request(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // API
        self.expect(TokenKind::Request, "REQUEST")?;
        let method = match self.peek_kind() {
            TokenKind::Get => HttpMethod::Get,
            TokenKind::Post => HttpMethod::Post,
            TokenKind::Put => HttpMethod::Put,
            TokenKind::Delete => HttpMethod::Delete,
            TokenKind::Patch => HttpMethod::Patch,
            _ => {
                self.error_unexpected("GET, POST, PUT, DELETE, or PATCH");
                return Err(());
            }
        };
        self.advance();
        let url = self.parse_expr()?;
        let mut body = None;
        let mut headers = None;
        if self.matches(&TokenKind::With) {
            loop {
                match self.peek_kind() {
                    TokenKind::Body => {
                        self.advance();
                        body = Some(self.parse_expr()?);
                    }
                    TokenKind::Headers => {
                        self.advance();
                        self.expect(TokenKind::LBrace, "`{`")?;
                        let mut hs = Vec::new();
                        if !self.check(&TokenKind::RBrace) {
                            loop {
                                let key = self.expect_string().or_else(|_| self.expect_ident())?;
                                self.expect(TokenKind::Assign, "`=`")?;
                                let val = self.parse_expr()?;
                                hs.push((key, val));
                                if !self.matches(&TokenKind::Comma) {
                                    break;
                                }
                            }
                        }
                        self.expect(TokenKind::RBrace, "`}`")?;
                        headers = Some(hs);
                    }
                    _ => break,
                }
                if !self.matches(&TokenKind::And) {
                    break;
                }
            }
        }
        let end = self.prev_span();
        Ok(Stmt::ApiRequest(ApiRequestStmt {
            method,
            url,
            body,
            headers,
            span: start.merge(end),
        }))
    }

    /// Dispatches `VERIFY` to one of: field condition, response assertion,
    /// or screenshot comparison, per the leading tokens after `VERIFY`.
    fn parse_verify_like(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // VERIFY
        match self.peek_kind().clone() {
            TokenKind::Response => {
                self.advance();
                let part = match self.peek_kind() {
                    TokenKind::Status => ResponsePart::Status,
                    TokenKind::Body => ResponsePart::Body,
                    TokenKind::Headers => ResponsePart::Headers,
                    _ => {
                        self.error_unexpected("STATUS, BODY, or HEADERS");
                        return Err(());
                    }
                };
                self.advance();
                let condition = self.parse_response_condition(part)?;
                let end = self.prev_span();
                Ok(Stmt::VerifyResponse(VerifyResponseStmt {
                    part,
                    condition,
                    span: start.merge(end),
                }))
            }
            TokenKind::Screenshot => {
                self.advance();
                let name = self.parse_expr()?;
                self.expect(TokenKind::With, "WITH")?;
                let tolerance = self.parse_screenshot_tolerance()?;
                let end = self.prev_span();
                Ok(Stmt::VerifyScreenshot(VerifyScreenshotStmt {
                    name,
                    tolerance,
                    span: start.merge(end),
                }))
            }
            _ => {
                let target = self.parse_target()?;
                self.expect(TokenKind::Is, "IS")?;
                let negated = self.matches(&TokenKind::Not);
                let condition = self.parse_condition()?;
                let end = self.prev_span();
                Ok(Stmt::Verify(VerifyStmt {
                    target,
                    negated,
                    condition,
                    span: start.merge(end),
                }))
            }
        }
    }

    fn parse_response_condition(&mut self, part: ResponsePart) -> PResult<Condition> {
        match part {
            ResponsePart::Status => {
                self.expect(TokenKind::Is, "IS")?;
                let e = self.parse_expr()?;
                Ok(Condition::StatusEquals(e))
            }
            ResponsePart::Body => {
                self.expect(TokenKind::Contains, "CONTAINS")?;
                let e = self.parse_expr()?;
                Ok(Condition::BodyContains(e))
            }
            ResponsePart::Headers => {
                let key = self.expect_string().or_else(|_| self.expect_ident())?;
                self.expect(TokenKind::Is, "IS")?;
                let e = self.parse_expr()?;
                Ok(Condition::HeaderEquals(key, e))
            }
        }
    }

    fn parse_condition(&mut self) -> PResult<Condition> {
        match self.peek_kind().clone() {
            TokenKind::Visible => {
                self.advance();
                Ok(Condition::Visible)
            }
            TokenKind::Hidden => {
                self.advance();
                Ok(Condition::Hidden)
            }
            TokenKind::Enabled => {
                self.advance();
                Ok(Condition::Enabled)
            }
            TokenKind::Disabled => {
                self.advance();
                Ok(Condition::Disabled)
            }
            TokenKind::Checked => {
                self.advance();
                Ok(Condition::Checked)
            }
            TokenKind::Focused => {
                self.advance();
                Ok(Condition::Focused)
            }
            TokenKind::Empty => {
                self.advance();
                Ok(Condition::Empty)
            }
            TokenKind::Has => {
                self.advance();
                match self.peek_kind().clone() {
                    TokenKind::Text => {
                        self.advance();
                        Ok(Condition::HasText(self.parse_expr()?))
                    }
                    TokenKind::Class => {
                        self.advance();
                        Ok(Condition::HasClass(self.parse_expr()?))
                    }
                    TokenKind::Value => {
                        self.advance();
                        Ok(Condition::HasValue(self.parse_expr()?))
                    }
                    TokenKind::Count => {
                        self.advance();
                        Ok(Condition::HasCount(self.parse_expr()?))
                    }
                    _ => {
                        self.error_unexpected("TEXT, CLASS, VALUE, or COUNT");
                        Err(())
                    }
                }
            }
            TokenKind::Contains => {
                self.advance();
                Ok(Condition::Contains(self.parse_expr()?))
            }
            TokenKind::Url => {
                self.advance();
                match self.peek_kind().clone() {
                    TokenKind::Contains => {
                        self.advance();
                        Ok(Condition::UrlContains(self.parse_expr()?))
                    }
                    _ => {
                        self.matches(&TokenKind::Eq);
                        Ok(Condition::UrlEquals(self.parse_expr()?))
                    }
                }
            }
            TokenKind::Title => {
                self.advance();
                match self.peek_kind().clone() {
                    TokenKind::Contains => {
                        self.advance();
                        Ok(Condition::TitleContains(self.parse_expr()?))
                    }
                    _ => {
                        self.matches(&TokenKind::Eq);
                        Ok(Condition::TitleEquals(self.parse_expr()?))
                    }
                }
            }
            _ => {
                self.error_unexpected(
                    "VISIBLE, HIDDEN, ENABLED, DISABLED, CHECKED, FOCUSED, EMPTY, HAS ..., CONTAINS, URL, or TITLE",
                );
                Err(())
            }
        }
    }

    fn parse_screenshot_tolerance(&mut self) -> PResult<ScreenshotTolerance> {
        let preset = match self.peek_kind() {
            TokenKind::Strict => TolerancePreset::Strict,
            TokenKind::Balanced => TolerancePreset::Balanced,
            TokenKind::Relaxed => TolerancePreset::Relaxed,
            _ => {
                self.error_unexpected("STRICT, BALANCED, or RELAXED");
                return Err(());
            }
        };
        self.advance();
        let mut threshold = None;
        let mut max_diff_pixels = None;
        let mut max_diff_ratio = None;
        loop {
            match self.peek_kind() {
                TokenKind::Threshold => {
                    self.advance();
                    threshold = Some(self.expect_number()?);
                }
                TokenKind::MaxDiffPixels => {
                    self.advance();
                    max_diff_pixels = Some(self.expect_number()? as i64);
                }
                TokenKind::MaxDiffRatio => {
                    self.advance();
                    max_diff_ratio = Some(self.expect_number()?);
                }
                _ => break,
            }
        }
        Ok(ScreenshotTolerance {
            preset,
            threshold,
            max_diff_pixels,
            max_diff_ratio,
        })
    }

    fn parse_mock_api(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // MOCK
        self.expect(TokenKind::Api, "API")?;
        let url = self.parse_expr()?;
        self.expect(TokenKind::With, "WITH")?;
        self.expect(TokenKind::Status, "STATUS")?;
        let status = self.expect_number()? as i64;
        let mut body = None;
        if self.matches(&TokenKind::And) {
            self.expect(TokenKind::Body, "BODY")?;
            body = Some(self.parse_expr()?);
        }
        let end = self.prev_span();
        Ok(Stmt::MockApi(MockApiStmt {
            url,
            status,
            body,
            span: start.merge(end),
        }))
    }

    // ── Tab operations ───────────────────────────────────────────────────

    fn parse_switch_tab(&mut self) -> PResult<Stmt> {
        let start = self.span();
        self.advance(); // SWITCH
        // "TO" is a plain identifier in our token set; accept and discard.
        self.advance();
        match self.peek_kind().clone() {
            TokenKind::New => {
                self.advance();
                self.expect(TokenKind::Tab, "TAB")?;
                let url = if let TokenKind::StringLit(_) = self.peek_kind() {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Ok(Stmt::SwitchToNewTab(url, start.merge(self.prev_span())))
            }
            TokenKind::NumberLit(_) => {
                let e = self.parse_expr()?;
                Ok(Stmt::SwitchToTab(e, start.merge(self.prev_span())))
            }
            _ => {
                self.errors.push(ParseError::UnknownTabForm { span: self.span() });
                Err(())
            }
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let kind = self.peek_kind().clone();
        let mut expr = match kind {
            TokenKind::StringLit(s) => {
                self.advance();
                Expr::StringLit(s, start)
            }
            TokenKind::NumberLit(n) => {
                self.advance();
                Expr::NumberLit(n, start)
            }
            TokenKind::BoolLit(b) => {
                self.advance();
                Expr::BooleanLit(b, start)
            }
            TokenKind::NullLit => {
                self.advance();
                Expr::NullLit(start)
            }
            TokenKind::EnvVarRef(name) => {
                self.advance();
                Expr::EnvVarReference { name, span: start }
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expr()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.span();
                self.expect(TokenKind::RBracket, "`]`")?;
                Expr::ArrayLiteral(items, start.merge(end))
            }
            TokenKind::Uppercase | TokenKind::Lowercase | TokenKind::Trim | TokenKind::Length => {
                let tk = self.transform_kind_of(&kind);
                self.advance();
                let arg = self.parse_expr()?;
                let end = arg.span();
                Expr::Transform {
                    kind: tk,
                    argument: Box::new(arg),
                    span: start.merge(end),
                }
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.matches(&TokenKind::Dot) {
                    let field = self.expect_ident()?;
                    let end = self.prev_span();
                    Expr::VariableReference {
                        name: field,
                        page: Some(name),
                        span: start.merge(end),
                    }
                } else {
                    Expr::VariableReference {
                        name,
                        page: None,
                        span: start,
                    }
                }
            }
            _ => {
                self.error_unexpected("an expression");
                return Err(());
            }
        };

        while self.matches(&TokenKind::Dot) {
            let member = self.expect_ident()?;
            let end = self.prev_span();
            expr = Expr::MemberAccess {
                object: Box::new(expr),
                member,
                span: start.merge(end),
            };
        }
        Ok(expr)
    }

    fn transform_kind_of(&self, kind: &TokenKind) -> TransformKind {
        match kind {
            TokenKind::Uppercase => TransformKind::Uppercase,
            TokenKind::Lowercase => TransformKind::Lowercase,
            TokenKind::Trim => TransformKind::Trim,
            TokenKind::Length => TransformKind::Length,
            _ => unreachable!(),
        }
    }
}

fn is_statement_leader(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Click
            | TokenKind::Fill
            | TokenKind::Open
            | TokenKind::Check
            | TokenKind::Uncheck
            | TokenKind::Select
            | TokenKind::Hover
            | TokenKind::Press
            | TokenKind::Scroll
            | TokenKind::Wait
            | TokenKind::Refresh
            | TokenKind::Clear
            | TokenKind::Upload
            | TokenKind::Drag
            | TokenKind::Log
            | TokenKind::Screenshot
            | TokenKind::Perform
            | TokenKind::Return
            | TokenKind::If
            | TokenKind::Repeat
            | TokenKind::For
            | TokenKind::Load
            | TokenKind::Row
            | TokenKind::Rows
            | TokenKind::Try
            | TokenKind::Api
            | TokenKind::Verify
            | TokenKind::Mock
            | TokenKind::Switch
            | TokenKind::Close
    )
}

/// Convenience entry point mirroring spec's `parse(tokens) -> (Program, diagnostics)`.
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<ParseError>) {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::lex;

    fn parse_src(src: &str) -> (Program, Vec<ParseError>) {
        let (tokens, lex_errors) = lex(src);
        assert!(lex_errors.is_empty(), "unexpected lex errors: {:?}", lex_errors);
        parse(tokens)
    }

    #[test]
    fn parses_minimal_page() {
        let (program, errors) = parse_src(
            r#"
            PAGE LoginPage {
                FIELD emailInput = TEXTBOX "Email"
                FIELD submitButton = BUTTON "Submit"
            }
            "#,
        );
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(program.pages.len(), 1);
        assert_eq!(program.pages[0].fields.len(), 2);
    }

    #[test]
    fn parses_feature_with_scenario_and_click() {
        let (program, errors) = parse_src(
            r#"
            FEATURE Login {
                USE LoginPage
                SCENARIO "happy path" {
                    CLICK LoginPage.submitButton
                    VERIFY LoginPage.submitButton IS VISIBLE
                }
            }
            "#,
        );
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(program.features.len(), 1);
        assert_eq!(program.features[0].scenarios[0].statements.len(), 2);
    }

    #[test]
    fn parses_row_query_with_where_and_order() {
        let (program, errors) = parse_src(
            r#"
            FEATURE F {
                SCENARIO S {
                    ROW u FROM Users WHERE id == 1 AND active == true ORDER BY name DESC
                }
            }
            "#,
        );
        assert!(errors.is_empty(), "{:?}", errors);
        let stmt = &program.features[0].scenarios[0].statements[0];
        assert!(matches!(stmt, Stmt::DataQuery(_)));
    }

    #[test]
    fn recovers_from_unexpected_token_in_block() {
        let (program, errors) = parse_src(
            r#"
            FEATURE F {
                SCENARIO S {
                    %%% garbage
                    CLICK Foo.bar
                }
            }
            "#,
        );
        assert!(!errors.is_empty());
        assert_eq!(program.features[0].scenarios[0].statements.len(), 1);
    }

    #[test]
    fn parses_try_catch_and_mock_api() {
        let (program, errors) = parse_src(
            r#"
            FEATURE F {
                SCENARIO S {
                    MOCK API "https://api.example.com/users" WITH STATUS 200 AND BODY "[]"
                    TRY {
                        API REQUEST GET "https://api.example.com/users"
                    } CATCH {
                        LOG "failed"
                    }
                }
            }
            "#,
        );
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(program.features[0].scenarios[0].statements.len(), 2);
    }
}
