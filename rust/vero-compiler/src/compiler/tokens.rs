//! Token kinds produced by the lexer (spec §3.1).
//!
//! All keywords are matched case-insensitively by the lexer but the
//! `Token::lexeme` preserves the source's original case.

use serde::{Deserialize, Serialize};
use std::fmt;
use vero_core::Span;

/// The closed set of token kinds. Multi-word keyword phrases (`SWITCH TO NEW
/// TAB`, `ORDER BY`, `IS NOT EMPTY`, ...) are *not* single tokens — the lexer
/// emits the individual keywords and the parser recognizes the phrase (spec
/// §4.1 "Keyword ordering").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // ── Literals ──
    StringLit(String),
    NumberLit(f64),
    Ident(String),
    /// `{{name}}`
    EnvVarRef(String),
    BoolLit(bool),
    NullLit,

    // ── Structural keywords ──
    Page,
    PageActions,
    Feature,
    Scenario,
    Field,
    Use,
    Action,
    Before,
    After,
    All,
    Each,
    Fixture,
    Setup,
    Teardown,
    Depends,
    On,
    Variable,

    // ── Action keywords ──
    Click,
    Fill,
    Open,
    Check,
    Uncheck,
    Select,
    Hover,
    Press,
    Scroll,
    Wait,
    Perform,
    Refresh,
    Clear,
    Upload,
    Drag,
    Switch,
    New,
    Tab,
    Close,
    Log,
    Screenshot,
    Return,
    Seconds,
    Milliseconds,

    // ── Assertion keywords ──
    Verify,
    Url,
    Title,
    Has,
    Value,
    Attribute,
    Count,
    Element,
    Class,
    Strict,
    Balanced,
    Relaxed,
    Threshold,
    MaxDiffPixels,
    MaxDiffRatio,
    Matches,

    // ── Condition keywords ──
    Is,
    Not,
    Visible,
    Hidden,
    Enabled,
    Disabled,
    Checked,
    Focused,
    Contains,
    Empty,

    // ── Selector keywords ──
    Button,
    Textbox,
    Link,
    CheckboxSel,
    Heading,
    Combobox,
    Radio,
    Testid,
    Role,
    Label,
    Placeholder,
    Alt,
    Css,
    Xpath,
    Text,

    // ── Control flow ──
    If,
    Else,
    Repeat,
    Times,
    For,

    // ── VDQL keywords ──
    Load,
    Row,
    Rows,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    First,
    Last,
    Random,
    Distinct,
    In,
    Starts,
    Ends,
    With,
    From,
    Number,
    Data,
    List,
    Flag,
    And,
    Or,
    Default,

    // ── Aggregation function keywords ──
    Sum,
    Average,
    Min,
    Max,
    Headers,
    Columns,

    // ── Transform keywords ──
    Trim,
    Convert,
    Uppercase,
    Lowercase,
    Extract,
    Replace,
    Split,
    Join,
    Length,
    Pad,
    Today,
    Now,
    Add,
    Subtract,
    Day,
    Month,
    Year,
    Format,
    Round,
    Absolute,
    Currency,
    Percent,
    Generate,
    Uuid,

    // ── API / TRY / mock keywords ──
    Api,
    Request,
    Mock,
    Status,
    Body,
    Response,
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Try,
    Catch,

    // ── Scenario annotations ──
    Skip,
    Only,
    Slow,
    Fixme,
    Serial,

    // ── Operators ──
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // ── Punctuation ──
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Assign,
    Dot,
    DotDot,
    Comma,
    At,

    // ── Sentinels ──
    Comment,
    Eof,
    Unknown(char),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        match self {
            StringLit(s) => write!(f, "\"{}\"", s),
            NumberLit(n) => write!(f, "{}", n),
            Ident(s) => write!(f, "{}", s),
            EnvVarRef(s) => write!(f, "{{{{{}}}}}", s),
            BoolLit(b) => write!(f, "{}", b),
            NullLit => write!(f, "NULL"),
            Eq => write!(f, "=="),
            NotEq => write!(f, "!="),
            Lt => write!(f, "<"),
            LtEq => write!(f, "<="),
            Gt => write!(f, ">"),
            GtEq => write!(f, ">="),
            LBrace => write!(f, "{{"),
            RBrace => write!(f, "}}"),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            LBracket => write!(f, "["),
            RBracket => write!(f, "]"),
            Assign => write!(f, "="),
            Dot => write!(f, "."),
            DotDot => write!(f, ".."),
            Comma => write!(f, ","),
            At => write!(f, "@"),
            Comment => write!(f, "<comment>"),
            Eof => write!(f, "EOF"),
            Unknown(c) => write!(f, "{}", c),
            // Every remaining variant is a plain keyword; its Debug name
            // *is* its canonical uppercase spelling (Page, Click, Verify, ...).
            other => write!(f, "{}", format!("{:?}", other).to_uppercase()),
        }
    }
}

/// Lowercased-lexeme → keyword table. A plain `match`, not a lazily built
/// map: the keyword set is small and static, and this keeps lexing free of
/// any interior-mutability or one-time-init machinery.
pub fn lookup_keyword(lower: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match lower {
        "page" => Page,
        "pageactions" => PageActions,
        "feature" => Feature,
        "scenario" => Scenario,
        "field" => Field,
        "use" => Use,
        "action" => Action,
        "before" => Before,
        "after" => After,
        "all" => All,
        "each" => Each,
        "fixture" => Fixture,
        "setup" => Setup,
        "teardown" => Teardown,
        "depends" => Depends,
        "on" => On,
        "variable" => Variable,

        "click" => Click,
        "fill" => Fill,
        "open" => Open,
        "check" => Check,
        "uncheck" => Uncheck,
        "select" => Select,
        "hover" => Hover,
        "press" => Press,
        "scroll" => Scroll,
        "wait" => Wait,
        "perform" => Perform,
        "do" => Perform,
        "refresh" => Refresh,
        "clear" => Clear,
        "upload" => Upload,
        "drag" => Drag,
        "switch" => Switch,
        "new" => New,
        "tab" => Tab,
        "close" => Close,
        "log" => Log,
        "screenshot" => Screenshot,
        "return" => Return,
        "seconds" => Seconds,
        "milliseconds" => Milliseconds,

        "verify" => Verify,
        "url" => Url,
        "title" => Title,
        "has" => Has,
        "value" => Value,
        "attribute" => Attribute,
        "count" => Count,
        "element" => Element,
        "class" => Class,
        "strict" => Strict,
        "balanced" => Balanced,
        "relaxed" => Relaxed,
        "threshold" => Threshold,
        "max_diff_pixels" => MaxDiffPixels,
        "max_diff_ratio" => MaxDiffRatio,
        "matches" => Matches,

        "is" => Is,
        "not" => Not,
        "visible" => Visible,
        "hidden" => Hidden,
        "enabled" => Enabled,
        "disabled" => Disabled,
        "checked" => Checked,
        "focused" => Focused,
        "contains" => Contains,
        "empty" => Empty,

        "button" => Button,
        "textbox" => Textbox,
        "link" => Link,
        "checkbox" => CheckboxSel,
        "heading" => Heading,
        "combobox" => Combobox,
        "radio" => Radio,
        "testid" => Testid,
        "role" => Role,
        "label" => Label,
        "placeholder" => Placeholder,
        "alt" => Alt,
        "css" => Css,
        "xpath" => Xpath,
        "text" => Text,

        "if" => If,
        "else" => Else,
        "repeat" => Repeat,
        "times" => Times,
        "for" => For,

        "load" => Load,
        "row" => Row,
        "rows" => Rows,
        "where" => Where,
        "order" => Order,
        "by" => By,
        "asc" => Asc,
        "desc" => Desc,
        "limit" => Limit,
        "offset" => Offset,
        "first" => First,
        "last" => Last,
        "random" => Random,
        "distinct" => Distinct,
        "in" => In,
        "starts" => Starts,
        "ends" => Ends,
        "with" => With,
        "from" => From,
        "number" => Number,
        "data" => Data,
        "list" => List,
        "flag" => Flag,
        "and" => And,
        "or" => Or,
        "default" => Default,

        "sum" => Sum,
        "average" => Average,
        "min" => Min,
        "max" => Max,
        "headers" => Headers,
        "columns" => Columns,

        "trim" => Trim,
        "convert" => Convert,
        "uppercase" => Uppercase,
        "lowercase" => Lowercase,
        "extract" => Extract,
        "replace" => Replace,
        "split" => Split,
        "join" => Join,
        "length" => Length,
        "pad" => Pad,
        "today" => Today,
        "now" => Now,
        "add" => Add,
        "subtract" => Subtract,
        "day" => Day,
        "month" => Month,
        "year" => Year,
        "format" => Format,
        "round" => Round,
        "absolute" => Absolute,
        "currency" => Currency,
        "percent" => Percent,
        "generate" => Generate,
        "uuid" => Uuid,

        "api" => Api,
        "request" => Request,
        "mock" => Mock,
        "status" => Status,
        "body" => Body,
        "response" => Response,
        "get" => Get,
        "post" => Post,
        "put" => Put,
        "delete" => Delete,
        "patch" => Patch,
        "try" => Try,
        "catch" => Catch,

        "skip" => Skip,
        "only" => Only,
        "slow" => Slow,
        "fixme" => Fixme,
        "serial" => Serial,

        "true" => BoolLit(true),
        "false" => BoolLit(false),
        "null" => NullLit,

        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}
