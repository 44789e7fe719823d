//! Abstract syntax tree (spec §3.2).
//!
//! A tagged-union AST: every variant carries an explicit discriminant and an
//! exhaustive match is required at every walker (validator, transpiler,
//! editor providers), so adding a new statement or expression variant is a
//! compile error everywhere it isn't yet handled.

use serde::{Deserialize, Serialize};
use vero_core::Span;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub pages: Vec<Page>,
    pub page_actions: Vec<PageActions>,
    pub features: Vec<Feature>,
    pub span: Span,
}

// ── Pages ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub name: String,
    pub url: Option<String>,
    pub fields: Vec<Field>,
    pub variables: Vec<Variable>,
    pub actions: Vec<Action>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub selector: Selector,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub parameters: Vec<String>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// The 16 selector kinds (spec §3.1/§4.2), each over a string argument
/// except `Role`, which additionally carries no accessible-name argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Selector {
    Button(String),
    Textbox(String),
    Link(String),
    Checkbox(String),
    Heading(String),
    Combobox(String),
    Radio(String),
    Role(String),
    Label(String),
    Placeholder(String),
    Testid(String),
    Text(String),
    Alt(String),
    Title(String),
    Css(String),
    Xpath(String),
}

impl Selector {
    /// The keyword spelling used in `.vero` source, for diagnostics/hover.
    pub fn keyword(&self) -> &'static str {
        match self {
            Selector::Button(_) => "BUTTON",
            Selector::Textbox(_) => "TEXTBOX",
            Selector::Link(_) => "LINK",
            Selector::Checkbox(_) => "CHECKBOX",
            Selector::Heading(_) => "HEADING",
            Selector::Combobox(_) => "COMBOBOX",
            Selector::Radio(_) => "RADIO",
            Selector::Role(_) => "ROLE",
            Selector::Label(_) => "LABEL",
            Selector::Placeholder(_) => "PLACEHOLDER",
            Selector::Testid(_) => "TESTID",
            Selector::Text(_) => "TEXT",
            Selector::Alt(_) => "ALT",
            Selector::Title(_) => "TITLE",
            Selector::Css(_) => "CSS",
            Selector::Xpath(_) => "XPATH",
        }
    }

    pub fn argument(&self) -> &str {
        match self {
            Selector::Button(s)
            | Selector::Textbox(s)
            | Selector::Link(s)
            | Selector::Checkbox(s)
            | Selector::Heading(s)
            | Selector::Combobox(s)
            | Selector::Radio(s)
            | Selector::Role(s)
            | Selector::Label(s)
            | Selector::Placeholder(s)
            | Selector::Testid(s)
            | Selector::Text(s)
            | Selector::Alt(s)
            | Selector::Title(s)
            | Selector::Css(s)
            | Selector::Xpath(s) => s,
        }
    }
}

// ── PageActions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageActions {
    pub name: String,
    pub for_page: String,
    pub actions: Vec<Action>,
    pub span: Span,
}

// ── Features ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub uses: Vec<UseRef>,
    pub hooks: Vec<Hook>,
    pub scenarios: Vec<Scenario>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseRef {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookType {
    BeforeAll,
    BeforeEach,
    AfterAll,
    AfterEach,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hook {
    pub hook_type: HookType,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    Skip,
    Only,
    Slow,
    Fixme,
    Serial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub tags: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

// ── Targets ────────────────────────────────────────────────────────────

/// A `Page.field` reference used in statements (spec §3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub page: String,
    pub field: String,
    pub span: Span,
}

/// `Page.action` or `PageActions.action`, used by `Perform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRef {
    pub container: String,
    pub action: String,
    pub span: Span,
}

// ── Statements ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitUnit {
    Seconds,
    Milliseconds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Click(Target, Span),
    Fill(Target, Expr, Span),
    Open(Expr, Span),
    Check(Target, Span),
    Uncheck(Target, Span),
    Select(Target, Expr, Span),
    Hover(Target, Span),
    Press(Expr, Span),
    Scroll(Target, Span),
    Wait(Expr, WaitUnit, Span),
    Refresh(Span),
    Clear(Target, Span),
    Upload(Target, Expr, Span),
    Drag(Target, Target, Span),
    Log(Expr, Span),
    Screenshot(Expr, Span),
    Perform(ActionRef, Vec<Expr>, Span),
    Return(Option<Expr>, Span),
    If(IfStmt),
    Repeat(Box<RepeatStmt>),
    ForEach(Box<ForEachStmt>),
    Load(LoadStmt),
    DataQuery(DataQueryStatement),
    TryCatch(Box<TryCatchStmt>),
    ApiRequest(ApiRequestStmt),
    VerifyResponse(VerifyResponseStmt),
    MockApi(MockApiStmt),
    Verify(VerifyStmt),
    VerifyScreenshot(VerifyScreenshotStmt),
    SwitchToNewTab(Option<Expr>, Span),
    SwitchToTab(Expr, Span),
    OpenInNewTab(Expr, Span),
    CloseTab(Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        use Stmt::*;
        match self {
            Click(_, s)
            | Open(_, s)
            | Check(_, s)
            | Uncheck(_, s)
            | Hover(_, s)
            | Press(_, s)
            | Scroll(_, s)
            | Refresh(s)
            | Log(_, s)
            | Screenshot(_, s)
            | Return(_, s)
            | SwitchToNewTab(_, s)
            | SwitchToTab(_, s)
            | OpenInNewTab(_, s)
            | CloseTab(s) => *s,
            Fill(_, _, s) | Select(_, _, s) | Clear(_, s) | Wait(_, _, s) => *s,
            Upload(_, _, s) | Drag(_, _, s) | Perform(_, _, s) => *s,
            If(stmt) => stmt.span,
            Repeat(stmt) => stmt.span,
            ForEach(stmt) => stmt.span,
            Load(stmt) => stmt.span,
            DataQuery(stmt) => stmt.span,
            TryCatch(stmt) => stmt.span,
            ApiRequest(stmt) => stmt.span,
            VerifyResponse(stmt) => stmt.span,
            MockApi(stmt) => stmt.span,
            Verify(stmt) => stmt.span,
            VerifyScreenshot(stmt) => stmt.span,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeatStmt {
    pub times: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForEachStmt {
    pub item_variable: String,
    pub collection_variable: String,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Legacy `LOAD name FROM "table"` — lazy, fetch-if-not-cached semantics
/// (spec §9 Open Question "VDQL LOAD legacy"; kept distinct from `ROW`/`ROWS`
/// which always read from the already-cached snapshot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadStmt {
    pub variable_name: String,
    pub table_name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    Data,
    List,
    Text,
    Number,
    Flag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQueryStatement {
    pub result_type: ResultType,
    pub variable_name: String,
    pub query: DataQuery,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DataQuery {
    Table(TableQuery),
    Aggregation(AggregationQuery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    First,
    Last,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRef {
    pub project: Option<String>,
    pub table_name: String,
    pub column: Option<String>,
    pub row_index: Option<i64>,
    pub range: Option<(i64, i64)>,
    pub cell: Option<(i64, i64)>,
    pub columns: Option<Vec<String>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableQuery {
    pub table_ref: TableRef,
    pub columns: Option<Vec<String>>,
    pub where_clause: Option<DataCondition>,
    pub order_by: Vec<(String, SortDirection)>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub position: Option<Position>,
    pub default_value: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationFunction {
    Count,
    Sum,
    Average,
    Min,
    Max,
    Distinct,
    Rows,
    Columns,
    Headers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationQuery {
    pub table_ref: TableRef,
    pub function: AggregationFunction,
    pub column: Option<String>,
    pub where_clause: Option<DataCondition>,
    pub distinct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    In,
    NotIn,
    IsNull,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub column: String,
    pub operator: ComparisonOp,
    pub value: Option<Expr>,
    pub values: Option<Vec<Expr>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DataCondition {
    And(Box<DataCondition>, Box<DataCondition>),
    Or(Box<DataCondition>, Box<DataCondition>),
    Not(Box<DataCondition>),
    Comparison(Comparison),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryCatchStmt {
    pub try_body: Vec<Stmt>,
    pub catch_body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequestStmt {
    pub method: HttpMethod,
    pub url: Expr,
    pub body: Option<Expr>,
    pub headers: Option<Vec<(String, Expr)>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePart {
    Status,
    Body,
    Headers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponseStmt {
    pub part: ResponsePart,
    pub condition: Condition,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockApiStmt {
    pub url: Expr,
    pub status: i64,
    pub body: Option<Expr>,
    pub span: Span,
}

/// The condition half of a `VERIFY target IS [NOT] <condition>` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Condition {
    Visible,
    Hidden,
    Enabled,
    Disabled,
    Checked,
    Focused,
    Empty,
    HasText(Expr),
    Contains(Expr),
    HasClass(Expr),
    HasValue(Expr),
    HasCount(Expr),
    UrlContains(Expr),
    UrlEquals(Expr),
    TitleContains(Expr),
    TitleEquals(Expr),
    StatusEquals(Expr),
    BodyContains(Expr),
    HeaderEquals(String, Expr),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyStmt {
    pub target: Target,
    pub negated: bool,
    pub condition: Condition,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TolerancePreset {
    Strict,
    Balanced,
    Relaxed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotTolerance {
    pub preset: TolerancePreset,
    pub threshold: Option<f64>,
    pub max_diff_pixels: Option<i64>,
    pub max_diff_ratio: Option<f64>,
}

impl ScreenshotTolerance {
    /// preset→(threshold, maxDiffPixels, maxDiffRatio), spec §4.4.
    pub fn preset_defaults(preset: TolerancePreset) -> (f64, i64, f64) {
        match preset {
            TolerancePreset::Strict => (0.05, 0, 0.0),
            TolerancePreset::Balanced => (0.2, 0, 0.0),
            TolerancePreset::Relaxed => (0.4, 0, 0.01),
        }
    }

    pub fn resolved(&self) -> (f64, i64, f64) {
        let (t, p, r) = Self::preset_defaults(self.preset);
        (
            self.threshold.unwrap_or(t),
            self.max_diff_pixels.unwrap_or(p),
            self.max_diff_ratio.unwrap_or(r),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyScreenshotStmt {
    pub name: Expr,
    pub tolerance: ScreenshotTolerance,
    pub span: Span,
}

// ── Expressions ────────────────────────────────────────────────────────

/// The four string transforms the expression grammar routes into an AST
/// node. `tokens.rs` also lexes the wider transform vocabulary spec.md's
/// token catalog names (CONVERT, EXTRACT, REPLACE, SPLIT, JOIN, PAD, date
/// arithmetic, FORMAT, ROUND, CURRENCY, PERCENT, GENERATE, UUID, ...); those
/// tokens are real lexemes but the parser never builds an expression node
/// for them — see the Open Question decision in DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformKind {
    Uppercase,
    Lowercase,
    Trim,
    Length,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    StringLit(String, Span),
    NumberLit(f64, Span),
    BooleanLit(bool, Span),
    NullLit(Span),
    /// `$name` or `Page.field`-shaped reference; `page` is set for the latter.
    VariableReference {
        name: String,
        page: Option<String>,
        span: Span,
    },
    EnvVarReference {
        name: String,
        span: Span,
    },
    MemberAccess {
        object: Box<Expr>,
        member: String,
        span: Span,
    },
    ArrayLiteral(Vec<Expr>, Span),
    Transform {
        kind: TransformKind,
        argument: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        use Expr::*;
        match self {
            StringLit(_, s)
            | NumberLit(_, s)
            | BooleanLit(_, s)
            | NullLit(s)
            | ArrayLiteral(_, s) => *s,
            VariableReference { span, .. }
            | EnvVarReference { span, .. }
            | MemberAccess { span, .. }
            | Transform { span, .. } => *span,
        }
    }
}
