//! AST-aware source formatter.
//!
//! Reparses a `.vero` unit and re-emits it with canonical indentation and
//! keyword casing, rather than patching whitespace in place. Comments are
//! not preserved — the AST carries none (spec §3.2) — so this is lossy on
//! comment-bearing input; that's a known gap, not an oversight.

use vero_compiler::compiler::ast::*;

const INDENT: &str = "    ";

/// Formats `source`, returning the reformatted text or the diagnostics that
/// made it unsafe to reformat (an invalid unit isn't reformatted).
pub fn format_source(source: &str) -> Result<String, Vec<vero_compiler::diagnostics::Diagnostic>> {
    let result = vero_compiler::compile(source);
    if !result.valid {
        return Err(result.diagnostics);
    }
    Ok(format_program(&result.program))
}

pub fn format_program(program: &Program) -> String {
    let mut out = String::new();
    for page in &program.pages {
        format_page(page, &mut out);
        out.push('\n');
    }
    for page_actions in &program.page_actions {
        format_page_actions(page_actions, &mut out);
        out.push('\n');
    }
    for (i, feature) in program.features.iter().enumerate() {
        format_feature(feature, &mut out);
        if i + 1 < program.features.len() {
            out.push('\n');
        }
    }
    if out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn format_page(page: &Page, out: &mut String) {
    match &page.url {
        Some(url) => out.push_str(&format!("PAGE {} \"{}\" {{\n", page.name, url)),
        None => out.push_str(&format!("PAGE {} {{\n", page.name)),
    }
    for field in &page.fields {
        out.push_str(&format!(
            "{}FIELD {} = {} \"{}\"\n",
            INDENT,
            field.name,
            field.selector.keyword(),
            field.selector.argument()
        ));
    }
    for variable in &page.variables {
        out.push_str(&format!("{}VAR {} = {}\n", INDENT, variable.name, expr(&variable.value)));
    }
    for action in &page.actions {
        format_action(action, 1, out);
    }
    out.push_str("}\n");
}

fn format_page_actions(page_actions: &PageActions, out: &mut String) {
    out.push_str(&format!("PAGEACTIONS {} FOR {} {{\n", page_actions.name, page_actions.for_page));
    for action in &page_actions.actions {
        format_action(action, 1, out);
    }
    out.push_str("}\n");
}

fn format_action(action: &Action, depth: usize, out: &mut String) {
    let ind = INDENT.repeat(depth);
    out.push_str(&format!("{}{}({}) {{\n", ind, action.name, action.parameters.join(", ")));
    format_stmts(&action.statements, depth + 1, out);
    out.push_str(&format!("{}}}\n", ind));
}

fn format_feature(feature: &Feature, out: &mut String) {
    out.push_str(&format!("FEATURE {} {{\n", feature.name));
    for u in &feature.uses {
        out.push_str(&format!("{}USE {}\n", INDENT, u.name));
    }
    for hook in &feature.hooks {
        let keyword = match hook.hook_type {
            HookType::BeforeAll => "BEFORE ALL",
            HookType::BeforeEach => "BEFORE EACH",
            HookType::AfterAll => "AFTER ALL",
            HookType::AfterEach => "AFTER EACH",
        };
        out.push_str(&format!("{}{} {{\n", INDENT, keyword));
        format_stmts(&hook.statements, 2, out);
        out.push_str(&format!("{}}}\n", INDENT));
    }
    for scenario in &feature.scenarios {
        format_scenario(scenario, out);
    }
    out.push_str("}\n");
}

fn format_scenario(scenario: &Scenario, out: &mut String) {
    for annotation in &scenario.annotations {
        let name = match annotation {
            Annotation::Skip => "SKIP",
            Annotation::Only => "ONLY",
            Annotation::Slow => "SLOW",
            Annotation::Fixme => "FIXME",
            Annotation::Serial => "SERIAL",
        };
        out.push_str(&format!("{}@{}\n", INDENT, name));
    }
    out.push_str(&format!("{}SCENARIO {}", INDENT, quote(&scenario.name)));
    if !scenario.tags.is_empty() {
        out.push_str(&format!(" [{}]", scenario.tags.join(", ")));
    }
    out.push_str(" {\n");
    format_stmts(&scenario.statements, 2, out);
    out.push_str(&format!("{}}}\n", INDENT));
}

fn format_stmts(stmts: &[Stmt], depth: usize, out: &mut String) {
    for stmt in stmts {
        format_stmt(stmt, depth, out);
    }
}

fn format_stmt(stmt: &Stmt, depth: usize, out: &mut String) {
    let ind = INDENT.repeat(depth);
    match stmt {
        Stmt::Click(t, _) => out.push_str(&format!("{}CLICK {}\n", ind, target(t))),
        Stmt::Fill(t, e, _) => out.push_str(&format!("{}FILL {} WITH {}\n", ind, target(t), expr(e))),
        Stmt::Open(e, _) => out.push_str(&format!("{}OPEN {}\n", ind, expr(e))),
        Stmt::Check(t, _) => out.push_str(&format!("{}CHECK {}\n", ind, target(t))),
        Stmt::Uncheck(t, _) => out.push_str(&format!("{}UNCHECK {}\n", ind, target(t))),
        Stmt::Select(t, e, _) => out.push_str(&format!("{}SELECT {} FROM {}\n", ind, expr(e), target(t))),
        Stmt::Hover(t, _) => out.push_str(&format!("{}HOVER {}\n", ind, target(t))),
        Stmt::Press(e, _) => out.push_str(&format!("{}PRESS {}\n", ind, expr(e))),
        Stmt::Scroll(t, _) => out.push_str(&format!("{}SCROLL TO {}\n", ind, target(t))),
        Stmt::Wait(e, unit, _) => {
            let unit = match unit {
                WaitUnit::Seconds => "SECONDS",
                WaitUnit::Milliseconds => "MILLISECONDS",
            };
            out.push_str(&format!("{}WAIT {} {}\n", ind, expr(e), unit));
        }
        Stmt::Refresh(_) => out.push_str(&format!("{}REFRESH\n", ind)),
        Stmt::Clear(t, _) => out.push_str(&format!("{}CLEAR {}\n", ind, target(t))),
        Stmt::Upload(t, e, _) => out.push_str(&format!("{}UPLOAD {} TO {}\n", ind, expr(e), target(t))),
        Stmt::Drag(a, b, _) => out.push_str(&format!("{}DRAG {} TO {}\n", ind, target(a), target(b))),
        Stmt::Log(e, _) => out.push_str(&format!("{}LOG {}\n", ind, expr(e))),
        Stmt::Screenshot(e, _) => out.push_str(&format!("{}SCREENSHOT {}\n", ind, expr(e))),
        Stmt::Perform(a, args, _) => {
            let args = args.iter().map(expr).collect::<Vec<_>>().join(", ");
            out.push_str(&format!("{}DO {}.{}({})\n", ind, a.container, a.action, args));
        }
        Stmt::Return(e, _) => match e {
            Some(e) => out.push_str(&format!("{}RETURN {}\n", ind, expr(e))),
            None => out.push_str(&format!("{}RETURN\n", ind)),
        },
        Stmt::If(s) => {
            out.push_str(&format!("{}IF {} {{\n", ind, expr(&s.condition)));
            format_stmts(&s.then_body, depth + 1, out);
            match &s.else_body {
                Some(body) => {
                    out.push_str(&format!("{}}} ELSE {{\n", ind));
                    format_stmts(body, depth + 1, out);
                    out.push_str(&format!("{}}}\n", ind));
                }
                None => out.push_str(&format!("{}}}\n", ind)),
            }
        }
        Stmt::Repeat(s) => {
            out.push_str(&format!("{}REPEAT {} TIMES {{\n", ind, expr(&s.times)));
            format_stmts(&s.body, depth + 1, out);
            out.push_str(&format!("{}}}\n", ind));
        }
        Stmt::ForEach(s) => {
            out.push_str(&format!("{}FOR EACH ${} IN ${} {{\n", ind, s.item_variable, s.collection_variable));
            format_stmts(&s.statements, depth + 1, out);
            out.push_str(&format!("{}}}\n", ind));
        }
        Stmt::Load(s) => out.push_str(&format!("{}LOAD {} FROM \"{}\"\n", ind, s.variable_name, s.table_name)),
        Stmt::DataQuery(s) => format_data_query(s, &ind, out),
        Stmt::TryCatch(s) => {
            out.push_str(&format!("{}TRY {{\n", ind));
            format_stmts(&s.try_body, depth + 1, out);
            out.push_str(&format!("{}}} CATCH {{\n", ind));
            format_stmts(&s.catch_body, depth + 1, out);
            out.push_str(&format!("{}}}\n", ind));
        }
        Stmt::ApiRequest(s) => {
            let method = http_method(s.method);
            out.push_str(&format!("{}{} {}\n", ind, method, expr(&s.url)));
        }
        Stmt::VerifyResponse(s) => {
            let part = match s.part {
                ResponsePart::Status => "STATUS",
                ResponsePart::Body => "BODY",
                ResponsePart::Headers => "HEADERS",
            };
            out.push_str(&format!("{}VERIFY RESPONSE {} {}\n", ind, part, condition(&s.condition)));
        }
        Stmt::MockApi(s) => {
            out.push_str(&format!("{}MOCK API {} RETURNS {}", ind, expr(&s.url), s.status));
            if let Some(body) = &s.body {
                out.push_str(&format!(" WITH {}", expr(body)));
            }
            out.push('\n');
        }
        Stmt::Verify(s) => {
            let negation = if s.negated { " NOT" } else { "" };
            out.push_str(&format!("{}VERIFY {} IS{} {}\n", ind, target(&s.target), negation, condition(&s.condition)));
        }
        Stmt::VerifyScreenshot(s) => {
            out.push_str(&format!("{}VERIFY SCREENSHOT {} TOLERANCE {}\n", ind, expr(&s.name), tolerance(&s.tolerance)));
        }
        Stmt::SwitchToNewTab(e, _) => match e {
            Some(e) => out.push_str(&format!("{}SWITCH TO NEW TAB {}\n", ind, expr(e))),
            None => out.push_str(&format!("{}SWITCH TO NEW TAB\n", ind)),
        },
        Stmt::SwitchToTab(e, _) => out.push_str(&format!("{}SWITCH TO TAB {}\n", ind, expr(e))),
        Stmt::OpenInNewTab(e, _) => out.push_str(&format!("{}OPEN {} IN NEW TAB\n", ind, expr(e))),
        Stmt::CloseTab(_) => out.push_str(&format!("{}CLOSE TAB\n", ind)),
    }
}

fn format_data_query(s: &DataQueryStatement, ind: &str, out: &mut String) {
    let result_type = match s.result_type {
        ResultType::Data => "DATA",
        ResultType::List => "LIST",
        ResultType::Text => "TEXT",
        ResultType::Number => "NUMBER",
        ResultType::Flag => "FLAG",
    };
    let query = match &s.query {
        DataQuery::Table(q) => table_query(q),
        DataQuery::Aggregation(q) => aggregation_query(q),
    };
    out.push_str(&format!("{}{} {} = {}\n", ind, result_type, s.variable_name, query));
}

fn table_ref(r: &TableRef) -> String {
    let mut s = String::new();
    if let Some(project) = &r.project {
        s.push_str(&format!("{}.", project));
    }
    s.push_str(&r.table_name);
    if let Some((a, b)) = r.range {
        s.push_str(&format!("[{}:{}]", a, b));
    } else if let Some((row, col)) = r.cell {
        s.push_str(&format!("[{},{}]", row, col));
    } else if let Some(i) = r.row_index {
        s.push_str(&format!("[{}]", i));
    }
    if let Some(column) = &r.column {
        s.push_str(&format!(".{}", column));
    }
    s
}

fn table_query(q: &TableQuery) -> String {
    let mut s = table_ref(&q.table_ref);
    if let Some(position) = q.position {
        s.push_str(match position {
            Position::First => " FIRST",
            Position::Last => " LAST",
            Position::Random => " RANDOM",
        });
    }
    if let Some(cond) = &q.where_clause {
        s.push_str(&format!(" WHERE {}", data_condition(cond)));
    }
    if !q.order_by.is_empty() {
        let parts: Vec<String> = q
            .order_by
            .iter()
            .map(|(col, dir)| format!("{} {}", col, if *dir == SortDirection::Asc { "ASC" } else { "DESC" }))
            .collect();
        s.push_str(&format!(" ORDER BY {}", parts.join(", ")));
    }
    if let Some(limit) = q.limit {
        s.push_str(&format!(" LIMIT {}", limit));
    }
    if let Some(offset) = q.offset {
        s.push_str(&format!(" OFFSET {}", offset));
    }
    if let Some(default) = &q.default_value {
        s.push_str(&format!(" DEFAULT {}", expr(default)));
    }
    s
}

fn aggregation_query(q: &AggregationQuery) -> String {
    let func = match q.function {
        AggregationFunction::Count => "COUNT",
        AggregationFunction::Sum => "SUM",
        AggregationFunction::Average => "AVERAGE",
        AggregationFunction::Min => "MIN",
        AggregationFunction::Max => "MAX",
        AggregationFunction::Distinct => "DISTINCT",
        AggregationFunction::Rows => "ROWS",
        AggregationFunction::Columns => "COLUMNS",
        AggregationFunction::Headers => "HEADERS",
    };
    let mut s = format!("{} {}", func, table_ref(&q.table_ref));
    if let Some(column) = &q.column {
        s.push_str(&format!(".{}", column));
    }
    if q.distinct {
        s.push_str(" DISTINCT");
    }
    if let Some(cond) = &q.where_clause {
        s.push_str(&format!(" WHERE {}", data_condition(cond)));
    }
    s
}

fn data_condition(cond: &DataCondition) -> String {
    match cond {
        DataCondition::And(a, b) => format!("{} AND {}", data_condition(a), data_condition(b)),
        DataCondition::Or(a, b) => format!("{} OR {}", data_condition(a), data_condition(b)),
        DataCondition::Not(c) => format!("NOT {}", data_condition(c)),
        DataCondition::Comparison(c) => comparison(c),
    }
}

fn comparison(c: &Comparison) -> String {
    let value = c.value.as_ref().map(expr).unwrap_or_default();
    match c.operator {
        ComparisonOp::Eq => format!("{} == {}", c.column, value),
        ComparisonOp::NotEq => format!("{} != {}", c.column, value),
        ComparisonOp::Gt => format!("{} > {}", c.column, value),
        ComparisonOp::Lt => format!("{} < {}", c.column, value),
        ComparisonOp::GtEq => format!("{} >= {}", c.column, value),
        ComparisonOp::LtEq => format!("{} <= {}", c.column, value),
        ComparisonOp::Contains => format!("{} CONTAINS {}", c.column, value),
        ComparisonOp::StartsWith => format!("{} STARTS WITH {}", c.column, value),
        ComparisonOp::EndsWith => format!("{} ENDS WITH {}", c.column, value),
        ComparisonOp::Matches => format!("{} MATCHES {}", c.column, value),
        ComparisonOp::In => format!(
            "{} IN [{}]",
            c.column,
            c.values.as_ref().map(|v| v.iter().map(expr).collect::<Vec<_>>().join(", ")).unwrap_or_default()
        ),
        ComparisonOp::NotIn => format!(
            "{} NOT IN [{}]",
            c.column,
            c.values.as_ref().map(|v| v.iter().map(expr).collect::<Vec<_>>().join(", ")).unwrap_or_default()
        ),
        ComparisonOp::IsNull => format!("{} IS NULL", c.column),
        ComparisonOp::IsEmpty => format!("{} IS EMPTY", c.column),
        ComparisonOp::IsNotEmpty => format!("{} IS NOT EMPTY", c.column),
    }
}

fn http_method(m: HttpMethod) -> &'static str {
    match m {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
        HttpMethod::Put => "PUT",
        HttpMethod::Delete => "DELETE",
        HttpMethod::Patch => "PATCH",
    }
}

fn tolerance(t: &ScreenshotTolerance) -> String {
    match t.preset {
        TolerancePreset::Strict => "STRICT",
        TolerancePreset::Balanced => "BALANCED",
        TolerancePreset::Relaxed => "RELAXED",
    }
    .to_string()
}

fn condition(c: &Condition) -> String {
    match c {
        Condition::Visible => "VISIBLE".to_string(),
        Condition::Hidden => "HIDDEN".to_string(),
        Condition::Enabled => "ENABLED".to_string(),
        Condition::Disabled => "DISABLED".to_string(),
        Condition::Checked => "CHECKED".to_string(),
        Condition::Focused => "FOCUSED".to_string(),
        Condition::Empty => "EMPTY".to_string(),
        Condition::HasText(e) => format!("HAS TEXT {}", expr(e)),
        Condition::Contains(e) => format!("CONTAINS {}", expr(e)),
        Condition::HasClass(e) => format!("HAS CLASS {}", expr(e)),
        Condition::HasValue(e) => format!("HAS VALUE {}", expr(e)),
        Condition::HasCount(e) => format!("HAS COUNT {}", expr(e)),
        Condition::UrlContains(e) => format!("URL CONTAINS {}", expr(e)),
        Condition::UrlEquals(e) => format!("URL EQUALS {}", expr(e)),
        Condition::TitleContains(e) => format!("TITLE CONTAINS {}", expr(e)),
        Condition::TitleEquals(e) => format!("TITLE EQUALS {}", expr(e)),
        Condition::StatusEquals(e) => format!("STATUS EQUALS {}", expr(e)),
        Condition::BodyContains(e) => format!("BODY CONTAINS {}", expr(e)),
        Condition::HeaderEquals(name, e) => format!("HEADER {} EQUALS {}", name, expr(e)),
    }
}

fn target(t: &Target) -> String {
    format!("{}.{}", t.page, t.field)
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::StringLit(s, _) => quote(s),
        Expr::NumberLit(n, _) => {
            if n.fract() == 0.0 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Expr::BooleanLit(b, _) => b.to_string(),
        Expr::NullLit(_) => "null".to_string(),
        Expr::VariableReference { name, page: Some(page), .. } => format!("{}.{}", page, name),
        Expr::VariableReference { name, page: None, .. } => format!("${}", name),
        Expr::EnvVarReference { name, .. } => format!("${{{}}}", name),
        Expr::MemberAccess { object, member, .. } => format!("{}.{}", expr(object), member),
        Expr::ArrayLiteral(items, _) => format!("[{}]", items.iter().map(expr).collect::<Vec<_>>().join(", ")),
        Expr::Transform { kind, argument, .. } => {
            let name = match kind {
                TransformKind::Uppercase => "UPPERCASE",
                TransformKind::Lowercase => "LOWERCASE",
                TransformKind::Trim => "TRIM",
                TransformKind::Length => "LENGTH",
            };
            format!("{}({})", name, expr(argument))
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_a_minimal_page_and_feature() {
        let source = "PAGE LoginPage{FIELD submitButton=BUTTON \"Submit\"}\nFEATURE Login{USE LoginPage\nSCENARIO S{CLICK LoginPage.submitButton}}\n";
        let formatted = format_source(source).expect("valid source should format");
        assert!(formatted.contains("PAGE LoginPage {"));
        assert!(formatted.contains("    FIELD submitButton = BUTTON \"Submit\""));
        assert!(formatted.contains("CLICK LoginPage.submitButton"));
    }

    #[test]
    fn invalid_source_is_rejected() {
        let result = format_source("PAGE { broken");
        assert!(result.is_err());
    }

    #[test]
    fn formatting_is_idempotent() {
        let source = "PAGE LoginPage{FIELD submitButton=BUTTON \"Submit\"}\nFEATURE Login{USE LoginPage\nSCENARIO S{CLICK LoginPage.submitButton}}\n";
        let once = format_source(source).unwrap();
        let twice = format_source(&once).unwrap();
        assert_eq!(once, twice);
    }
}
