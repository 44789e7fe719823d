//! Expression and statement lowering (spec §4.4 "Statement lowering").

use crate::compiler::ast::*;
use crate::transpile::vdql;
use std::collections::BTreeSet;

pub const TAB_WAIT_TIMEOUT_MS: u64 = 5000;
pub const TAB_WAIT_POLL_MS: u64 = 150;

/// Tracks scenario-local lowering state threaded through one scenario/hook
/// body, so the emitter can decide what to declare/destructure exactly once
/// (spec §4.4): whether `__vero_apiResponse`/`__env__` are referenced at
/// all, and whether `request`/`context` need to be in the fixture
/// destructure.
#[derive(Debug, Default)]
pub struct LowerState {
    pub uses_api_response: bool,
    pub uses_env: bool,
    pub uses_request: bool,
    pub uses_context: bool,
    /// Page identifiers referenced as a `Target`/`Perform` container/`USE`
    /// (spec §4.4 "Page-reference collector"); row variables never land here.
    pub referenced_pages: BTreeSet<String>,
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn lower_expr(expr: &Expr) -> String {
    match expr {
        Expr::StringLit(s, _) => quote(s),
        Expr::NumberLit(n, _) => format!("{}", n),
        Expr::BooleanLit(b, _) => b.to_string(),
        Expr::NullLit(_) => "null".to_string(),
        Expr::VariableReference { name, page, .. } => match page {
            Some(p) => format!("{}.{}", p, name),
            None => name.clone(),
        },
        Expr::EnvVarReference { name, .. } => format!("__env__.{}", name),
        Expr::MemberAccess { object, member, .. } => format!("{}.{}", lower_expr(object), member),
        Expr::ArrayLiteral(items, _) => {
            let parts: Vec<String> = items.iter().map(lower_expr).collect();
            format!("[{}]", parts.join(", "))
        }
        Expr::Transform { kind, argument, .. } => {
            let arg = lower_expr(argument);
            match kind {
                TransformKind::Uppercase => format!("{}.toUpperCase()", arg),
                TransformKind::Lowercase => format!("{}.toLowerCase()", arg),
                TransformKind::Trim => format!("{}.trim()", arg),
                TransformKind::Length => format!("{}.length", arg),
            }
        }
    }
}

/// Walks an expression for both the page-reference collector and the
/// environment-reference detector, since both need to see every expression
/// a statement touches.
fn collect_expr_pages(expr: &Expr, state: &mut LowerState) {
    match expr {
        Expr::VariableReference { page: Some(p), .. } => {
            state.referenced_pages.insert(p.clone());
        }
        Expr::EnvVarReference { .. } => {
            state.uses_env = true;
        }
        Expr::MemberAccess { object, .. } => collect_expr_pages(object, state),
        Expr::Transform { argument, .. } => collect_expr_pages(argument, state),
        Expr::ArrayLiteral(items, _) => {
            for item in items {
                collect_expr_pages(item, state);
            }
        }
        _ => {}
    }
}

fn locator(target: &Target) -> String {
    format!("{}.{}(page)", target.page, target.field)
}

fn condition_expectation(loc: &str, negated: bool, cond: &Condition) -> String {
    let matcher = |m: String| {
        if negated {
            format!("await expect({}).not.{};", loc, m)
        } else {
            format!("await expect({}).{};", loc, m)
        }
    };
    match cond {
        Condition::Visible => matcher("toBeVisible()".to_string()),
        Condition::Hidden => matcher("toBeHidden()".to_string()),
        Condition::Enabled => matcher("toBeEnabled()".to_string()),
        Condition::Disabled => matcher("toBeDisabled()".to_string()),
        Condition::Checked => matcher("toBeChecked()".to_string()),
        Condition::Focused => matcher("toBeFocused()".to_string()),
        Condition::Empty => matcher("toBeEmpty()".to_string()),
        Condition::HasText(e) => matcher(format!("toHaveText({})", lower_expr(e))),
        Condition::Contains(e) => matcher(format!("toContainText({})", lower_expr(e))),
        Condition::HasClass(e) => matcher(format!("toHaveClass({})", lower_expr(e))),
        Condition::HasValue(e) => matcher(format!("toHaveValue({})", lower_expr(e))),
        Condition::HasCount(e) => matcher(format!("toHaveCount({})", lower_expr(e))),
        Condition::UrlContains(e) => {
            if negated {
                format!("await expect(page).not.toContainURL({});", lower_expr(e))
            } else {
                format!("await expect(page).toContainURL({});", lower_expr(e))
            }
        }
        Condition::UrlEquals(e) => {
            if negated {
                format!("await expect(page).not.toHaveURL({});", lower_expr(e))
            } else {
                format!("await expect(page).toHaveURL({});", lower_expr(e))
            }
        }
        Condition::TitleContains(e) => {
            if negated {
                format!("await expect(page).not.toContainTitle({});", lower_expr(e))
            } else {
                format!("await expect(page).toContainTitle({});", lower_expr(e))
            }
        }
        Condition::TitleEquals(e) => {
            if negated {
                format!("await expect(page).not.toHaveTitle({});", lower_expr(e))
            } else {
                format!("await expect(page).toHaveTitle({});", lower_expr(e))
            }
        }
        Condition::StatusEquals(e) => {
            format!("expect(__vero_apiResponse.status()).toBe({});", lower_expr(e))
        }
        Condition::BodyContains(e) => {
            format!("expect(await __vero_apiResponse.text()).toContain({});", lower_expr(e))
        }
        Condition::HeaderEquals(key, e) => format!(
            "expect(__vero_apiResponse.headers()['{}']).toBe({});",
            key,
            lower_expr(e)
        ),
    }
}

fn http_method_call(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "get",
        HttpMethod::Post => "post",
        HttpMethod::Put => "put",
        HttpMethod::Delete => "delete",
        HttpMethod::Patch => "patch",
    }
}

/// Lowers one statement into zero or more generated-source lines at the
/// given indent depth.
pub fn lower_stmt(stmt: &Stmt, indent: usize, state: &mut LowerState) -> Vec<String> {
    let pad = "  ".repeat(indent);
    let mut out = Vec::new();

    match stmt {
        Stmt::Click(t, _) => {
            state.referenced_pages.insert(t.page.clone());
            out.push(format!("{}await host.click({});", pad, locator(t)));
        }
        Stmt::Fill(t, e, _) => {
            state.referenced_pages.insert(t.page.clone());
            collect_expr_pages(e, state);
            out.push(format!("{}await host.fill({}, {});", pad, locator(t), lower_expr(e)));
        }
        Stmt::Open(e, _) => {
            collect_expr_pages(e, state);
            out.push(format!("{}await host.goto({});", pad, lower_expr(e)));
        }
        Stmt::Check(t, _) => {
            state.referenced_pages.insert(t.page.clone());
            out.push(format!("{}await host.check({});", pad, locator(t)));
        }
        Stmt::Uncheck(t, _) => {
            state.referenced_pages.insert(t.page.clone());
            out.push(format!("{}await host.uncheck({});", pad, locator(t)));
        }
        Stmt::Select(t, e, _) => {
            state.referenced_pages.insert(t.page.clone());
            collect_expr_pages(e, state);
            out.push(format!("{}await host.select({}, {});", pad, locator(t), lower_expr(e)));
        }
        Stmt::Hover(t, _) => {
            state.referenced_pages.insert(t.page.clone());
            out.push(format!("{}await host.hover({});", pad, locator(t)));
        }
        Stmt::Press(e, _) => {
            collect_expr_pages(e, state);
            out.push(format!("{}await host.press({});", pad, lower_expr(e)));
        }
        Stmt::Scroll(t, _) => {
            state.referenced_pages.insert(t.page.clone());
            out.push(format!("{}await host.scroll({});", pad, locator(t)));
        }
        Stmt::Wait(e, unit, _) => {
            let ms = match unit {
                WaitUnit::Seconds => format!("({}) * 1000", lower_expr(e)),
                WaitUnit::Milliseconds => lower_expr(e),
            };
            out.push(format!("{}await host.waitMs({});", pad, ms));
        }
        Stmt::Refresh(_) => out.push(format!("{}await host.refresh();", pad)),
        Stmt::Clear(t, _) => {
            state.referenced_pages.insert(t.page.clone());
            out.push(format!("{}await host.clear({});", pad, locator(t)));
        }
        Stmt::Upload(t, e, _) => {
            state.referenced_pages.insert(t.page.clone());
            collect_expr_pages(e, state);
            out.push(format!("{}await host.upload({}, {});", pad, locator(t), lower_expr(e)));
        }
        Stmt::Drag(a, b, _) => {
            state.referenced_pages.insert(a.page.clone());
            state.referenced_pages.insert(b.page.clone());
            out.push(format!(
                "{}await host.dragAndDrop({}, {});",
                pad,
                locator(a),
                locator(b)
            ));
        }
        Stmt::Log(e, _) => {
            collect_expr_pages(e, state);
            out.push(format!("{}console.log({});", pad, lower_expr(e)));
        }
        Stmt::Screenshot(e, _) => {
            collect_expr_pages(e, state);
            out.push(format!("{}await host.screenshot({}, {{}});", pad, lower_expr(e)));
        }
        Stmt::Perform(action_ref, args, _) => {
            state.referenced_pages.insert(action_ref.container.clone());
            state.uses_context = true;
            state.uses_request = true;
            for a in args {
                collect_expr_pages(a, state);
            }
            let mut call_args = vec!["page".to_string(), "context".to_string(), "request".to_string()];
            call_args.extend(args.iter().map(lower_expr));
            out.push(format!(
                "{}await {}_{}({});",
                pad,
                action_ref.container,
                action_ref.action,
                call_args.join(", ")
            ));
        }
        Stmt::Return(e, _) => match e {
            Some(e) => {
                collect_expr_pages(e, state);
                out.push(format!("{}return {};", pad, lower_expr(e)));
            }
            None => out.push(format!("{}return;", pad)),
        },
        Stmt::If(s) => {
            collect_expr_pages(&s.condition, state);
            out.push(format!("{}if ({}) {{", pad, lower_expr(&s.condition)));
            for inner in &s.then_body {
                out.extend(lower_stmt(inner, indent + 1, state));
            }
            if let Some(else_body) = &s.else_body {
                out.push(format!("{}}} else {{", pad));
                for inner in else_body {
                    out.extend(lower_stmt(inner, indent + 1, state));
                }
            }
            out.push(format!("{}}}", pad));
        }
        Stmt::Repeat(s) => {
            collect_expr_pages(&s.times, state);
            out.push(format!(
                "{}for (let __i = 0; __i < {}; __i++) {{",
                pad,
                lower_expr(&s.times)
            ));
            for inner in &s.body {
                out.extend(lower_stmt(inner, indent + 1, state));
            }
            out.push(format!("{}}}", pad));
        }
        Stmt::ForEach(s) => {
            out.push(format!(
                "{}for (const {} of {}) {{",
                pad, s.item_variable, s.collection_variable
            ));
            for inner in &s.statements {
                out.extend(lower_stmt(inner, indent + 1, state));
            }
            out.push(format!("{}}}", pad));
        }
        Stmt::Load(l) => {
            out.push(format!(
                "{}const {} = await dataManager.query('{}').execute();",
                pad, l.variable_name, l.table_name
            ));
        }
        Stmt::DataQuery(q) => {
            let chain = vdql::lower_data_query(&q.query);
            out.push(format!("{}const {} = {};", pad, q.variable_name, chain));
        }
        Stmt::TryCatch(s) => {
            out.push(format!("{}try {{", pad));
            for inner in &s.try_body {
                out.extend(lower_stmt(inner, indent + 1, state));
            }
            out.push(format!("{}}} catch (__error) {{", pad));
            for inner in &s.catch_body {
                out.extend(lower_stmt(inner, indent + 1, state));
            }
            out.push(format!("{}}}", pad));
        }
        Stmt::ApiRequest(s) => {
            state.uses_api_response = true;
            state.uses_request = true;
            collect_expr_pages(&s.url, state);
            let mut opts = Vec::new();
            if let Some(body) = &s.body {
                collect_expr_pages(body, state);
                opts.push(format!("data: {}", lower_expr(body)));
            }
            if let Some(headers) = &s.headers {
                let entries: Vec<String> = headers
                    .iter()
                    .map(|(k, v)| format!("'{}': {}", k, lower_expr(v)))
                    .collect();
                opts.push(format!("headers: {{ {} }}", entries.join(", ")));
            }
            let opts_str = if opts.is_empty() {
                String::new()
            } else {
                format!(", {{ {} }}", opts.join(", "))
            };
            out.push(format!(
                "{}__vero_apiResponse = await request.{}({}{});",
                pad,
                http_method_call(s.method),
                lower_expr(&s.url),
                opts_str
            ));
        }
        Stmt::VerifyResponse(s) => {
            state.uses_api_response = true;
            out.push(format!("{}{}", pad, condition_expectation("", false, &s.condition)));
        }
        Stmt::MockApi(s) => {
            collect_expr_pages(&s.url, state);
            let mut fulfill = vec![format!("status: {}", s.status)];
            if let Some(body) = &s.body {
                collect_expr_pages(body, state);
                fulfill.push(format!("body: {}", lower_expr(body)));
                fulfill.push("contentType: 'application/json'".to_string());
            }
            out.push(format!(
                "{}await page.route({}, route => route.fulfill({{ {} }}));",
                pad,
                lower_expr(&s.url),
                fulfill.join(", ")
            ));
        }
        Stmt::Verify(s) => {
            state.referenced_pages.insert(s.target.page.clone());
            out.push(format!("{}{}", pad, condition_expectation(&locator(&s.target), s.negated, &s.condition)));
        }
        Stmt::VerifyScreenshot(s) => {
            collect_expr_pages(&s.name, state);
            let (threshold, max_diff_pixels, max_diff_ratio) = s.tolerance.resolved();
            out.push(format!(
                "{}await expect(page).toHaveScreenshot({}, {{ threshold: {}, maxDiffPixels: {}, maxDiffPixelRatio: {} }});",
                pad,
                lower_expr(&s.name),
                threshold,
                max_diff_pixels,
                max_diff_ratio
            ));
        }
        Stmt::SwitchToNewTab(url, _) => {
            state.uses_context = true;
            if let Some(u) = url {
                collect_expr_pages(u, state);
            }
            out.extend(lower_switch_to_new_tab(url, &pad));
        }
        Stmt::SwitchToTab(n, _) => {
            state.uses_context = true;
            collect_expr_pages(n, state);
            out.extend(lower_switch_to_tab(n, &pad));
        }
        Stmt::OpenInNewTab(url, _) => {
            state.uses_context = true;
            collect_expr_pages(url, state);
            out.extend(lower_open_in_new_tab(url, &pad));
        }
        Stmt::CloseTab(_) => {
            state.uses_context = true;
            out.extend(lower_close_tab(&pad));
        }
    }
    out
}

fn reinit_page_bindings(pad: &str) -> Vec<String> {
    vec![format!(
        "{}for (const __useRef of __vero_usedPages) {{ __useRef.rebind(page); }}",
        pad
    )]
}

fn lower_switch_to_new_tab(url: &Option<Expr>, pad: &str) -> Vec<String> {
    let mut out = Vec::new();
    match url {
        Some(u) => {
            out.push(format!("{}page = await context.newPage();", pad));
            out.push(format!("{}await page.goto({});", pad, lower_expr(u)));
        }
        None => {
            out.push(format!("{}{{", pad));
            out.push(format!(
                "{}  const __newPage = await context.waitForEvent('page', {{ timeout: {} }}).catch(() => null)\n{}    ?? context.pages().find(p => p.opener?.() === page);",
                pad, TAB_WAIT_TIMEOUT_MS, pad
            ));
            out.push(format!("{}  if (!__newPage) {{", pad));
            out.push(format!(
                "{}    throw new Error(\"SWITCH TO NEW TAB failed: no new tab found within {}ms.\");",
                pad, TAB_WAIT_TIMEOUT_MS
            ));
            out.push(format!("{}  }}", pad));
            out.push(format!("{}  page = __newPage;", pad));
            out.push(format!("{}}}", pad));
        }
    }
    out.push(format!("{}await page.bringToFront();", pad));
    out.push(format!("{}await page.waitForLoadState('domcontentloaded');", pad));
    out.extend(reinit_page_bindings(pad));
    out
}

fn lower_switch_to_tab(n: &Expr, pad: &str) -> Vec<String> {
    let mut out = Vec::new();
    let n_str = lower_expr(n);
    out.push(format!(
        "{}page = await __waitForTabCount(context, {}, {}, {});",
        pad, n_str, TAB_WAIT_TIMEOUT_MS, TAB_WAIT_POLL_MS
    ));
    out.push(format!("{}await page.bringToFront();", pad));
    out.push(format!("{}await page.waitForLoadState('domcontentloaded');", pad));
    out.extend(reinit_page_bindings(pad));
    out
}

fn lower_open_in_new_tab(url: &Expr, pad: &str) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!("{}page = await context.newPage();", pad));
    out.push(format!("{}await page.goto({});", pad, lower_expr(url)));
    out.push(format!("{}await page.bringToFront();", pad));
    out.push(format!("{}await page.waitForLoadState('domcontentloaded');", pad));
    out.extend(reinit_page_bindings(pad));
    out
}

fn lower_close_tab(pad: &str) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!("{}{{", pad));
    out.push(format!("{}  const __closingIndex = context.pages().indexOf(page);", pad));
    out.push(format!("{}  await page.close();", pad));
    out.push(format!("{}  const __remaining = context.pages();", pad));
    out.push(format!("{}  if (__remaining.length === 0) {{", pad));
    out.push(format!("{}    throw new Error('CLOSE TAB failed: no pages remain in context.');", pad));
    out.push(format!("{}  }}", pad));
    out.push(format!(
        "{}  page = __remaining[Math.min(__closingIndex, __remaining.length - 1)];",
        pad
    ));
    out.push(format!("{}}}", pad));
    out.push(format!("{}await page.bringToFront();", pad));
    out.push(format!("{}await page.waitForLoadState('domcontentloaded');", pad));
    out.extend(reinit_page_bindings(pad));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vero_core::Span;

    #[test]
    fn click_lowers_to_host_click() {
        let mut state = LowerState::default();
        let stmt = Stmt::Click(
            Target {
                page: "LoginPage".to_string(),
                field: "submitButton".to_string(),
                span: Span::dummy(),
            },
            Span::dummy(),
        );
        let lines = lower_stmt(&stmt, 0, &mut state);
        assert_eq!(lines, vec!["await host.click(LoginPage.submitButton(page));"]);
        assert!(state.referenced_pages.contains("LoginPage"));
    }

    #[test]
    fn wait_seconds_multiplies_by_1000() {
        let mut state = LowerState::default();
        let stmt = Stmt::Wait(Expr::NumberLit(2.0, Span::dummy()), WaitUnit::Seconds, Span::dummy());
        let lines = lower_stmt(&stmt, 0, &mut state);
        assert_eq!(lines, vec!["await host.waitMs((2) * 1000);"]);
    }
}
