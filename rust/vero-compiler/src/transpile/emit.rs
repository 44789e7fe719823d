//! Page-unit and feature-unit assembly (spec §4.4/§6.1).

use crate::compiler::ast::*;
use crate::transpile::lower::{self, LowerState};

/// Selector kind → Playwright-style host locator call (spec §6.1, 16 rows).
pub fn selector_locator_call(selector: &Selector) -> String {
    let arg = quote(selector.argument());
    match selector {
        Selector::Button(_) => format!("getByRole('button', {{ name: {} }})", arg),
        Selector::Link(_) => format!("getByRole('link', {{ name: {} }})", arg),
        Selector::Checkbox(_) => format!("getByRole('checkbox', {{ name: {} }})", arg),
        Selector::Heading(_) => format!("getByRole('heading', {{ name: {} }})", arg),
        Selector::Combobox(_) => format!("getByRole('combobox', {{ name: {} }})", arg),
        Selector::Radio(_) => format!("getByRole('radio', {{ name: {} }})", arg),
        Selector::Role(_) => format!("getByRole({})", arg),
        Selector::Textbox(_) => format!("getByRole('textbox', {{ name: {} }})", arg),
        Selector::Label(_) => format!("getByLabel({})", arg),
        Selector::Placeholder(_) => format!("getByPlaceholder({})", arg),
        Selector::Testid(_) => format!("getByTestId({})", arg),
        Selector::Text(_) => format!("getByText({})", arg),
        Selector::Alt(_) => format!("getByAltText({})", arg),
        Selector::Title(_) => format!("getByTitle({})", arg),
        Selector::Css(_) => format!("locator({})", arg),
        Selector::Xpath(_) => format!("locator({})", arg),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Emits one page unit: a field getter function per `FIELD`, and an action
/// function per page-local `ACTION`.
pub fn emit_page(page: &Page) -> String {
    let mut out = String::new();
    out.push_str(&format!("export const {} = {{\n", page.name));
    for field in &page.fields {
        out.push_str(&format!(
            "  {}: (page) => page.{},\n",
            field.name,
            selector_locator_call(&field.selector)
        ));
    }
    out.push_str("};\n\n");

    for action in &page.actions {
        out.push_str(&emit_action_fn(&page.name, action));
        out.push('\n');
    }
    out
}

/// Emits one standalone `PageActions` unit (spec §3.1: reusable action
/// bundles bound to a single page via `FOR`).
pub fn emit_page_actions(page_actions: &PageActions) -> String {
    let mut out = String::new();
    for action in &page_actions.actions {
        out.push_str(&emit_action_fn(&page_actions.name, action));
        out.push('\n');
    }
    out
}

/// Lowers a statement body and returns (generated lines, final state) so
/// callers can build the enclosing signature and header declarations from
/// the state the body actually needs.
fn lower_body(statements: &[Stmt], indent: usize) -> (Vec<String>, LowerState) {
    let mut state = LowerState::default();
    let mut lines = Vec::new();
    for stmt in statements {
        lines.extend(lower::lower_stmt(stmt, indent, &mut state));
    }
    (lines, state)
}

/// Header declarations emitted once at the top of a scenario/hook/action
/// body when the body references `{{env}}` or an API response (spec §4.4
/// "Environment references"/"ApiRequest").
fn header_declarations(state: &LowerState, indent: usize) -> Vec<String> {
    let pad = "  ".repeat(indent);
    let mut out = Vec::new();
    if state.uses_env {
        out.push(format!(
            "{}const __env__ = JSON.parse(process.env.VERO_ENV ?? '{{}}');",
            pad
        ));
    }
    if state.uses_api_response {
        out.push(format!("{}let __vero_apiResponse;", pad));
    }
    out
}

fn emit_action_fn(container: &str, action: &Action) -> String {
    let mut out = String::new();
    let (body, state) = lower_body(&action.statements, 1);
    // Actions are called from scenario/hook bodies that already have
    // `page`/`context`/`request` in scope (spec §4.4 `Perform`); the
    // signature always accepts all three so the call site never needs to
    // know which fixtures a given action body happens to touch.
    let mut params = vec!["page".to_string(), "context".to_string(), "request".to_string()];
    params.extend(action.parameters.iter().cloned());
    out.push_str(&format!(
        "export async function {}_{}({}) {{\n",
        container,
        action.name,
        params.join(", ")
    ));
    for line in header_declarations(&state, 1) {
        out.push_str(&line);
        out.push('\n');
    }
    for line in body {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

fn annotation_modifier(a: Annotation) -> Option<&'static str> {
    match a {
        Annotation::Skip => Some(".skip"),
        Annotation::Only => Some(".only"),
        Annotation::Slow => Some(".slow"),
        Annotation::Fixme => Some(".fixme"),
        Annotation::Serial => None,
    }
}

fn hook_fn_name(t: HookType) -> &'static str {
    match t {
        HookType::BeforeAll => "beforeAll",
        HookType::BeforeEach => "beforeEach",
        HookType::AfterAll => "afterAll",
        HookType::AfterEach => "afterEach",
    }
}

fn emit_hook(hook: &Hook) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {}(async ({{ page, context, request }}) => {{\n", hook_fn_name(hook.hook_type)));
    let (body, state) = lower_body(&hook.statements, 2);
    for line in header_declarations(&state, 2) {
        out.push_str(&line);
        out.push('\n');
    }
    for line in body {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("  });\n\n");
    out
}

fn emit_scenario(scenario: &Scenario) -> String {
    let mut out = String::new();
    for tag in &scenario.tags {
        out.push_str(&format!("  // @{}\n", tag));
    }
    let modifiers: String = scenario
        .annotations
        .iter()
        .filter_map(|a| annotation_modifier(*a))
        .collect();
    let serial_comment = if scenario.annotations.contains(&Annotation::Serial) {
        "  // serial\n"
    } else {
        ""
    };
    out.push_str(serial_comment);
    out.push_str(&format!(
        "  test{}({}, async ({{ page, context, request }}) => {{\n",
        modifiers,
        quote(&scenario.name)
    ));
    let (body, state) = lower_body(&scenario.statements, 2);
    for line in header_declarations(&state, 2) {
        out.push_str(&line);
        out.push('\n');
    }
    for line in body {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("  });\n\n");
    out
}

/// Emits one feature unit: a `describe` block with hooks and scenarios
/// (spec §4.4 "Feature-unit assembly").
pub fn emit_feature(feature: &Feature) -> String {
    let mut out = String::new();
    out.push_str(&format!("describe({}, () => {{\n", quote(&feature.name)));
    for hook in &feature.hooks {
        out.push_str(&emit_hook(hook));
    }
    for scenario in &feature.scenarios {
        out.push_str(&emit_scenario(scenario));
    }
    out.push_str("});\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_selector_lowers_to_get_by_role() {
        let call = selector_locator_call(&Selector::Button("Submit".to_string()));
        assert_eq!(call, "getByRole('button', { name: \"Submit\" })");
    }

    #[test]
    fn css_selector_lowers_to_locator() {
        let call = selector_locator_call(&Selector::Css(".submit".to_string()));
        assert_eq!(call, "locator(\".submit\")");
    }
}
