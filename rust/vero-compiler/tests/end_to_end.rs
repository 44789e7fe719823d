//! End-to-end scenarios exercising the full `compile` pipeline: lex, parse,
//! validate, and transpile together on realistic source units.

fn assert_valid(source: &str) -> vero_compiler::compiler::session::SessionResult {
    let result = vero_compiler::compile(source);
    assert!(result.valid, "expected valid compile, got: {:?}", result.diagnostics);
    result
}

#[test]
fn minimal_suite_emits_a_test_for_its_scenario() {
    let result = assert_valid(
        r#"
        PAGE LoginPage {
            FIELD submitButton = BUTTON "Submit"
        }
        FEATURE Login {
            USE LoginPage
            SCENARIO "submits the form" {
                CLICK LoginPage.submitButton
            }
        }
        "#,
    );

    let feature_code = result.output.tests.get("Login").expect("Login feature unit");
    assert!(feature_code.contains("describe(\"Login\""));
    assert!(feature_code.contains("test(\"submits the form\""));
    assert!(feature_code.contains("await host.click(LoginPage.submitButton(page));"));

    let page_code = result.output.pages.get("LoginPage").expect("LoginPage unit");
    assert!(page_code.contains("export const LoginPage = {"));
    assert!(page_code.contains("submitButton: (page) => page.getByRole('button', { name: \"Submit\" }),"));
}

#[test]
fn undefined_field_reference_is_caught_with_a_suggestion() {
    let result = vero_compiler::compile(
        r#"
        PAGE LoginPage {
            FIELD submitButton = BUTTON "Submit"
        }
        FEATURE Login {
            USE LoginPage
            SCENARIO "typo'd field" {
                CLICK LoginPage.submitButon
            }
        }
        "#,
    );

    assert!(!result.valid);
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.code == "VERO-302")
        .expect("expected a VERO-302 unknown field diagnostic");
    assert!(diag.what_went_wrong.contains("submitButon"));
    assert!(
        diag.suggestions.iter().any(|s| s.text.contains("submitButton")),
        "expected a did-you-mean suggestion toward submitButton, got {:?}",
        diag.suggestions
    );
}

#[test]
fn switching_tabs_rebinds_used_pages() {
    let result = assert_valid(
        r#"
        PAGE ProductsPage {
            FIELD heading = HEADING "Products"
        }
        FEATURE Checkout {
            USE ProductsPage
            SCENARIO "opens a new tab and comes back" {
                OPEN "https://example.com/cart" IN NEW TAB
                VERIFY ProductsPage.heading IS VISIBLE
            }
        }
        "#,
    );

    let feature_code = result.output.tests.get("Checkout").expect("Checkout feature unit");
    assert!(feature_code.contains("page = await context.newPage();"));
    assert!(feature_code.contains("await page.bringToFront();"));
    assert!(feature_code.contains("await page.waitForLoadState('domcontentloaded');"));
    assert!(
        feature_code.contains("for (const __useRef of __vero_usedPages) { __useRef.rebind(page); }"),
        "expected the generic page-rebind loop after switching tabs, got:\n{}",
        feature_code
    );
}

#[test]
fn vdql_row_query_lowers_to_a_data_manager_chain() {
    let result = assert_valid(
        r#"
        FEATURE Accounts {
            SCENARIO "loads the first matching user" {
                ROW user = FIRST Users WHERE state == "CA" AND active == "true" ORDER BY name DESC
                LOG user
            }
        }
        "#,
    );

    let feature_code = result.output.tests.get("Accounts").expect("Accounts feature unit");
    assert!(feature_code.contains("const user = dataManager.query('Users')"));
    assert!(feature_code.contains(".where(and(eq('state', \"CA\"), eq('active', \"true\")))"));
    assert!(feature_code.contains(".orderBy([{ column: 'name', direction: 'DESC' }])"));
    assert!(feature_code.contains(".first()"));
}

#[test]
fn mock_api_lowers_to_a_page_route_fulfill() {
    let result = assert_valid(
        r#"
        FEATURE Billing {
            SCENARIO "shows a server error banner" {
                MOCK API "/api/invoices" WITH STATUS 500 AND BODY "{\"error\":\"boom\"}"
                OPEN "/invoices"
            }
        }
        "#,
    );

    let feature_code = result.output.tests.get("Billing").expect("Billing feature unit");
    assert!(feature_code.contains("await page.route(\"/api/invoices\", route => route.fulfill({ status: 500"));
    assert!(feature_code.contains("contentType: 'application/json'"));
}

#[test]
fn compiling_the_same_source_twice_is_byte_identical() {
    let source = r#"
    PAGE SearchPage {
        FIELD queryBox = TEXTBOX "Search"
    }
    FEATURE Search {
        USE SearchPage
        BEFORE EACH {
            OPEN "/search"
        }
        SCENARIO "finds a result" {
            FILL SearchPage.queryBox WITH "widgets"
            VERIFY SearchPage.queryBox IS VISIBLE
        }
    }
    "#;

    let first = vero_compiler::compile(source);
    let second = vero_compiler::compile(source);
    assert!(first.valid && second.valid);
    assert_eq!(first.output.tests, second.output.tests);
    assert_eq!(first.output.pages, second.output.pages);
    assert_eq!(first.output.page_actions, second.output.page_actions);
}

#[test]
fn parser_recovery_bounds_diagnostics_by_source_size() {
    let source = r#"
    PAGE Broken {
        FIELD FIELD FIELD
    }
    FEATURE Broken {
        SCENARIO "garbage" {
            CLICK CLICK CLICK
        }
    }
    "#;

    let result = vero_compiler::compile(source);
    assert!(!result.valid);
    assert!(
        result.diagnostics.len() <= source.len(),
        "parser recovery should never emit more diagnostics than there are bytes of source, got {}",
        result.diagnostics.len()
    );
}
