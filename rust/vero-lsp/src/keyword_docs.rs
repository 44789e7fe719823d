//! Fixed keyword documentation table consulted by hover and completion
//! (spec §6.5 "yields keyword docs from a fixed table").

pub struct KeywordDoc {
    pub keyword: &'static str,
    pub signature: &'static str,
    pub doc: &'static str,
}

const TABLE: &[KeywordDoc] = &[
    KeywordDoc { keyword: "PAGE", signature: "PAGE Name (\"url\")? { ... }", doc: "Declares a page: a named collection of selector fields and actions." },
    KeywordDoc { keyword: "PAGEACTIONS", signature: "PAGEACTIONS Name FOR Page { ... }", doc: "A reusable action bundle bound to an existing page." },
    KeywordDoc { keyword: "FEATURE", signature: "FEATURE Name { ... }", doc: "A named collection of scenarios and the hooks that wrap them." },
    KeywordDoc { keyword: "SCENARIO", signature: "SCENARIO \"name\" { ... }", doc: "A single test step, lowered to one `test(...)` call." },
    KeywordDoc { keyword: "FIELD", signature: "FIELD name = SELECTOR \"arg\"", doc: "A named selector on a page." },
    KeywordDoc { keyword: "ACTION", signature: "actionName(params?) { ... }", doc: "A reusable statement sequence callable via PERFORM." },
    KeywordDoc { keyword: "USE", signature: "USE PageName", doc: "Brings a page or page-actions bundle into a feature's scope." },
    KeywordDoc { keyword: "BEFORE", signature: "BEFORE ALL|EACH { ... }", doc: "Setup hook run before the suite or each scenario." },
    KeywordDoc { keyword: "AFTER", signature: "AFTER ALL|EACH { ... }", doc: "Teardown hook run after the suite or each scenario." },
    KeywordDoc { keyword: "CLICK", signature: "CLICK Page.field", doc: "Clicks the element matched by the field's selector." },
    KeywordDoc { keyword: "FILL", signature: "FILL Page.field WITH expr", doc: "Fills the element with the evaluated expression." },
    KeywordDoc { keyword: "OPEN", signature: "OPEN url", doc: "Navigates the current page to the given URL." },
    KeywordDoc { keyword: "CHECK", signature: "CHECK Page.field", doc: "Checks a checkbox or radio element." },
    KeywordDoc { keyword: "UNCHECK", signature: "UNCHECK Page.field", doc: "Unchecks a checkbox element." },
    KeywordDoc { keyword: "SELECT", signature: "SELECT Page.field WITH expr", doc: "Chooses an option in a combobox." },
    KeywordDoc { keyword: "HOVER", signature: "HOVER Page.field", doc: "Hovers the pointer over an element." },
    KeywordDoc { keyword: "PRESS", signature: "PRESS key", doc: "Presses a keyboard key." },
    KeywordDoc { keyword: "SCROLL", signature: "SCROLL Page.field", doc: "Scrolls the element into view." },
    KeywordDoc { keyword: "WAIT", signature: "WAIT n SECONDS|MILLISECONDS", doc: "Sleeps for the given duration." },
    KeywordDoc { keyword: "REFRESH", signature: "REFRESH", doc: "Reloads the current page." },
    KeywordDoc { keyword: "CLEAR", signature: "CLEAR Page.field", doc: "Clears an input's value." },
    KeywordDoc { keyword: "UPLOAD", signature: "UPLOAD Page.field WITH expr", doc: "Uploads a file to a file input." },
    KeywordDoc { keyword: "DRAG", signature: "DRAG Page.field1 TO Page.field2", doc: "Drags one element onto another." },
    KeywordDoc { keyword: "LOG", signature: "LOG expr", doc: "Writes a value to the test run's console output." },
    KeywordDoc { keyword: "SCREENSHOT", signature: "SCREENSHOT expr", doc: "Captures a named screenshot baseline." },
    KeywordDoc { keyword: "PERFORM", signature: "PERFORM Page.action WITH a, b", doc: "Calls a reusable action (alias: DO)." },
    KeywordDoc { keyword: "VERIFY", signature: "VERIFY Page.field IS [NOT] condition", doc: "Asserts a condition on an element or the last API response." },
    KeywordDoc { keyword: "IF", signature: "IF cond { ... } ELSE { ... }", doc: "Conditional branch." },
    KeywordDoc { keyword: "REPEAT", signature: "REPEAT n TIMES { ... }", doc: "Runs the body n times." },
    KeywordDoc { keyword: "FOR", signature: "FOR $item IN $collection { ... }", doc: "Iterates a collection, binding $item per body run." },
    KeywordDoc { keyword: "LOAD", signature: "LOAD $name FROM \"table\"", doc: "Legacy VDQL: fetches a table lazily into a variable." },
    KeywordDoc { keyword: "ROW", signature: "ROW $name = FIRST|LAST|RANDOM Table WHERE ...", doc: "Reads a single row from a cached table." },
    KeywordDoc { keyword: "ROWS", signature: "ROWS $name = Table WHERE ... ORDER BY ...", doc: "Reads a list of rows from a cached table." },
    KeywordDoc { keyword: "WHERE", signature: "WHERE column == value", doc: "Filters rows by a comparison or boolean expression." },
    KeywordDoc { keyword: "TRY", signature: "TRY { ... } CATCH { ... }", doc: "Runs the try body, binding $__error in the catch body on failure." },
    KeywordDoc { keyword: "SWITCH", signature: "SWITCH TO NEW TAB | SWITCH TO TAB n", doc: "Changes which browser tab subsequent statements target." },
];

pub fn lookup(word: &str) -> Option<&'static KeywordDoc> {
    let upper = word.to_uppercase();
    TABLE.iter().find(|k| k.keyword == upper)
}

pub fn all_keywords() -> impl Iterator<Item = &'static KeywordDoc> {
    TABLE.iter()
}
