//! Predicate combinators (spec §4.4 "Predicates compile via helper
//! combinators"). These are the runtime counterparts of the names the
//! transpiler's VDQL lowering emits (`eq`, `contains`, `isIn`, `and`, ...),
//! so a generated call chain like `.where(and(eq('status', 'ACTIVE'),
//! gt('age', 18)))` resolves directly against this module's vocabulary.

use crate::row::{Row, Value};
use regex::Regex;

pub type Predicate = Box<dyn Fn(&Row) -> bool + Send + Sync>;

fn column(row: &Row, name: &str) -> Value {
    row.get(name).cloned().unwrap_or(Value::Null)
}

fn compare_numeric(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

pub fn eq(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| column(row, &col) == value)
}

pub fn neq(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| column(row, &col) != value)
}

pub fn gt(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| compare_numeric(&column(row, &col), &value) == Some(std::cmp::Ordering::Greater))
}

pub fn lt(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| compare_numeric(&column(row, &col), &value) == Some(std::cmp::Ordering::Less))
}

pub fn gte(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| {
        matches!(
            compare_numeric(&column(row, &col), &value),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        )
    })
}

pub fn lte(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| {
        matches!(
            compare_numeric(&column(row, &col), &value),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        )
    })
}

pub fn contains(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| match (column(row, &col).as_str(), value.as_str()) {
        (Some(haystack), Some(needle)) => haystack.contains(needle),
        _ => false,
    })
}

pub fn starts_with(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| match (column(row, &col).as_str(), value.as_str()) {
        (Some(haystack), Some(needle)) => haystack.starts_with(needle),
        _ => false,
    })
}

pub fn ends_with(col: impl Into<String>, value: Value) -> Predicate {
    let col = col.into();
    Box::new(move |row| match (column(row, &col).as_str(), value.as_str()) {
        (Some(haystack), Some(needle)) => haystack.ends_with(needle),
        _ => false,
    })
}

pub fn matches(col: impl Into<String>, pattern: Value) -> Predicate {
    let col = col.into();
    let compiled = pattern.as_str().and_then(|p| Regex::new(p).ok());
    Box::new(move |row| match (&compiled, column(row, &col).as_str()) {
        (Some(re), Some(s)) => re.is_match(s),
        _ => false,
    })
}

pub fn is_in(col: impl Into<String>, values: Vec<Value>) -> Predicate {
    let col = col.into();
    Box::new(move |row| values.contains(&column(row, &col)))
}

pub fn not_in(col: impl Into<String>, values: Vec<Value>) -> Predicate {
    let col = col.into();
    Box::new(move |row| !values.contains(&column(row, &col)))
}

pub fn is_empty(col: impl Into<String>) -> Predicate {
    let col = col.into();
    Box::new(move |row| column(row, &col).is_empty_value())
}

pub fn is_not_empty(col: impl Into<String>) -> Predicate {
    let col = col.into();
    Box::new(move |row| !column(row, &col).is_empty_value())
}

pub fn is_null(col: impl Into<String>) -> Predicate {
    let col = col.into();
    Box::new(move |row| column(row, &col).is_null())
}

pub fn and(a: Predicate, b: Predicate) -> Predicate {
    Box::new(move |row| a(row) && b(row))
}

pub fn or(a: Predicate, b: Predicate) -> Predicate {
    Box::new(move |row| a(row) || b(row))
}

pub fn not(a: Predicate) -> Predicate {
    Box::new(move |row| !a(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(col: &str, value: Value) -> Row {
        let mut row = Row::new();
        row.insert(col, value);
        row
    }

    #[test]
    fn eq_matches_equal_value() {
        let pred = eq("status", Value::String("ACTIVE".to_string()));
        assert!(pred(&row_with("status", Value::String("ACTIVE".to_string()))));
        assert!(!pred(&row_with("status", Value::String("DONE".to_string()))));
    }

    #[test]
    fn and_short_circuits_correctly() {
        let pred = and(
            eq("status", Value::String("ACTIVE".to_string())),
            gt("age", Value::Number(18.0)),
        );
        let mut row = Row::new();
        row.insert("status", Value::String("ACTIVE".to_string()));
        row.insert("age", Value::Number(21.0));
        assert!(pred(&row));
    }

    #[test]
    fn is_empty_treats_null_and_empty_string_as_empty() {
        assert!(is_empty("x")(&row_with("x", Value::Null)));
        assert!(is_empty("x")(&row_with("x", Value::String(String::new()))));
        assert!(!is_empty("x")(&row_with("x", Value::String("a".to_string()))));
    }
}
