//! `Row`/`Table`: the runtime data model queries operate over (spec §3.5).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A column value: one of the four scalar kinds the host language's data
/// service can return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// An ordered mapping of column name to value. Preserves insertion order so
/// `.select([cols])` projection and `.headers()` report columns in the
/// order the data service sent them, not alphabetically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<String>,
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        if !self.values.contains_key(&column) {
            self.columns.push(column.clone());
        }
        self.values.insert(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// A new row containing only the given columns, in the order requested.
    pub fn project(&self, columns: &[String]) -> Row {
        let mut out = Row::new();
        for c in columns {
            let v = self.get(c).cloned().unwrap_or(Value::Null);
            out.insert(c.clone(), v);
        }
        out
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

pub type Table = Vec<Row>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_order() {
        let mut row = Row::new();
        row.insert("b", Value::Number(2.0));
        row.insert("a", Value::Number(1.0));
        assert_eq!(row.columns(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn project_fills_missing_with_null() {
        let mut row = Row::new();
        row.insert("id", Value::Number(1.0));
        let projected = row.project(&["id".to_string(), "name".to_string()]);
        assert_eq!(projected.get("name"), Some(&Value::Null));
    }
}
