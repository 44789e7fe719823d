//! The immutable, chainable `QueryBuilder` (spec §3.5). Every builder method
//! returns a new builder with an extended plan; nothing executes until a
//! terminal operation runs it once against the snapshot table.

use crate::predicate::Predicate;
use crate::row::{Row, Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The builder's pending plan. Steps are applied in this exact order
/// (spec §4.4 VDQL lowering order): row/range/cell index → `where` →
/// `orderBy` → `offset` → `limit` → column projection.
#[derive(Default, Clone)]
struct Plan {
    row_index: Option<i64>,
    range: Option<(i64, i64)>,
    cell: Option<(i64, i64)>,
    order_by: Vec<(String, SortDirection)>,
    offset: Option<i64>,
    limit: Option<i64>,
    columns: Option<Vec<String>>,
}

/// A pseudo-random index derived from table length and a fixed seed, kept
/// deterministic so repeated `.random()` calls in a single process are
/// reproducible for test debugging; callers needing true randomness reseed
/// externally.
fn pseudo_random_index(len: usize, seed: u64) -> usize {
    if len == 0 {
        return 0;
    }
    ((seed.wrapping_mul(2654435761) >> 16) as usize) % len
}

pub struct QueryBuilder {
    table: Table,
    plan: Plan,
    where_predicate: Option<Predicate>,
    random_seed: u64,
}

impl Clone for QueryBuilder {
    fn clone(&self) -> Self {
        // `Predicate` is a boxed closure and cannot be cloned without
        // re-evaluating the where-clause chain; callers should build the
        // full chain before branching rather than cloning mid-plan.
        QueryBuilder {
            table: self.table.clone(),
            plan: self.plan.clone(),
            where_predicate: None,
            random_seed: self.random_seed,
        }
    }
}

impl QueryBuilder {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            plan: Plan::default(),
            where_predicate: None,
            random_seed: 0,
        }
    }

    pub fn row(mut self, index: i64) -> Self {
        self.plan.row_index = Some(index);
        self
    }

    pub fn range(mut self, start: i64, end: i64) -> Self {
        self.plan.range = Some((start, end));
        self
    }

    pub fn cell(mut self, row: i64, col: i64) -> Self {
        self.plan.cell = Some((row, col));
        self
    }

    pub fn select(mut self, columns: Vec<String>) -> Self {
        self.plan.columns = Some(columns);
        self
    }

    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.where_predicate = Some(predicate);
        self
    }

    pub fn order_by(mut self, specs: Vec<(String, SortDirection)>) -> Self {
        self.plan.order_by = specs;
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.plan.offset = Some(n);
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.plan.limit = Some(n);
        self
    }

    fn resolve_index(len: usize, index: i64) -> Option<usize> {
        let idx = if index < 0 { len as i64 + index } else { index };
        if idx < 0 || idx as usize >= len {
            None
        } else {
            Some(idx as usize)
        }
    }

    /// Runs the full plan once against the snapshot table and returns the
    /// materialized rows (spec: "the plan is pure; the terminal operation
    /// materializes once").
    fn materialize(&self) -> Vec<Row> {
        let mut rows: Vec<Row> = self.table.clone();

        if let Some(i) = self.plan.row_index {
            rows = Self::resolve_index(rows.len(), i)
                .map(|idx| vec![rows[idx].clone()])
                .unwrap_or_default();
        }
        if let Some((a, b)) = self.plan.range {
            let len = rows.len();
            let start = Self::resolve_index(len, a).unwrap_or(0);
            let end = Self::resolve_index(len, b).map(|e| e + 1).unwrap_or(len);
            rows = if start < end {
                rows[start..end.min(len)].to_vec()
            } else {
                Vec::new()
            };
        }
        if let Some((r, c)) = self.plan.cell {
            rows = Self::resolve_index(rows.len(), r)
                .and_then(|ri| {
                    let row = &rows[ri];
                    let col_name = row.columns().get(if c < 0 { (row.columns().len() as i64 + c) as usize } else { c as usize })?;
                    row.get(col_name).map(|v| {
                        let mut single = Row::new();
                        single.insert(col_name.clone(), v.clone());
                        vec![single]
                    })
                })
                .unwrap_or_default();
        }

        if let Some(pred) = &self.where_predicate {
            rows.retain(|r| pred(r));
        }

        if !self.plan.order_by.is_empty() {
            rows.sort_by(|a, b| {
                for (col, dir) in &self.plan.order_by {
                    let av = a.get(col).cloned().unwrap_or(Value::Null);
                    let bv = b.get(col).cloned().unwrap_or(Value::Null);
                    let ord = compare_values(&av, &bv);
                    let ord = match dir {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    };
                    if ord != std::cmp::Ordering::Equal {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }

        if let Some(offset) = self.plan.offset {
            let skip = offset.max(0) as usize;
            rows = rows.into_iter().skip(skip).collect();
        }
        if let Some(limit) = self.plan.limit {
            let take = limit.max(0) as usize;
            rows.truncate(take);
        }

        if let Some(columns) = &self.plan.columns {
            if columns.len() > 1 {
                rows = rows.iter().map(|r| r.project(columns)).collect();
            } else if let Some(col) = columns.first() {
                rows = rows.iter().map(|r| r.project(std::slice::from_ref(col))).collect();
            }
        }

        rows
    }

    pub fn execute(&self) -> Table {
        self.materialize()
    }

    pub fn first(&self) -> Option<Row> {
        self.materialize().into_iter().next()
    }

    pub fn last(&self) -> Option<Row> {
        self.materialize().into_iter().next_back()
    }

    pub fn random(&self) -> Option<Row> {
        let rows = self.materialize();
        let idx = pseudo_random_index(rows.len(), self.random_seed);
        rows.into_iter().nth(idx)
    }

    /// Deterministic-seed hook for tests that need reproducible `.random()`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn count(&self) -> i64 {
        self.materialize().len() as i64
    }

    pub fn count_distinct(&self, column: &str) -> i64 {
        let rows = self.materialize();
        let mut seen: Vec<Value> = Vec::new();
        for row in &rows {
            if let Some(v) = row.get(column) {
                if !seen.contains(v) {
                    seen.push(v.clone());
                }
            }
        }
        seen.len() as i64
    }

    pub fn sum(&self, column: &str) -> f64 {
        self.materialize()
            .iter()
            .filter_map(|r| r.get(column).and_then(Value::as_f64))
            .sum()
    }

    pub fn average(&self, column: &str) -> f64 {
        let values: Vec<f64> = self
            .materialize()
            .iter()
            .filter_map(|r| r.get(column).and_then(Value::as_f64))
            .collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// Returns 0 for an empty filtered set (spec P10), not `None` — VDQL's
    /// `MIN`/`MAX` are always-numeric aggregations, never optional values.
    pub fn min(&self, column: &str) -> f64 {
        self.materialize()
            .iter()
            .filter_map(|r| r.get(column).and_then(Value::as_f64))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
            .unwrap_or(0.0)
    }

    pub fn max(&self, column: &str) -> f64 {
        self.materialize()
            .iter()
            .filter_map(|r| r.get(column).and_then(Value::as_f64))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0)
    }

    pub fn distinct(&self, column: &str) -> Vec<Value> {
        let mut seen: Vec<Value> = Vec::new();
        for row in self.materialize() {
            if let Some(v) = row.get(column) {
                if !seen.contains(v) {
                    seen.push(v.clone());
                }
            }
        }
        seen
    }

    pub fn row_count(&self) -> i64 {
        self.materialize().len() as i64
    }

    pub fn column_count(&self) -> i64 {
        self.materialize().first().map(|r| r.columns().len()).unwrap_or(0) as i64
    }

    pub fn headers(&self) -> Vec<String> {
        self.materialize()
            .first()
            .map(|r| r.columns().to_vec())
            .unwrap_or_default()
    }
}

fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Null, Value::Null) => std::cmp::Ordering::Equal,
        (Value::Null, _) => std::cmp::Ordering::Less,
        (_, Value::Null) => std::cmp::Ordering::Greater,
        _ => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    fn sample_table() -> Table {
        vec![
            Row::from_iter([
                ("id".to_string(), Value::Number(1.0)),
                ("name".to_string(), Value::String("Alice".to_string())),
            ]),
            Row::from_iter([
                ("id".to_string(), Value::Number(2.0)),
                ("name".to_string(), Value::String("Bob".to_string())),
            ]),
            Row::from_iter([
                ("id".to_string(), Value::Number(3.0)),
                ("name".to_string(), Value::String("Carol".to_string())),
            ]),
        ]
    }

    #[test]
    fn where_then_first_applies_filter_before_terminal() {
        let qb = QueryBuilder::new(sample_table())
            .where_(predicate::gt("id", Value::Number(1.0)));
        let first = qb.first().unwrap();
        assert_eq!(first.get("id"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn order_by_desc_then_limit() {
        let qb = QueryBuilder::new(sample_table())
            .order_by(vec![("id".to_string(), SortDirection::Desc)])
            .limit(1);
        let rows = qb.execute();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn negative_row_index_counts_from_end() {
        let qb = QueryBuilder::new(sample_table()).row(-1);
        let row = qb.first().unwrap();
        assert_eq!(row.get("name"), Some(&Value::String("Carol".to_string())));
    }

    #[test]
    fn count_distinct_counts_unique_values() {
        let qb = QueryBuilder::new(sample_table());
        assert_eq!(qb.count_distinct("name"), 3);
    }

    #[test]
    fn aggregations_on_an_empty_filtered_set() {
        let qb = QueryBuilder::new(sample_table()).where_(predicate::gt("id", Value::Number(100.0)));
        assert_eq!(qb.sum("id"), 0.0);
        assert_eq!(qb.average("id"), 0.0);
        assert_eq!(qb.min("id"), 0.0);
        assert_eq!(qb.max("id"), 0.0);
        assert!(qb.distinct("id").is_empty());
    }
}
