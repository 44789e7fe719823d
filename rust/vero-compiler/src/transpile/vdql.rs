//! Lowers VDQL (`ROW`/`ROWS`/aggregation) nodes to `DataManager`/`QueryBuilder`
//! call chains (spec §4.4 "VDQL lowering").

use crate::compiler::ast::*;
use crate::transpile::lower::lower_expr;

/// `Project.Table` lowers to a named project data manager instead of the
/// default `dataManager` (spec §4.4 "Cross-project references").
fn manager_expr(table_ref: &TableRef) -> String {
    match &table_ref.project {
        Some(project) => format!("{}Data", project),
        None => "dataManager".to_string(),
    }
}

fn comparison_op_call(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Eq => "eq",
        ComparisonOp::NotEq => "neq",
        ComparisonOp::Gt => "gt",
        ComparisonOp::Lt => "lt",
        ComparisonOp::GtEq => "gte",
        ComparisonOp::LtEq => "lte",
        ComparisonOp::Contains => "contains",
        ComparisonOp::StartsWith => "startsWith",
        ComparisonOp::EndsWith => "endsWith",
        ComparisonOp::Matches => "matches",
        ComparisonOp::In => "isIn",
        ComparisonOp::NotIn => "notIn",
        ComparisonOp::IsNull => "isNull",
        ComparisonOp::IsEmpty => "isEmpty",
        ComparisonOp::IsNotEmpty => "isNotEmpty",
    }
}

fn lower_comparison(c: &Comparison) -> String {
    let call = comparison_op_call(c.operator);
    if let Some(values) = &c.values {
        let items: Vec<String> = values.iter().map(lower_expr).collect();
        return format!("{}('{}', [{}])", call, c.column, items.join(", "));
    }
    match &c.value {
        Some(v) => format!("{}('{}', {})", call, c.column, lower_expr(v)),
        None => format!("{}('{}')", call, c.column),
    }
}

pub fn lower_data_condition(cond: &DataCondition) -> String {
    match cond {
        DataCondition::And(a, b) => format!(
            "and({}, {})",
            lower_data_condition(a),
            lower_data_condition(b)
        ),
        DataCondition::Or(a, b) => format!(
            "or({}, {})",
            lower_data_condition(a),
            lower_data_condition(b)
        ),
        DataCondition::Not(inner) => format!("not({})", lower_data_condition(inner)),
        DataCondition::Comparison(c) => lower_comparison(c),
    }
}

fn table_ref_base(table_ref: &TableRef) -> String {
    format!(
        "{}.query('{}')",
        manager_expr(table_ref),
        table_ref.table_name
    )
}

fn apply_table_ref_plan(table_ref: &TableRef) -> String {
    let mut chain = table_ref_base(table_ref);
    if let Some(i) = table_ref.row_index {
        chain.push_str(&format!(".row({})", i));
    }
    if let Some((a, b)) = table_ref.range {
        chain.push_str(&format!(".range({}, {})", a, b));
    }
    if let Some((r, c)) = table_ref.cell {
        chain.push_str(&format!(".cell({}, {})", r, c));
    }
    if let Some(columns) = &table_ref.columns {
        if columns.len() > 1 {
            let cols: Vec<String> = columns.iter().map(|c| format!("'{}'", c)).collect();
            chain.push_str(&format!(".select([{}])", cols.join(", ")));
        }
    }
    chain
}

/// Lowers a `TableQuery` into a `DataManager.query(...)` chain ending in the
/// appropriate terminal operation (spec order: row/range/filter/orderBy/
/// offset/limit/projection, terminal last).
pub fn lower_table_query(q: &TableQuery) -> String {
    let mut chain = apply_table_ref_plan(&q.table_ref);

    if let Some(cond) = &q.where_clause {
        chain.push_str(&format!(".where({})", lower_data_condition(cond)));
    }
    if !q.order_by.is_empty() {
        let specs: Vec<String> = q
            .order_by
            .iter()
            .map(|(col, dir)| {
                let dir_str = match dir {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("{{ column: '{}', direction: '{}' }}", col, dir_str)
            })
            .collect();
        chain.push_str(&format!(".orderBy([{}])", specs.join(", ")));
    }
    if let Some(offset) = q.offset {
        chain.push_str(&format!(".offset({})", offset));
    }
    if let Some(limit) = q.limit {
        chain.push_str(&format!(".limit({})", limit));
    }

    let terminal = match q.position {
        Some(Position::First) => ".first()".to_string(),
        Some(Position::Last) => ".last()".to_string(),
        Some(Position::Random) => ".random()".to_string(),
        None => ".execute()".to_string(),
    };
    chain.push_str(&terminal);

    if let Some(default) = &q.default_value {
        chain = format!("({} ?? {})", chain, lower_expr(default));
    }
    chain
}

fn aggregation_call(func: AggregationFunction, column: &Option<String>, distinct: bool) -> String {
    match func {
        AggregationFunction::Count => {
            if distinct {
                match column {
                    Some(c) => format!(".countDistinct('{}')", c),
                    None => ".countDistinct()".to_string(),
                }
            } else {
                ".count()".to_string()
            }
        }
        AggregationFunction::Sum => format!(".sum('{}')", column.as_deref().unwrap_or("")),
        AggregationFunction::Average => format!(".average('{}')", column.as_deref().unwrap_or("")),
        AggregationFunction::Min => format!(".min('{}')", column.as_deref().unwrap_or("")),
        AggregationFunction::Max => format!(".max('{}')", column.as_deref().unwrap_or("")),
        AggregationFunction::Distinct => format!(".distinct('{}')", column.as_deref().unwrap_or("")),
        AggregationFunction::Rows => ".rowCount()".to_string(),
        AggregationFunction::Columns => ".columnCount()".to_string(),
        AggregationFunction::Headers => ".headers()".to_string(),
    }
}

pub fn lower_aggregation_query(q: &AggregationQuery) -> String {
    let mut chain = apply_table_ref_plan(&q.table_ref);
    if let Some(cond) = &q.where_clause {
        chain.push_str(&format!(".where({})", lower_data_condition(cond)));
    }
    chain.push_str(&aggregation_call(q.function, &q.column, q.distinct));
    chain
}

pub fn lower_data_query(q: &DataQuery) -> String {
    match q {
        DataQuery::Table(t) => lower_table_query(t),
        DataQuery::Aggregation(a) => lower_aggregation_query(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_ref(name: &str) -> TableRef {
        TableRef {
            project: None,
            table_name: name.to_string(),
            column: None,
            row_index: None,
            range: None,
            cell: None,
            columns: None,
            span: vero_core::Span::dummy(),
        }
    }

    #[test]
    fn simple_row_query_lowers_to_first() {
        let q = TableQuery {
            table_ref: table_ref("Users"),
            columns: None,
            where_clause: None,
            order_by: vec![],
            limit: None,
            offset: None,
            position: Some(Position::First),
            default_value: None,
        };
        assert_eq!(lower_table_query(&q), "dataManager.query('Users').first()");
    }

    #[test]
    fn cross_project_table_uses_named_manager() {
        let mut t = table_ref("Users");
        t.project = Some("Accounts".to_string());
        let q = TableQuery {
            table_ref: t,
            columns: None,
            where_clause: None,
            order_by: vec![],
            limit: None,
            offset: None,
            position: None,
            default_value: None,
        };
        assert!(lower_table_query(&q).starts_with("AccountsData.query('Users')"));
    }

    #[test]
    fn count_distinct_lowers_correctly() {
        let q = AggregationQuery {
            table_ref: table_ref("Orders"),
            function: AggregationFunction::Count,
            column: Some("customerId".to_string()),
            where_clause: None,
            distinct: true,
        };
        assert_eq!(
            lower_aggregation_query(&q),
            "dataManager.query('Orders').countDistinct('customerId')"
        );
    }
}
