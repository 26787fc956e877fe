//! Assembles translated fragments into a chain of named subqueries.
//!
//! Each step becomes one CTE consuming the previous one by name. The chain is
//! wrapped in a `CREATE OR REPLACE VIEW` statement with a final projection of
//! the last schema. The source table is emitted as a fixed placeholder path;
//! resolving a real table is the caller's concern.

use crate::parser::{StepConfig, StepDescriptor};
use crate::schema::Schema;

/// Name of the implicit node representing the untransformed source table.
pub const SOURCE_NODE_NAME: &str = "source_data";

/// Placeholder substituted for the source table reference in emitted SQL.
pub const PLACEHOLDER_TABLE: &str = "`your_project.your_dataset.your_initial_table`";

/// Placeholder view name in the emitted CREATE statement.
pub const PLACEHOLDER_VIEW: &str = "`your_project.your_dataset.your_view_name`";

/// One element of the assembled subquery chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubqueryNode {
    pub name: String,
    pub schema: Schema,
    pub body: String,
}

/// Generated name for the n-th node in the chain (1-based).
pub fn node_name(index: usize) -> String {
    format!("cte_{index}")
}

/// Build the subquery node for one translated step.
///
/// Projection fragments are SELECT clauses, so the node appends the `FROM`
/// target. Predicate fragments are WHERE clauses; the node wraps them in a
/// pass-through SELECT of the columns *entering* the step, so a filter always
/// re-exposes the full current column set.
pub fn build_node(
    index: usize,
    step: &StepDescriptor,
    fragment: &str,
    input_schema: &Schema,
    output_schema: &Schema,
    previous: &str,
) -> SubqueryNode {
    let body = match &step.config {
        StepConfig::Projection { .. } => format!("{fragment}\nFROM {previous}"),
        _ => format!(
            "SELECT\n    {}\nFROM {previous}\n{fragment}",
            input_schema.select_list()
        ),
    };

    SubqueryNode {
        name: node_name(index),
        schema: output_schema.clone(),
        body,
    }
}

/// Emit the final view script from the assembled chain.
pub fn emit(nodes: &[SubqueryNode], final_schema: &Schema) -> String {
    let Some(last) = nodes.last() else {
        return String::new();
    };

    let chain = nodes
        .iter()
        .map(|node| format!("{} AS (\n{}\n)", node.name, node.body))
        .collect::<Vec<_>>()
        .join(",\n\n");

    // Only the first node references the implicit source.
    let chain = chain.replace(
        &format!("FROM {SOURCE_NODE_NAME}"),
        &format!("FROM {PLACEHOLDER_TABLE}"),
    );

    format!(
        "CREATE OR REPLACE VIEW {PLACEHOLDER_VIEW} AS\nWITH {chain}\n\nSELECT\n    {}\nFROM\n    {};\n",
        final_schema.select_list(),
        last.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn projection_step() -> StepDescriptor {
        StepDescriptor {
            tool_id: "1".to_string(),
            raw_xml: String::new(),
            config: StepConfig::Projection { fields: vec![] },
        }
    }

    fn predicate_step() -> StepDescriptor {
        StepDescriptor {
            tool_id: "2".to_string(),
            raw_xml: String::new(),
            config: StepConfig::Predicate {
                expression: Some("[a] > 1".to_string()),
            },
        }
    }

    fn two_col_schema() -> Schema {
        Schema::from_columns([
            ("transaction_id", ColumnType::String),
            ("total_sales", ColumnType::Float),
        ])
    }

    #[test]
    fn projection_node_appends_from_clause() {
        let node = build_node(
            1,
            &projection_step(),
            "SELECT\n    OrderID AS transaction_id",
            &Schema::source_seed(),
            &two_col_schema(),
            SOURCE_NODE_NAME,
        );
        assert_eq!(node.name, "cte_1");
        assert!(node.body.ends_with("FROM source_data"));
        assert_eq!(node.schema, two_col_schema());
    }

    #[test]
    fn predicate_node_passes_through_input_columns() {
        let schema = two_col_schema();
        let node = build_node(
            2,
            &predicate_step(),
            "WHERE total_sales > 1000",
            &schema,
            &schema,
            "cte_1",
        );
        assert_eq!(node.name, "cte_2");
        assert!(node
            .body
            .starts_with("SELECT\n    transaction_id, total_sales\nFROM cte_1"));
        assert!(node.body.ends_with("WHERE total_sales > 1000"));
    }

    #[test]
    fn emit_substitutes_source_placeholder_and_terminates() {
        let schema = two_col_schema();
        let nodes = vec![
            build_node(
                1,
                &projection_step(),
                "SELECT\n    OrderID AS transaction_id,\n    SalesAmount AS total_sales",
                &Schema::source_seed(),
                &schema,
                SOURCE_NODE_NAME,
            ),
            build_node(
                2,
                &predicate_step(),
                "WHERE total_sales > 1000",
                &schema,
                &schema,
                "cte_1",
            ),
        ];

        let sql = emit(&nodes, &schema);
        assert!(sql.starts_with(&format!("CREATE OR REPLACE VIEW {PLACEHOLDER_VIEW} AS")));
        assert!(sql.contains(&format!("FROM {PLACEHOLDER_TABLE}")));
        assert!(!sql.contains("FROM source_data"));
        assert!(sql.contains("WITH cte_1 AS ("));
        assert!(sql.contains("),\n\ncte_2 AS ("));
        assert!(sql.trim_end().ends_with("FROM\n    cte_2;"));
        assert!(sql.contains("SELECT\n    transaction_id, total_sales\nFROM\n    cte_2;"));
    }

    #[test]
    fn emit_with_no_nodes_is_empty() {
        assert_eq!(emit(&[], &Schema::source_seed()), "");
    }
}
