//! End-to-end conversion pipeline tests.
//!
//! The generation service is replaced by a scripted double that replays a
//! fixed sequence of fragments (or failures), so every assertion here is
//! deterministic.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use alteryx2sql::{
    parse_workflow, ColumnType, LlmClient, Schema, StepConfig, WorkflowConverter,
    EXAMPLE_WORKFLOW_XML, PLACEHOLDER_TABLE, PLACEHOLDER_VIEW,
};

/// Generation double that replays a fixed script of responses.
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
        })
    }

    fn ok(fragments: &[&str]) -> Arc<Self> {
        Self::new(fragments.iter().map(|f| Ok(f.to_string())).collect())
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        let next = self
            .responses
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .ok_or_else(|| anyhow!("script exhausted: unexpected generation call"))?;
        next.map_err(|cause| anyhow!(cause))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

const SELECT_FRAGMENT: &str =
    "SELECT\n    OrderID AS transaction_id,\n    CustomerName,\n    SalesAmount AS total_sales";
const FILTER_FRAGMENT: &str = "WHERE total_sales > 1000 AND CustomerName = 'Alice'";

fn example_converter(client: Arc<ScriptedClient>) -> WorkflowConverter {
    WorkflowConverter::new(client)
}

#[tokio::test]
async fn two_step_example_produces_chained_view() {
    let client = ScriptedClient::ok(&[SELECT_FRAGMENT, FILTER_FRAGMENT]);
    let result = example_converter(client).convert(EXAMPLE_WORKFLOW_XML).await;

    assert!(!result.sql.is_empty());
    assert!(result.sql.starts_with(&format!(
        "CREATE OR REPLACE VIEW {PLACEHOLDER_VIEW} AS"
    )));
    // One node per parsed step, chained in tool-id order.
    assert!(result.sql.contains("WITH cte_1 AS ("));
    assert!(result.sql.contains("cte_2 AS ("));
    assert!(result.sql.matches(" AS (").count() == 2);
    assert!(result.sql.find("cte_1 AS (").unwrap() < result.sql.find("cte_2 AS (").unwrap());
    // Source placeholder substitution.
    assert!(result.sql.contains(&format!("FROM {PLACEHOLDER_TABLE}")));
    assert!(!result.sql.contains("FROM source_data"));
    // Filter consumes the projection by name and passes its columns through.
    assert!(result
        .sql
        .contains("SELECT\n    transaction_id, CustomerName, total_sales\nFROM cte_1"));
    assert!(result.sql.contains(FILTER_FRAGMENT));
    // Final projection of the last schema from the last node.
    assert!(result
        .sql
        .trim_end()
        .ends_with("SELECT\n    transaction_id, CustomerName, total_sales\nFROM\n    cte_2;"));

    // Narrative covers parse status, each step and the confirmation.
    assert!(result.message.contains("XML parsed successfully"));
    assert!(result.message.contains("Processing Select tool (ID: 1)"));
    assert!(result.message.contains("Processing Filter tool (ID: 2)"));
    assert!(result.message.contains("Conversion completed successfully"));
}

#[tokio::test]
async fn projection_schema_follows_selected_and_renamed_fields() {
    let xml = r#"<AlteryxWorkflow>
  <Node ToolID="1" Type="Select">
    <Configuration>
      <Fields>
        <Field Name="OrderID" Selected="True" Rename="transaction_id" />
        <Field Name="CustomerName" Selected="False" />
        <Field Name="ProductCategory" Selected="False" />
        <Field Name="SalesAmount" Selected="True" Rename="total_sales" />
      </Fields>
    </Configuration>
  </Node>
</AlteryxWorkflow>"#;

    // Schema model scenario from the seed schema.
    let steps = parse_workflow(xml).unwrap();
    let StepConfig::Projection { fields } = &steps[0].config else {
        panic!("expected projection step");
    };
    let projected = Schema::source_seed().project(fields);
    assert_eq!(
        projected,
        Schema::from_columns([
            ("transaction_id", ColumnType::String),
            ("total_sales", ColumnType::Float),
        ])
    );

    // And the emitted script's final projection matches it.
    let client = ScriptedClient::ok(&["SELECT\n    OrderID AS transaction_id,\n    SalesAmount AS total_sales"]);
    let result = example_converter(client).convert(xml).await;
    assert!(result
        .sql
        .contains("SELECT\n    transaction_id, total_sales\nFROM\n    cte_1;"));
    assert!(!result.sql.contains("ProductCategory"));
}

#[tokio::test]
async fn predicate_pass_through_uses_schema_entering_the_step() {
    // Projection drops CustomerName, then a filter follows. The filter node's
    // pass-through column list must be the post-projection schema (the schema
    // entering the filter), nothing more.
    let xml = r#"<AlteryxWorkflow>
  <Node ToolID="1" Type="Select">
    <Configuration>
      <Fields>
        <Field Name="OrderID" Selected="True" Rename="transaction_id" />
        <Field Name="CustomerName" Selected="False" />
        <Field Name="SalesAmount" Selected="True" Rename="total_sales" />
      </Fields>
    </Configuration>
  </Node>
  <Node ToolID="2" Type="Filter">
    <Configuration>
      <Expression>[total_sales] > 1000</Expression>
    </Configuration>
  </Node>
</AlteryxWorkflow>"#;

    let client = ScriptedClient::ok(&[
        "SELECT\n    OrderID AS transaction_id,\n    SalesAmount AS total_sales",
        "WHERE total_sales > 1000",
    ]);
    let result = example_converter(client).convert(xml).await;

    let cte_2 = result
        .sql
        .split("cte_2 AS (")
        .nth(1)
        .expect("second node present");
    assert!(cte_2.contains("SELECT\n    transaction_id, total_sales\nFROM cte_1"));
    assert!(!cte_2.contains("CustomerName"));
}

#[tokio::test]
async fn colliding_renames_collapse_in_emitted_column_lists() {
    // Two fields renamed to the same output name must yield one schema entry
    // (last type wins), so neither the filter pass-through nor the final
    // projection renders a duplicated column.
    let xml = r#"<AlteryxWorkflow>
  <Node ToolID="1" Type="Select">
    <Configuration>
      <Fields>
        <Field Name="OrderID" Selected="True" Rename="x" />
        <Field Name="SalesAmount" Selected="True" Rename="x" />
      </Fields>
    </Configuration>
  </Node>
  <Node ToolID="2" Type="Filter">
    <Configuration>
      <Expression>[x] > 1000</Expression>
    </Configuration>
  </Node>
</AlteryxWorkflow>"#;

    let client = ScriptedClient::ok(&["SELECT\n    SalesAmount AS x", "WHERE x > 1000"]);
    let result = example_converter(client).convert(xml).await;

    assert!(result.sql.contains("SELECT\n    x\nFROM cte_1"));
    assert!(result
        .sql
        .trim_end()
        .ends_with("SELECT\n    x\nFROM\n    cte_2;"));
    assert!(!result.sql.contains("x, x"));
}

#[tokio::test]
async fn identical_input_and_responses_give_identical_output() {
    let first = example_converter(ScriptedClient::ok(&[SELECT_FRAGMENT, FILTER_FRAGMENT]))
        .convert(EXAMPLE_WORKFLOW_XML)
        .await;
    let second = example_converter(ScriptedClient::ok(&[SELECT_FRAGMENT, FILTER_FRAGMENT]))
        .convert(EXAMPLE_WORKFLOW_XML)
        .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn generation_failure_discards_earlier_fragments() {
    let client = ScriptedClient::new(vec![
        Ok("SELECT\n    OrderID AS leak_marker".to_string()),
        Err("model backend unavailable".to_string()),
    ]);
    let result = example_converter(client).convert(EXAMPLE_WORKFLOW_XML).await;

    assert!(result.sql.is_empty());
    assert!(result.message.contains("ToolID 2"));
    assert!(result.message.contains("model backend unavailable"));
    // No fragment from the successful first step leaks anywhere.
    assert!(!result.sql.contains("leak_marker"));
    assert!(!result.message.contains("leak_marker"));
}

#[tokio::test]
async fn unsupported_tool_short_circuits_whole_conversion() {
    let xml = r#"<AlteryxWorkflow>
  <Node ToolID="1" Type="Select">
    <Configuration>
      <Fields>
        <Field Name="OrderID" Selected="True" />
      </Fields>
    </Configuration>
  </Node>
  <Node ToolID="2" Type="Formula">
    <Configuration />
  </Node>
</AlteryxWorkflow>"#;

    let client = ScriptedClient::ok(&["SELECT\n    OrderID"]);
    let result = example_converter(client).convert(xml).await;

    assert!(result.sql.is_empty());
    assert!(result.message.contains("'Formula'"));
    assert!(result.message.contains("ToolID: 2"));
}

#[tokio::test]
async fn document_without_recognizable_steps_is_informational() {
    let client = ScriptedClient::ok(&[]);
    let result = example_converter(client)
        .convert("<AlteryxWorkflow>\n  nothing to see here\n</AlteryxWorkflow>")
        .await;

    assert!(result.sql.is_empty());
    assert!(result.message.contains("No recognizable"));
}

#[tokio::test]
async fn missing_container_reports_structural_error() {
    let client = ScriptedClient::ok(&[]);
    let result = example_converter(client).convert("not a workflow at all").await;

    assert!(result.sql.is_empty());
    assert!(result.message.contains("<AlteryxWorkflow>"));
}

#[tokio::test]
async fn filter_without_expression_still_translates() {
    let xml = r#"<AlteryxWorkflow>
  <Node ToolID="1" Type="Filter">
    <Configuration />
  </Node>
</AlteryxWorkflow>"#;

    let client = ScriptedClient::ok(&["WHERE TRUE"]);
    let result = example_converter(client).convert(xml).await;

    assert!(!result.sql.is_empty());
    // Filter leaves the seed schema untouched.
    assert!(result.sql.contains(
        "SELECT\n    OrderID, CustomerName, ProductCategory, SalesAmount\nFROM"
    ));
    assert!(result.sql.contains("WHERE TRUE"));
}
