//! alteryx2sql - LLM-powered conversion of Alteryx workflow XML into BigQuery
//! SQL views.
//!
//! The pipeline decomposes a workflow into ordered step descriptors, threads a
//! column schema across the steps, asks the generation service for one SQL
//! fragment per step, and folds the fragments into a chain of named subqueries
//! terminating in a final projection.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use alteryx2sql::{GeminiClient, LlmClient, WorkflowConverter};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client: Arc<dyn LlmClient> = Arc::new(GeminiClient::from_env()?);
//! let converter = WorkflowConverter::new(client);
//! let result = converter.convert(alteryx2sql::EXAMPLE_WORKFLOW_XML).await;
//! println!("{}", result.sql);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Schema model threaded through the subquery chain
pub mod schema;

// Workflow document parsing
pub mod parser;

// LLM clients
pub mod llm;

// Per-step prompt construction and translation
pub mod translator;

// Subquery chain assembly and final emission
pub mod assembler;

// End-to-end conversion sequencing
pub mod orchestrator;

pub use assembler::{SubqueryNode, PLACEHOLDER_TABLE, PLACEHOLDER_VIEW, SOURCE_NODE_NAME};
pub use error::{ConvertError, ConvertResult};
pub use llm::{GeminiClient, GeminiConfig, LlmClient};
pub use orchestrator::{ConversionResult, WorkflowConverter};
pub use parser::{parse_workflow, FieldSelection, StepConfig, StepDescriptor};
pub use schema::{ColumnType, Schema};

/// The canonical two-step example workflow: a Select with renames followed by
/// a Filter on the renamed columns. Used by the CLI demo and the test suite.
pub const EXAMPLE_WORKFLOW_XML: &str = r#"<AlteryxWorkflow>
  <Node ToolID="1" Type="Select">
    <Name>Select Columns</Name>
    <Configuration>
      <Fields>
        <Field Name="OrderID" Selected="True" Rename="transaction_id" />
        <Field Name="CustomerName" Selected="True" />
        <Field Name="ProductCategory" Selected="False" />
        <Field Name="SalesAmount" Selected="True" Rename="total_sales" />
      </Fields>
    </Configuration>
  </Node>
  <Node ToolID="2" Type="Filter">
    <Name>Filter High Sales</Name>
    <Configuration>
      <Expression>[total_sales] > 1000 AND [CustomerName] = 'Alice'</Expression>
    </Configuration>
  </Node>
</AlteryxWorkflow>
"#;
