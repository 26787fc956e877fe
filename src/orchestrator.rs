//! Conversion orchestrator.
//!
//! Sequences parser → per-step translation → assembly. Strictly sequential:
//! each step's prompt embeds the schema and subquery name produced by its
//! predecessor, so no step may start before the previous one is finalized.
//! All failures are folded into the uniform [`ConversionResult`] shape; no
//! error escapes [`WorkflowConverter::convert`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assembler::{self, SubqueryNode, SOURCE_NODE_NAME};
use crate::error::ConvertError;
use crate::llm::LlmClient;
use crate::parser::{self, StepConfig};
use crate::schema::Schema;
use crate::translator;

/// Final result of one conversion.
///
/// `sql` is empty when no recognizable steps were found or any step failed;
/// `message` is always a non-empty human-readable narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub sql: String,
    pub message: String,
}

/// Drives one workflow conversion end to end.
///
/// The generation client is injected at construction; the converter holds no
/// other state, so concurrent conversions are independent.
pub struct WorkflowConverter {
    client: Arc<dyn LlmClient>,
    seed_schema: Schema,
}

impl WorkflowConverter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            seed_schema: Schema::source_seed(),
        }
    }

    /// Replace the seed schema describing the source table.
    pub fn with_seed_schema(mut self, schema: Schema) -> Self {
        self.seed_schema = schema;
        self
    }

    /// Convert a workflow document into a SQL view script.
    pub async fn convert(&self, workflow_xml: &str) -> ConversionResult {
        let steps = match parser::parse_workflow(workflow_xml) {
            Ok(steps) => steps,
            Err(err) => {
                warn!("workflow parse failed: {err}");
                return ConversionResult {
                    sql: String::new(),
                    message: format!(
                        "Error: {err}. Please ensure the workflow is wrapped in <AlteryxWorkflow> tags."
                    ),
                };
            }
        };

        if steps.is_empty() {
            return ConversionResult {
                sql: String::new(),
                message: "No recognizable 'Select' or 'Filter' tools found in the provided XML. \
                          Only these tool types can be converted for now."
                    .to_string(),
            };
        }

        info!(steps = steps.len(), model = self.client.model_name(), "beginning conversion");

        let mut messages = vec!["XML parsed successfully. Beginning conversion...".to_string()];
        let mut current_schema = self.seed_schema.clone();
        let mut current_name = SOURCE_NODE_NAME.to_string();
        let mut nodes: Vec<SubqueryNode> = Vec::new();

        for (i, step) in steps.iter().enumerate() {
            messages.push(format!(
                "Processing {} tool (ID: {})...",
                step.kind_name(),
                step.tool_id
            ));

            let fragment = match translator::translate(
                self.client.as_ref(),
                step,
                &current_schema,
                &current_name,
            )
            .await
            {
                Ok(fragment) => fragment,
                // Discard all partial nodes: the result contract is
                // all-or-nothing.
                Err(err) => return Self::failed(err),
            };

            let output_schema = match &step.config {
                StepConfig::Projection { fields } => current_schema.project(fields),
                _ => current_schema.clone(),
            };

            let node = assembler::build_node(
                i + 1,
                step,
                &fragment,
                &current_schema,
                &output_schema,
                &current_name,
            );
            current_name = node.name.clone();
            current_schema = output_schema;
            nodes.push(node);
        }

        let sql = assembler::emit(&nodes, &current_schema);
        messages.push("Conversion completed successfully! Please review the generated SQL.".to_string());

        ConversionResult {
            sql,
            message: messages.join("\n"),
        }
    }

    fn failed(err: ConvertError) -> ConversionResult {
        warn!("conversion aborted: {err}");
        let message = match &err {
            ConvertError::UnsupportedTool { tool_id, kind } => format!(
                "Unsupported tool type '{kind}' (ToolID: {tool_id}). \
                 Only 'Select' and 'Filter' tools can be converted."
            ),
            ConvertError::Generation { tool_id, source } => {
                format!("Failed to generate SQL for ToolID {tool_id}. Error: {source}")
            }
            ConvertError::InvalidStructure => format!("Error: {err}"),
        };
        ConversionResult {
            sql: String::new(),
            message,
        }
    }
}
