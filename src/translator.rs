//! Per-step translation: prompt construction and the generation call.
//!
//! Each prompt is scoped to one step: the live schema, the name of the
//! upstream subquery, and the verbatim node XML. The fragment-only instruction
//! is load-bearing; assembly splices the returned text without validation.

use tracing::debug;

use crate::error::ConvertError;
use crate::llm::LlmClient;
use crate::parser::{StepConfig, StepDescriptor};
use crate::schema::Schema;

/// Build the translation prompt for one step.
///
/// Returns `None` for unsupported tool types; those must never reach the
/// generation service.
pub fn build_prompt(step: &StepDescriptor, schema: &Schema, source_name: &str) -> Option<String> {
    let mut prompt = String::from("You are an expert Alteryx to BigQuery SQL converter.\n");

    match &step.config {
        StepConfig::Projection { .. } => {
            prompt.push_str(
                "Translate the following Alteryx Select tool logic into a BigQuery SQL SELECT statement.\n",
            );
        }
        StepConfig::Predicate { .. } => {
            prompt.push_str(
                "Translate the following Alteryx Filter tool logic into a BigQuery SQL WHERE clause.\n",
            );
        }
        StepConfig::Unsupported { .. } => return None,
    }

    prompt.push_str(&format!(
        "The input data comes from a CTE named `{source_name}` with the following schema:\n{}\n\n",
        schema.to_prompt_table()
    ));
    prompt.push_str(&format!(
        "Alteryx {} Tool Configuration (XML snippet):\n{}\n\n",
        step.kind_name(),
        step.raw_xml
    ));

    match &step.config {
        StepConfig::Projection { .. } => {
            prompt.push_str(
                "Generate only the BigQuery SQL SELECT statement (column list, without a FROM clause). \
                 Do not include any explanations or extra text.\n\
                 Ensure all selected columns are present in the output.\n",
            );
        }
        StepConfig::Predicate { expression } => {
            prompt.push_str(
                "Generate only the BigQuery SQL WHERE clause, including the 'WHERE' keyword. \
                 Do not include any explanations or extra text.\n",
            );
            if expression.is_none() {
                prompt.push_str(
                    "The tool has no expression configured; return a WHERE clause that passes all rows.\n",
                );
            }
        }
        StepConfig::Unsupported { .. } => return None,
    }

    Some(prompt)
}

/// Translate one step into a raw SQL fragment.
///
/// Fails with [`ConvertError::UnsupportedTool`] before the generation service
/// is invoked when the step kind is outside the supported set, and with
/// [`ConvertError::Generation`] when the call itself errors.
pub async fn translate(
    client: &dyn LlmClient,
    step: &StepDescriptor,
    schema: &Schema,
    source_name: &str,
) -> Result<String, ConvertError> {
    let prompt =
        build_prompt(step, schema, source_name).ok_or_else(|| ConvertError::UnsupportedTool {
            tool_id: step.tool_id.clone(),
            kind: step.kind_name().to_string(),
        })?;

    debug!(
        tool_id = %step.tool_id,
        kind = step.kind_name(),
        source = source_name,
        "requesting SQL fragment"
    );

    let fragment = client
        .generate(&prompt)
        .await
        .map_err(|source| ConvertError::Generation {
            tool_id: step.tool_id.clone(),
            source,
        })?;

    Ok(fragment.trim().to_string())
}
