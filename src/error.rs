//! Error types for the conversion pipeline.
//!
//! Every failure carries the tool id it belongs to so the orchestrator can
//! fold it into a human-readable `ConversionResult`; no error from this crate
//! crosses the `convert` boundary as a panic or a raw `Err`.

use thiserror::Error;

/// Errors produced while turning a workflow document into SQL.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The document is not wrapped in a non-empty `<AlteryxWorkflow>` container.
    #[error("invalid Alteryx workflow XML structure: missing <AlteryxWorkflow> container")]
    InvalidStructure,

    /// A node type outside the supported set reached the translator.
    #[error("unsupported Alteryx tool type '{kind}' (ToolID {tool_id})")]
    UnsupportedTool { tool_id: String, kind: String },

    /// The generation service failed while translating one step.
    #[error("SQL generation failed for ToolID {tool_id}: {source}")]
    Generation {
        tool_id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
