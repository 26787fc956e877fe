//! Workflow document parser.
//!
//! Extracts an ordered list of step descriptors from the simplified Alteryx
//! workflow dialect. The dialect is attribute-shaped enough that anchored
//! regexes are sufficient; a full XML parser buys nothing here.
//!
//! Node types other than Select and Filter are collected as
//! [`StepConfig::Unsupported`] so the orchestrator can report them instead of
//! silently dropping a transformation stage from the plan.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConvertError;

/// One field entry of a Select tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub name: String,
    pub selected: bool,
    pub rename: Option<String>,
}

/// Kind-specific payload of a workflow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepConfig {
    /// Select tool: column projection / rename.
    Projection { fields: Vec<FieldSelection> },
    /// Filter tool: row predicate. A missing expression is permitted.
    Predicate { expression: Option<String> },
    /// Recognized node with a tool type this converter cannot translate.
    Unsupported { kind: String },
}

/// One step of the parsed workflow, in declared execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    /// Numeric-string tool identifier; ascending order is execution order.
    pub tool_id: String,
    /// Verbatim XML of the node, embedded in the translation prompt.
    pub raw_xml: String,
    pub config: StepConfig,
}

impl StepDescriptor {
    /// Tool-type name as it appears in the source dialect.
    pub fn kind_name(&self) -> &str {
        match &self.config {
            StepConfig::Projection { .. } => "Select",
            StepConfig::Predicate { .. } => "Filter",
            StepConfig::Unsupported { kind } => kind,
        }
    }

    fn order_key(&self) -> u64 {
        // ToolID is matched as \d+, so this only saturates on overflow.
        self.tool_id.parse().unwrap_or(u64::MAX)
    }
}

static WORKFLOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<AlteryxWorkflow>(.*?)</AlteryxWorkflow>").expect("valid workflow regex")
});

static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<Node ToolID="(\d+)" Type="([^"]+)">(.*?)</Node>"#).expect("valid node regex")
});

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<Field Name="([^"]+)" Selected="([^"]+)"(?: Rename="([^"]+)")? />"#)
        .expect("valid field regex")
});

static EXPRESSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<Expression>(.*?)</Expression>").expect("valid expression regex"));

/// Parse a workflow document into ordered step descriptors.
///
/// Fails only on a missing or empty `<AlteryxWorkflow>` container. An empty
/// descriptor list is not an error; the orchestrator reports it as
/// informational. Duplicate tool ids are kept, in document order.
pub fn parse_workflow(xml: &str) -> Result<Vec<StepDescriptor>, ConvertError> {
    let inner = WORKFLOW_RE
        .captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ConvertError::InvalidStructure)?;
    if inner.is_empty() {
        return Err(ConvertError::InvalidStructure);
    }

    let mut steps: Vec<StepDescriptor> = Vec::new();
    for caps in NODE_RE.captures_iter(inner) {
        let tool_id = caps[1].to_string();
        let kind = &caps[2];
        let config_xml = &caps[3];

        let config = match kind {
            "Select" => StepConfig::Projection {
                fields: parse_fields(config_xml),
            },
            "Filter" => StepConfig::Predicate {
                expression: EXPRESSION_RE
                    .captures(config_xml)
                    .map(|c| c[1].to_string()),
            },
            other => StepConfig::Unsupported {
                kind: other.to_string(),
            },
        };

        steps.push(StepDescriptor {
            tool_id,
            raw_xml: caps[0].to_string(),
            config,
        });
    }

    // Stable sort: duplicate ids keep document order.
    steps.sort_by_key(StepDescriptor::order_key);
    Ok(steps)
}

fn parse_fields(config_xml: &str) -> Vec<FieldSelection> {
    FIELD_RE
        .captures_iter(config_xml)
        .map(|caps| FieldSelection {
            name: caps[1].to_string(),
            // Anything other than the literal "True" counts as unselected.
            selected: &caps[2] == "True",
            rename: caps.get(3).map(|m| m.as_str().to_string()),
        })
        .collect()
}
