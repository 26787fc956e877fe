//! LLM client abstraction for SQL fragment generation.

use anyhow::Result;
use async_trait::async_trait;

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

/// Interface to the text-generation collaborator.
///
/// One prompt in, one raw text completion out. Implementations own transport,
/// auth and timeouts; retry and rate-limit policy belong to the caller, not to
/// this contract.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model name, for logging.
    fn model_name(&self) -> &str;

    /// Provider name, for logging.
    fn provider_name(&self) -> &str;
}

/// Strip a surrounding markdown code fence from a model response.
///
/// Models regularly wrap fragments in ```sql fences despite the fragment-only
/// instruction; assembly splices the text verbatim, so the fence has to go.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest
        .strip_prefix("sql")
        .or_else(|| rest.strip_prefix("SQL"))
        .unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}
