//! Exemplary essay generation

use super::prompts::exemplary_prompt;
use crate::llm::{LlmGateway, LlmResult};

/// Generate a model essay (~500 words, formal Portuguese) on `theme`
///
/// The completion is returned as-is; length is not verified.
pub async fn generate_exemplary_essay(llm: &LlmGateway, theme: &str) -> LlmResult<String> {
    llm.invoke(exemplary_prompt(theme)).await
}
