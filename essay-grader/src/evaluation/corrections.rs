//! Corrective feedback for a scored essay

use super::prompts::corrections_prompt;
use super::EvaluationState;
use crate::llm::{LlmGateway, LlmResult};

/// Ask the LLM for corrections and store the raw completion in `state`
pub async fn generate_corrections(llm: &LlmGateway, state: &mut EvaluationState) -> LlmResult<()> {
    let feedback = llm.invoke(corrections_prompt(state)).await?;
    tracing::debug!(chars = feedback.chars().count(), "Corrections generated");
    state.corrections = feedback;
    Ok(())
}
