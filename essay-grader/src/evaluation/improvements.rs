//! Improvement suggestions

use super::prompts::improvements_prompt;
use crate::llm::{LlmGateway, LlmResult};

pub async fn suggest_improvements(llm: &LlmGateway, essay: &str) -> LlmResult<String> {
    llm.invoke(improvements_prompt(essay)).await
}
