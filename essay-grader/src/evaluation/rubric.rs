//! Rubric evaluators
//!
//! One LLM call per rubric. A response without a readable score sets the
//! rubric to 0.0; a transport failure aborts the evaluation.

use tracing::{debug, warn};

use super::prompts::rubric_prompt;
use super::score::extract_score;
use super::{EvaluationError, EvaluationState, Rubric};
use crate::llm::LlmGateway;

/// Score stored when the response carries no readable score
pub const FALLBACK_SCORE: f64 = 0.0;

/// Evaluator for a single rubric
#[derive(Debug, Clone, Copy)]
pub struct RubricEvaluator {
    rubric: Rubric,
}

impl RubricEvaluator {
    pub fn new(rubric: Rubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> Rubric {
        self.rubric
    }

    pub fn render_prompt(&self, state: &EvaluationState) -> String {
        rubric_prompt(self.rubric, state)
    }

    /// Call the LLM and parse its rating, without any fallback
    pub async fn score(&self, llm: &LlmGateway, state: &EvaluationState) -> Result<f64, EvaluationError> {
        let completion = llm.invoke(self.render_prompt(state)).await?;
        let raw = extract_score(&completion)?;
        Ok(clamp_score(self.rubric, raw))
    }

    /// Score the rubric and store the result in `state`
    ///
    /// Recoverable failures store [`FALLBACK_SCORE`]; fatal ones are returned
    /// and leave `state` untouched.
    pub async fn apply(&self, llm: &LlmGateway, state: &mut EvaluationState) -> Result<f64, EvaluationError> {
        let value = match self.score(llm, state).await {
            Ok(value) => value,
            Err(e) if e.is_recoverable() => {
                warn!(rubric = %self.rubric, error = %e, "Could not extract rubric score, using fallback");
                FALLBACK_SCORE
            }
            Err(e) => return Err(e),
        };

        debug!(rubric = %self.rubric, score = value, "Rubric scored");
        state.set_score(self.rubric, value);
        Ok(value)
    }
}

/// Force a parsed rating into [0,1]
pub fn clamp_score(rubric: Rubric, raw: f64) -> f64 {
    let clamped = raw.clamp(0.0, 1.0);
    if clamped != raw {
        warn!(rubric = %rubric, raw, clamped, "Rubric score outside [0,1], clamping");
    }
    clamped
}
