//! Final score aggregation

use super::EvaluationState;

pub const RELEVANCE_WEIGHT: f64 = 0.3;
pub const GRAMMAR_WEIGHT: f64 = 0.2;
pub const STRUCTURE_WEIGHT: f64 = 0.2;
pub const DEPTH_WEIGHT: f64 = 0.3;

/// Weighted sum of the four rubric scores
///
/// Skipped rubrics contribute their 0.0 at full weight.
///
/// # Examples
///
/// ```
/// use essay_grader::evaluation::final_score;
///
/// let score = final_score(0.9, 0.8, 0.9, 0.5);
/// assert!((score - 0.76).abs() < 1e-9);
/// ```
pub fn final_score(relevance: f64, grammar: f64, structure: f64, depth: f64) -> f64 {
    relevance * RELEVANCE_WEIGHT
        + grammar * GRAMMAR_WEIGHT
        + structure * STRUCTURE_WEIGHT
        + depth * DEPTH_WEIGHT
}

/// [`final_score`] over the scores held in `state`
pub fn aggregate(state: &EvaluationState) -> f64 {
    final_score(state.relevance, state.grammar, state.structure, state.depth)
}
