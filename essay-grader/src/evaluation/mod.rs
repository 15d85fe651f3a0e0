//! Essay evaluation core
//!
//! Scores an essay along four rubrics with an LLM evaluator, aggregates a
//! weighted final score and generates feedback.
//!
//! # Architecture
//!
//! - [`score`]: pulls the numeric rating out of free-form LLM text
//! - [`rubric`]: one evaluator per [`Rubric`], each a single LLM call
//! - [`aggregate`]: fixed weighted sum of the rubric scores
//! - [`corrections`]: corrective feedback for a scored essay
//! - [`pipeline`]: state machine sequencing the above with early exits
//! - [`exemplary`], [`improvements`]: independent single-call generators
//!
//! Every [`EvaluationState`] lives for exactly one request.

pub mod aggregate;
pub mod corrections;
pub mod exemplary;
pub mod improvements;
pub mod pipeline;
pub mod prompts;
pub mod rubric;
pub mod score;

pub use aggregate::final_score;
pub use pipeline::{next_stage, EvaluationPipeline, PipelineVariant, Stage};
pub use rubric::RubricEvaluator;
pub use score::{extract_score, ScoreParseError};

use crate::llm::LlmError;
use essay_common::api::EssayResponse;
use std::fmt;
use thiserror::Error;

/// Factor applied to internal [0,1] scores at the HTTP boundary
pub const DISPLAY_SCALE: f64 = 10.0;

/// Essay-quality dimension scored by the LLM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rubric {
    Relevance,
    Grammar,
    Structure,
    Depth,
}

impl Rubric {
    /// All rubrics in evaluation order
    pub const ALL: [Rubric; 4] = [
        Rubric::Relevance,
        Rubric::Grammar,
        Rubric::Structure,
        Rubric::Depth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rubric::Relevance => "relevance",
            Rubric::Grammar => "grammar",
            Rubric::Structure => "structure",
            Rubric::Depth => "depth",
        }
    }

    /// Portuguese label used in prompts
    pub fn label_pt(&self) -> &'static str {
        match self {
            Rubric::Relevance => "relevância",
            Rubric::Grammar => "gramática",
            Rubric::Structure => "estrutura",
            Rubric::Depth => "profundidade",
        }
    }
}

impl fmt::Display for Rubric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record threaded through the pipeline stages
///
/// Rubric scores default to 0.0 and stay there when their stage is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationState {
    pub essay: String,
    pub relevance: f64,
    pub grammar: f64,
    pub structure: f64,
    pub depth: f64,
    pub final_score: f64,
    pub corrections: String,
}

impl EvaluationState {
    pub fn new(essay: impl Into<String>) -> Self {
        Self {
            essay: essay.into(),
            ..Default::default()
        }
    }

    pub fn score(&self, rubric: Rubric) -> f64 {
        match rubric {
            Rubric::Relevance => self.relevance,
            Rubric::Grammar => self.grammar,
            Rubric::Structure => self.structure,
            Rubric::Depth => self.depth,
        }
    }

    pub fn set_score(&mut self, rubric: Rubric, value: f64) {
        match rubric {
            Rubric::Relevance => self.relevance = value,
            Rubric::Grammar => self.grammar = value,
            Rubric::Structure => self.structure = value,
            Rubric::Depth => self.depth = value,
        }
    }

    /// Response body with every score scaled to 0-10
    pub fn to_essay_response(&self) -> EssayResponse {
        EssayResponse {
            final_score: self.final_score * DISPLAY_SCALE,
            relevance_score: self.relevance * DISPLAY_SCALE,
            grammar_score: self.grammar * DISPLAY_SCALE,
            structure_score: self.structure * DISPLAY_SCALE,
            depth_score: self.depth * DISPLAY_SCALE,
            corrections: self.corrections.clone(),
        }
    }
}

/// Failure inside an evaluation step
///
/// `ScoreParse` is recoverable: the rubric falls back to 0.0. `Llm` is fatal
/// and aborts the request.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    ScoreParse(#[from] ScoreParseError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl EvaluationError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EvaluationError::ScoreParse(_))
    }
}
