//! Evaluation pipeline
//!
//! Explicit state machine over [`Stage`]:
//!
//! ```text
//! Relevance ──>0.5──> Grammar ──>0.6──> Structure ──>0.7──> Depth ──> Final
//!     │                  │                  │                           │
//!     └──── ≤ threshold ─┴──────────────────┴─────────────> Final       │
//!                                                                       v
//!                                            Corrections (WithCorrections) ──> Done
//!                                            Done        (ScoresOnly)
//! ```
//!
//! Stages run strictly in sequence: each threshold depends on the score the
//! previous stage produced. A rubric skipped by an early exit keeps its 0.0.

use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::aggregate::aggregate;
use super::corrections::generate_corrections;
use super::rubric::RubricEvaluator;
use super::{EvaluationError, EvaluationState, Rubric};
use crate::llm::LlmGateway;

/// Relevance must exceed this to continue to grammar
pub const RELEVANCE_THRESHOLD: f64 = 0.5;
/// Grammar must exceed this to continue to structure
pub const GRAMMAR_THRESHOLD: f64 = 0.6;
/// Structure must exceed this to continue to depth
pub const STRUCTURE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Relevance,
    Grammar,
    Structure,
    Depth,
    Final,
    Corrections,
    Done,
}

impl Stage {
    /// Rubric scored by this stage, if any
    pub fn rubric(&self) -> Option<Rubric> {
        match self {
            Stage::Relevance => Some(Rubric::Relevance),
            Stage::Grammar => Some(Rubric::Grammar),
            Stage::Structure => Some(Rubric::Structure),
            Stage::Depth => Some(Rubric::Depth),
            Stage::Final | Stage::Corrections | Stage::Done => None,
        }
    }
}

/// Whether the pipeline ends with a corrections stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineVariant {
    #[default]
    WithCorrections,
    ScoresOnly,
}

/// Transition function of the pipeline state machine
pub fn next_stage(stage: Stage, state: &EvaluationState, variant: PipelineVariant) -> Stage {
    match stage {
        Stage::Relevance if state.relevance > RELEVANCE_THRESHOLD => Stage::Grammar,
        Stage::Relevance => Stage::Final,
        Stage::Grammar if state.grammar > GRAMMAR_THRESHOLD => Stage::Structure,
        Stage::Grammar => Stage::Final,
        Stage::Structure if state.structure > STRUCTURE_THRESHOLD => Stage::Depth,
        Stage::Structure => Stage::Final,
        Stage::Depth => Stage::Final,
        Stage::Final => match variant {
            PipelineVariant::WithCorrections => Stage::Corrections,
            PipelineVariant::ScoresOnly => Stage::Done,
        },
        Stage::Corrections | Stage::Done => Stage::Done,
    }
}

/// Runs the evaluation state machine for one essay at a time
#[derive(Clone)]
pub struct EvaluationPipeline {
    llm: LlmGateway,
    variant: PipelineVariant,
}

impl EvaluationPipeline {
    pub fn new(llm: LlmGateway, variant: PipelineVariant) -> Self {
        Self { llm, variant }
    }

    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// Evaluate `essay` from the initial stage to `Done`
    ///
    /// Any fatal error aborts the run; no partial state is returned.
    pub async fn run(&self, essay: &str) -> Result<EvaluationState, EvaluationError> {
        let evaluation_id = Uuid::new_v4();
        let span = info_span!("evaluation", %evaluation_id, variant = ?self.variant);

        async move {
            let mut state = EvaluationState::new(essay);
            let mut stage = Stage::Relevance;

            while stage != Stage::Done {
                self.execute(stage, &mut state).await?;
                let next = next_stage(stage, &state, self.variant);
                debug!(from = ?stage, to = ?next, "Stage transition");
                stage = next;
            }

            info!(
                relevance = state.relevance,
                grammar = state.grammar,
                structure = state.structure,
                depth = state.depth,
                final_score = state.final_score,
                "Evaluation complete"
            );
            Ok(state)
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, stage: Stage, state: &mut EvaluationState) -> Result<(), EvaluationError> {
        if let Some(rubric) = stage.rubric() {
            RubricEvaluator::new(rubric).apply(&self.llm, state).await?;
            return Ok(());
        }

        match stage {
            Stage::Final => {
                state.final_score = aggregate(state);
            }
            Stage::Corrections => {
                generate_corrections(&self.llm, state).await?;
            }
            _ => {}
        }
        Ok(())
    }
}
