//! essay-grader library interface
//!
//! Scores Portuguese essays along four rubrics with an LLM evaluator and
//! exposes the evaluation over an authenticated HTTP API.

pub mod api;
pub mod error;
pub mod evaluation;
pub mod llm;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use essay_common::api::TokenService;
use tower_http::trace::TraceLayer;

use crate::evaluation::PipelineVariant;
use crate::llm::LlmGateway;

/// Application state shared across handlers
///
/// Immutable after startup; each request builds its own evaluation state.
#[derive(Clone)]
pub struct AppState {
    /// LLM capability bound to the configured model and timeout
    pub llm: LlmGateway,
    /// Bearer token issuance and validation
    pub tokens: TokenService,
    /// Pipeline variant used by `/v1/grade_essay`
    pub pipeline_variant: PipelineVariant,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(llm: LlmGateway, tokens: TokenService) -> Self {
        Self {
            llm,
            tokens,
            pipeline_variant: PipelineVariant::default(),
            startup_time: Utc::now(),
        }
    }

    pub fn with_pipeline_variant(mut self, variant: PipelineVariant) -> Self {
        self.pipeline_variant = variant;
        self
    }
}

/// Build application router
///
/// `/health` and `/v1/token` are public; every other route requires a
/// bearer token.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::grading_routes())
        .merge(api::exemplary_routes())
        .merge(api::token_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
