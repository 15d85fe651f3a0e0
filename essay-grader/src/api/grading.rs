//! Essay grading and improvement suggestion endpoints

use axum::{extract::State, routing::post, Json, Router};
use essay_common::api::{EssayRequest, EssayResponse, ImprovementRequest, ImprovementResponse};
use tracing::{debug, error, info};

use super::AuthenticatedUser;
use crate::evaluation::improvements::suggest_improvements;
use crate::evaluation::EvaluationPipeline;
use crate::{ApiResult, AppState};

/// POST /v1/grade_essay
///
/// Runs the evaluation pipeline and returns scores on the 0-10 scale.
pub async fn grade_essay(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<EssayRequest>,
) -> ApiResult<Json<EssayResponse>> {
    info!(user = %user.username(), "Essay grading request received");
    debug!(essay_chars = request.essay.chars().count(), "Essay size");

    let pipeline = EvaluationPipeline::new(state.llm.clone(), state.pipeline_variant);
    let result = pipeline.run(&request.essay).await.map_err(|e| {
        error!(user = %user.username(), error = %e, "Essay grading failed");
        e
    })?;

    let response = result.to_essay_response();
    info!(
        user = %user.username(),
        final_score = response.final_score,
        "Essay grading completed"
    );
    debug!(?response, "Grading details");

    Ok(Json(response))
}

/// POST /v1/suggest_improvements
pub async fn suggest_essay_improvements(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ImprovementRequest>,
) -> ApiResult<Json<ImprovementResponse>> {
    info!(user = %user.username(), "Improvement suggestion request received");
    debug!(essay_chars = request.essay.chars().count(), "Essay size");

    let suggestions = suggest_improvements(&state.llm, &request.essay)
        .await
        .map_err(|e| {
            error!(user = %user.username(), error = %e, "Improvement suggestion failed");
            e
        })?;

    info!(user = %user.username(), "Improvement suggestions generated");
    Ok(Json(ImprovementResponse { suggestions }))
}

/// Build grading routes
pub fn grading_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/grade_essay", post(grade_essay))
        .route("/v1/suggest_improvements", post(suggest_essay_improvements))
}
