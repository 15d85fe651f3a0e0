//! Exemplary essay endpoint

use axum::{extract::State, routing::post, Json, Router};
use essay_common::api::{ExemplaryEssayRequest, ExemplaryEssayResponse};
use tracing::{debug, error, info};

use super::AuthenticatedUser;
use crate::evaluation::exemplary::generate_exemplary_essay;
use crate::{ApiResult, AppState};

/// POST /v1/generate_exemplary_essay
pub async fn exemplary_essay(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ExemplaryEssayRequest>,
) -> ApiResult<Json<ExemplaryEssayResponse>> {
    info!(user = %user.username(), "Exemplary essay request received");
    debug!(theme = %request.theme, "Essay theme");

    let essay = generate_exemplary_essay(&state.llm, &request.theme)
        .await
        .map_err(|e| {
            error!(user = %user.username(), error = %e, "Exemplary essay generation failed");
            e
        })?;

    info!(user = %user.username(), "Exemplary essay generated");
    debug!(essay_chars = essay.chars().count(), "Generated essay size");

    Ok(Json(ExemplaryEssayResponse { essay }))
}

pub fn exemplary_routes() -> Router<AppState> {
    Router::new().route("/v1/generate_exemplary_essay", post(exemplary_essay))
}
