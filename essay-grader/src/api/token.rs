//! Token endpoint (OAuth2 password grant form)

use axum::{extract::State, routing::post, Form, Json, Router};
use essay_common::api::{TokenForm, TokenResponse};
use tracing::{info, warn};

use crate::{ApiResult, AppState};

/// POST /v1/token
pub async fn login_for_access_token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> ApiResult<Json<TokenResponse>> {
    info!(username = %form.username, "Login attempt");

    state
        .tokens
        .verify_credentials(&form.username, &form.password)
        .map_err(|e| {
            warn!(username = %form.username, "Login rejected");
            e
        })?;

    let access_token = state.tokens.create_access_token(&form.username)?;

    info!(username = %form.username, "Login succeeded");
    Ok(Json(TokenResponse::bearer(access_token)))
}

pub fn token_routes() -> Router<AppState> {
    Router::new().route("/v1/token", post(login_for_access_token))
}
